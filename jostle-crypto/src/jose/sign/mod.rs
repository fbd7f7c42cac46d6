//! Signing handlers: one capability object per algorithm and key.
//!
//! A [`SigningAlgorithm`] is registered in the
//! [`AlgorithmRegistry`](super::AlgorithmRegistry) under its identifier and
//! turns [`Key`] material into a [`SigningHandler`] that signs and verifies.

use std::fmt;

use crate::{
    Result,
    jose::{JWA, Key},
};

mod ecdsa;
pub use ecdsa::EcdsaSigningHandler;

mod hmac;
pub use hmac::HmacSigningHandler;

mod none;
pub use none::NoneSigningHandler;

mod rsa;
pub use rsa::RsaSigningHandler;

/// Signs and verifies the JWS signing input for a single algorithm and key.
///
/// Handlers are stateless and may be shared between threads.
pub trait SigningHandler: Send + Sync + fmt::Debug {
    /// The `alg` identifier this handler implements.
    fn algorithm(&self) -> &str;

    /// Sign the given data, returning the JWS signature bytes.
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Verify the JWS signature over the given data.
    ///
    /// Malformed signatures are reported as `false`, never as an error.
    fn verify(&self, data: &[u8], signature: &[u8]) -> bool;
}

impl<H: SigningHandler + ?Sized> SigningHandler for Box<H> {
    fn algorithm(&self) -> &str {
        (**self).algorithm()
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        (**self).sign(data)
    }

    fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        (**self).verify(data, signature)
    }
}

/// Factory of [`SigningHandler`]s for one algorithm identifier.
pub trait SigningAlgorithm: Send + Sync + fmt::Debug {
    /// The `alg` identifier of this algorithm.
    fn name(&self) -> &str;

    /// Create a handler for the given key.
    ///
    /// Fails with a key resolution error if the key
    /// cannot be used with this algorithm.
    fn handler(&self, key: &Key) -> Result<Box<dyn SigningHandler>>;
}

impl SigningAlgorithm for JWA {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn handler(&self, key: &Key) -> Result<Box<dyn SigningHandler>> {
        match self {
            Self::HS256 | Self::HS384 | Self::HS512 => {
                let Key::Symmetric(secret) = key else {
                    return Err(key.mismatch(*self));
                };
                Ok(Box::new(HmacSigningHandler::new(*self, secret)?))
            }
            Self::RS256 | Self::RS384 | Self::RS512 | Self::PS256 | Self::PS384 | Self::PS512 => {
                match key {
                    Key::RsaPrivate(private) => {
                        Ok(Box::new(RsaSigningHandler::new_private(*self, private)?))
                    }
                    Key::RsaPublic(public) => {
                        Ok(Box::new(RsaSigningHandler::new_public(*self, public)?))
                    }
                    Key::Symmetric(_) | Key::EcPrivate(_) | Key::EcPublic(_) => {
                        Err(key.mismatch(*self))
                    }
                }
            }
            Self::ES256 | Self::ES384 | Self::ES512 => match key {
                Key::EcPrivate(private) => {
                    Ok(Box::new(EcdsaSigningHandler::new_private(*self, private)?))
                }
                Key::EcPublic(public) => {
                    Ok(Box::new(EcdsaSigningHandler::new_public(*self, public)?))
                }
                Key::Symmetric(_) | Key::RsaPrivate(_) | Key::RsaPublic(_) => {
                    Err(key.mismatch(*self))
                }
            },
            Self::None => Ok(Box::new(NoneSigningHandler)),
        }
    }
}
