use std::{fmt, sync::Arc};

use aws_lc_rs::{
    rand::SystemRandom,
    signature::{EcdsaKeyPair, UnparsedPublicKey},
};

use crate::{
    ErrorKind, JoseError, Result,
    der::{ecdsa_der_to_fixed, ecdsa_fixed_to_der},
    jose::{EcPrivateKey, EcPublicKey, JWA, JWKEllipticCurves, SigningHandler},
};

/// ECDSA signing handler for `ES256`, `ES384` and `ES512`.
///
/// The primitive works with ASN.1 DER signatures, which are converted
/// from and to the fixed width `r‖s` representation JWS mandates.
pub struct EcdsaSigningHandler {
    alg: JWA,
    curve: JWKEllipticCurves,
    public: EcPublicKey,
    key_pair: Option<Arc<EcdsaKeyPair>>,
}

impl EcdsaSigningHandler {
    /// Create a handler which can sign and verify.
    pub fn new_private(alg: JWA, key: &EcPrivateKey) -> Result<Self> {
        let mut handler = Self::new_public(alg, key.public_key())?;
        handler.key_pair = Some(Arc::new(key.key_pair()?));
        Ok(handler)
    }

    /// Create a handler which can only verify.
    pub fn new_public(alg: JWA, key: &EcPublicKey) -> Result<Self> {
        let curve = JWKEllipticCurves::try_from(alg)
            .map_err(|err| JoseError::new(ErrorKind::UnsupportedAlgorithm, err))?;
        if key.curve() != curve {
            return Err(JoseError::key_resolution(format!(
                "{alg} requires a {curve} key, got a {} key",
                key.curve()
            )));
        }
        Ok(Self {
            alg,
            curve,
            public: key.clone(),
            key_pair: None,
        })
    }
}

impl fmt::Debug for EcdsaSigningHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcdsaSigningHandler")
            .field("alg", &self.alg)
            .field("public", &self.public)
            .field("can_sign", &self.key_pair.is_some())
            .finish()
    }
}

impl SigningHandler for EcdsaSigningHandler {
    fn algorithm(&self) -> &str {
        self.alg.as_str()
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let key_pair = self.key_pair.as_ref().ok_or_else(|| {
            JoseError::key_resolution(format!("{} signing requires a private key", self.alg))
        })?;

        let der = key_pair
            .sign(&SystemRandom::new(), data)
            .map_err(JoseError::cryptographic_failure_from)?;
        ecdsa_der_to_fixed(der.as_ref(), self.curve.signature_len())
    }

    fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        if signature.len() != self.curve.signature_len() {
            return false;
        }
        let Ok(der) = ecdsa_fixed_to_der(signature) else {
            return false;
        };
        UnparsedPublicKey::new(
            self.curve.verification_algorithm(),
            self.public.uncompressed_point(),
        )
        .verify(data, &der)
        .is_ok()
    }
}
