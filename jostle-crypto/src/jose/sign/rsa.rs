use std::{fmt, sync::Arc};

use aws_lc_rs::{
    rand::SystemRandom,
    signature::{self, RsaEncoding, RsaKeyPair, RsaParameters, RsaPublicKeyComponents},
};

use crate::{
    JoseError, Result,
    jose::{JWA, RsaPrivateKey, RsaPublicKey, SigningHandler},
};

/// RSA signing handler for `RS256`, `RS384`, `RS512` (RSASSA-PKCS1-v1_5)
/// and `PS256`, `PS384`, `PS512` (RSASSA-PSS).
pub struct RsaSigningHandler {
    alg: JWA,
    encoding: &'static dyn RsaEncoding,
    parameters: &'static RsaParameters,
    public: RsaPublicKey,
    key_pair: Option<Arc<RsaKeyPair>>,
}

impl RsaSigningHandler {
    /// Create a handler which can sign and verify.
    pub fn new_private(alg: JWA, key: &RsaPrivateKey) -> Result<Self> {
        let mut handler = Self::new_public(alg, key.public_key())?;
        handler.key_pair = Some(Arc::new(key.key_pair()?));
        Ok(handler)
    }

    /// Create a handler which can only verify.
    pub fn new_public(alg: JWA, key: &RsaPublicKey) -> Result<Self> {
        let (encoding, parameters): (&'static dyn RsaEncoding, &'static RsaParameters) = match alg
        {
            JWA::RS256 => (&signature::RSA_PKCS1_SHA256, &signature::RSA_PKCS1_2048_8192_SHA256),
            JWA::RS384 => (&signature::RSA_PKCS1_SHA384, &signature::RSA_PKCS1_2048_8192_SHA384),
            JWA::RS512 => (&signature::RSA_PKCS1_SHA512, &signature::RSA_PKCS1_2048_8192_SHA512),
            JWA::PS256 => (&signature::RSA_PSS_SHA256, &signature::RSA_PSS_2048_8192_SHA256),
            JWA::PS384 => (&signature::RSA_PSS_SHA384, &signature::RSA_PSS_2048_8192_SHA384),
            JWA::PS512 => (&signature::RSA_PSS_SHA512, &signature::RSA_PSS_2048_8192_SHA512),
            other => {
                return Err(JoseError::unsupported_algorithm(format!(
                    "{other} is not an RSA signature algorithm"
                )));
            }
        };

        if key.modulus_len() < 256 {
            return Err(JoseError::key_resolution(format!(
                "{alg} requires an RSA key of at least 2048 bits"
            )));
        }

        Ok(Self {
            alg,
            encoding,
            parameters,
            public: key.clone(),
            key_pair: None,
        })
    }
}

impl fmt::Debug for RsaSigningHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaSigningHandler")
            .field("alg", &self.alg)
            .field("public", &self.public)
            .field("can_sign", &self.key_pair.is_some())
            .finish()
    }
}

impl SigningHandler for RsaSigningHandler {
    fn algorithm(&self) -> &str {
        self.alg.as_str()
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        let key_pair = self.key_pair.as_ref().ok_or_else(|| {
            JoseError::key_resolution(format!("{} signing requires a private key", self.alg))
        })?;

        let mut signature = vec![0u8; key_pair.public_modulus_len()];
        key_pair
            .sign(self.encoding, &SystemRandom::new(), data, &mut signature)
            .map_err(JoseError::cryptographic_failure_from)?;
        Ok(signature)
    }

    fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        RsaPublicKeyComponents {
            n: self.public.n(),
            e: self.public.e(),
        }
        .verify(self.parameters, data, signature)
        .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pkcs1_and_pss_signatures_are_not_interchangeable() {
        let key = RsaPrivateKey::generate(2048).unwrap();
        let rs = RsaSigningHandler::new_private(JWA::RS256, &key).unwrap();
        let ps = RsaSigningHandler::new_private(JWA::PS256, &key).unwrap();

        let rs_signature = rs.sign(b"data").unwrap();
        let ps_signature = ps.sign(b"data").unwrap();
        assert_eq!(rs_signature.len(), 256);
        assert!(rs.verify(b"data", &rs_signature));
        assert!(ps.verify(b"data", &ps_signature));
        assert!(!rs.verify(b"data", &ps_signature));
        assert!(!ps.verify(b"data", &rs_signature));
    }

    #[test]
    fn non_rsa_algorithm_is_rejected() {
        let key = RsaPrivateKey::generate(2048).unwrap();
        let err = RsaSigningHandler::new_public(JWA::ES256, key.public_key()).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::UnsupportedAlgorithm);
    }

    #[test]
    fn small_modulus_is_rejected() {
        let key = RsaPublicKey::new(&[0xc3; 128], &[1, 0, 1]).unwrap();
        let err = RsaSigningHandler::new_public(JWA::RS256, &key).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::KeyResolution);
    }
}
