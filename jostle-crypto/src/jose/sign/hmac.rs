use std::fmt;

use aws_lc_rs::hmac;

use crate::{
    JoseError, Result,
    jose::{JWA, SigningHandler, SymmetricKey},
};

/// HMAC signing handler for `HS256`, `HS384` and `HS512`.
///
/// Verification recomputes the tag and compares it in constant time.
pub struct HmacSigningHandler {
    alg: JWA,
    key: hmac::Key,
}

impl HmacSigningHandler {
    /// Create a new [`HmacSigningHandler`].
    ///
    /// The secret must be at least as long as the hash output (rfc7518, section 3.2).
    pub fn new(alg: JWA, secret: &SymmetricKey) -> Result<Self> {
        let algorithm = match alg {
            JWA::HS256 => hmac::HMAC_SHA256,
            JWA::HS384 => hmac::HMAC_SHA384,
            JWA::HS512 => hmac::HMAC_SHA512,
            other => {
                return Err(JoseError::unsupported_algorithm(format!(
                    "{other} is not an HMAC algorithm"
                )));
            }
        };

        let min_len = algorithm.digest_algorithm().output_len();
        if secret.len() < min_len {
            return Err(JoseError::key_resolution(format!(
                "{alg} requires a key of at least {min_len} bytes"
            )));
        }

        Ok(Self {
            alg,
            key: hmac::Key::new(algorithm, secret.as_bytes()),
        })
    }
}

impl fmt::Debug for HmacSigningHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacSigningHandler")
            .field("alg", &self.alg)
            .finish_non_exhaustive()
    }
}

impl SigningHandler for HmacSigningHandler {
    fn algorithm(&self) -> &str {
        self.alg.as_str()
    }

    fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(hmac::sign(&self.key, data).as_ref().to_vec())
    }

    fn verify(&self, data: &[u8], signature: &[u8]) -> bool {
        hmac::verify(&self.key, data, signature).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use base64::{Engine as _, prelude::BASE64_URL_SAFE_NO_PAD};

    use super::*;

    #[test]
    fn rfc7515_appendix_a1() {
        let secret = BASE64_URL_SAFE_NO_PAD
            .decode("AyM1SysPpbyDfgZld3umj1qzKObwVMkoqQ-EstJQLr_T-1qS0gZH75aKtMN3Yj0iPS4hcgUuTwjAzZr1Z9CAow")
            .unwrap();
        let handler =
            HmacSigningHandler::new(JWA::HS256, &SymmetricKey::new(secret).unwrap()).unwrap();

        let signing_input = "eyJ0eXAiOiJKV1QiLA0KICJhbGciOiJIUzI1NiJ9.eyJpc3MiOiJqb2UiLA0KICJleHAiOjEzMDA4MTkzODAsDQogImh0dHA6Ly9leGFtcGxlLmNvbS9pc19yb290Ijp0cnVlfQ";
        let signature = handler.sign(signing_input.as_bytes()).unwrap();
        assert_eq!(
            BASE64_URL_SAFE_NO_PAD.encode(&signature),
            "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"
        );
        assert!(handler.verify(signing_input.as_bytes(), &signature));
    }

    #[test]
    fn short_secret_is_rejected() {
        let secret = SymmetricKey::new(vec![7u8; 47]).unwrap();
        let err = HmacSigningHandler::new(JWA::HS384, &secret).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::KeyResolution);
        assert!(HmacSigningHandler::new(JWA::HS256, &secret).is_ok());
    }

    #[test]
    fn truncated_tag_does_not_verify() {
        let secret = SymmetricKey::new(vec![1u8; 32]).unwrap();
        let handler = HmacSigningHandler::new(JWA::HS256, &secret).unwrap();
        let signature = handler.sign(b"data").unwrap();
        assert!(!handler.verify(b"data", &signature[..16]));
    }
}
