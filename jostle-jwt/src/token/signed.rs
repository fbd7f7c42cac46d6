use jostle_crypto::jose::{AlgorithmRegistry, JWKSet, SigningHandler};

use crate::{ClaimsSet, Header, JoseError, Result};

#[derive(Debug, Clone, PartialEq)]
/// JWS secured JWT: `b64(header).b64(claims).b64(signature)`.
///
/// The signature is only checked by [`SignedJwt::verify`] and friends.
/// Until then the claims must not be trusted.
pub struct SignedJwt {
    header: Header,
    claims: ClaimsSet,
    signing_input: String,
    signature: Vec<u8>,
}

impl SignedJwt {
    pub(crate) fn new(
        header: Header,
        claims: ClaimsSet,
        signing_input: String,
        signature: Vec<u8>,
    ) -> Self {
        Self {
            header,
            claims,
            signing_input,
            signature,
        }
    }

    /// Header of the token.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The unverified claims.
    pub fn unverified_claims(&self) -> &ClaimsSet {
        &self.claims
    }

    /// The signed bytes, exactly as received: `b64(header).b64(claims)`.
    pub fn signing_input(&self) -> &str {
        &self.signing_input
    }

    /// The decoded signature.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Verify the signature with a handler chosen by the caller.
    ///
    /// The handler's algorithm must be the one named in the header.
    /// Any mismatch or invalid signature is the opaque cryptographic failure.
    pub fn verify(&self, handler: &dyn SigningHandler) -> Result<&ClaimsSet> {
        if self.header.alg() != Some(handler.algorithm()) {
            tracing::debug!(
                expected = handler.algorithm(),
                "signature algorithm does not match verifier"
            );
            return Err(JoseError::cryptographic_failure());
        }
        if !handler.verify(self.signing_input.as_bytes(), &self.signature) {
            tracing::debug!(alg = handler.algorithm(), "signature verification failed");
            return Err(JoseError::cryptographic_failure());
        }
        Ok(&self.claims)
    }

    /// Verify the signature against any of the given handlers,
    /// e.g. when a key is rotating.
    ///
    /// A failing handler does not stop the remaining ones.
    pub fn verify_any<H: SigningHandler>(&self, handlers: &[H]) -> Result<&ClaimsSet> {
        handlers
            .iter()
            .find_map(|handler| self.verify(handler).ok())
            .ok_or_else(JoseError::cryptographic_failure)
    }

    /// Verify the signature against the usable keys of a key set.
    ///
    /// Candidates are the keys matching the header's `kid` (when present)
    /// which can be used with the header's `alg`.
    pub fn verify_with_key_set(
        &self,
        registry: &AlgorithmRegistry,
        key_set: &JWKSet,
    ) -> Result<&ClaimsSet> {
        let alg = self
            .header
            .alg()
            .ok_or_else(JoseError::cryptographic_failure)?;
        let candidates = key_set.verification_candidates(registry, self.header.kid(), alg);
        tracing::trace!(alg, candidates = candidates.len(), "verify with key set");
        self.verify_any(&candidates)
    }

    /// Consume the token into its claims, without verifying anything.
    pub fn into_unverified_claims(self) -> ClaimsSet {
        self.claims
    }
}

#[cfg(test)]
mod tests {
    use jostle_crypto::jose::{JWK, JWKEllipticCurves, JWKSet};
    use tokio_test::{assert_err, assert_ok};
    use tracing_test::traced_test;

    use super::*;
    use crate::Jwt;

    fn signed_token(jwt: &Jwt, jwk: &JWK) -> SignedJwt {
        let header = Header::signed(jwk.alg().unwrap_or("ES256"))
            .maybe_with_kid(jwk.kid().map(str::to_owned));
        let claims = ClaimsSet::new().with_issuer("joe".to_owned());
        let token = assert_ok!(jwt.build_signed(&header, &claims, &jwk.resolve().unwrap()));
        jwt.reconstruct(&token).unwrap().into_signed().unwrap()
    }

    #[test]
    #[traced_test]
    fn algorithm_mismatch_fails_opaquely() {
        let jwt = Jwt::default();
        let jwk = JWK::generate_ec(JWKEllipticCurves::P256).unwrap();
        let token = signed_token(&jwt, &jwk);

        let key = jwk.resolve().unwrap();
        let es256 = jwt.registry().signing_handler("ES256", &key).unwrap();
        assert_eq!(assert_ok!(token.verify(&es256)).iss(), Some("joe"));

        let other = JWK::generate_ec(JWKEllipticCurves::P384).unwrap();
        let es384 = jwt
            .registry()
            .signing_handler("ES384", &other.resolve().unwrap())
            .unwrap();
        let err = assert_err!(token.verify(&es384));
        assert!(err.is_cryptographic_failure());
        assert!(logs_contain("signature algorithm does not match verifier"));
    }

    #[test]
    #[traced_test]
    fn key_rotation_with_verify_any() {
        let jwt = Jwt::default();
        let old = JWK::generate_ec(JWKEllipticCurves::P256).unwrap();
        let new = JWK::generate_ec(JWKEllipticCurves::P256).unwrap();
        let token = signed_token(&jwt, &new);

        let handlers = [&old, &new].map(|jwk| {
            jwt.registry()
                .signing_handler("ES256", &jwk.resolve().unwrap().to_public())
                .unwrap()
        });
        assert_ok!(token.verify_any(&handlers));
        assert!(logs_contain("signature verification failed"));

        let err = assert_err!(token.verify_any(&handlers[..1]));
        assert!(err.is_cryptographic_failure());
    }

    #[test]
    fn verify_with_key_set_selects_by_kid() {
        let jwt = Jwt::default();
        let signer = JWK::generate_ec(JWKEllipticCurves::P256)
            .unwrap()
            .with_kid("2026-10");
        let other = JWK::generate_ec(JWKEllipticCurves::P256)
            .unwrap()
            .with_kid("2026-09");
        let token = signed_token(&jwt, &signer);

        let key_set = JWKSet::new(vec![other.to_public(), signer.to_public()]);
        let claims = assert_ok!(token.verify_with_key_set(jwt.registry(), &key_set));
        assert_eq!(claims.iss(), Some("joe"));

        let key_set = JWKSet::new(vec![other.to_public()]);
        let err = assert_err!(token.verify_with_key_set(jwt.registry(), &key_set));
        assert!(err.is_cryptographic_failure());
    }
}
