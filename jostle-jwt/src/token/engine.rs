use std::sync::Arc;

use jostle_crypto::jose::{AlgorithmRegistry, Key, SigningHandler};

use crate::{
    ClaimsSet, EncryptedJwt, Header, HeaderKind, JoseError, JwtConfig, PlainJwt, Result,
    SignedJwt, SignedThenEncryptedJwt, Token,
    compact::{self, CompactParts},
    compression::{self, deflate},
};

#[derive(Debug, Clone)]
/// Builds and reconstructs compact tokens.
///
/// Every algorithm is looked up in the [`AlgorithmRegistry`],
/// limits and policy come from the [`JwtConfig`]. Both are
/// shared read-only, so cloning an engine is cheap.
pub struct Jwt {
    registry: Arc<AlgorithmRegistry>,
    config: Arc<JwtConfig>,
}

impl Default for Jwt {
    fn default() -> Self {
        Self::new(Arc::new(AlgorithmRegistry::new()), Arc::default())
    }
}

impl Jwt {
    /// Create a new [`Jwt`] engine.
    pub fn new(registry: Arc<AlgorithmRegistry>, config: Arc<JwtConfig>) -> Self {
        Self { registry, config }
    }

    /// The algorithm registry of this engine.
    pub fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    /// The configuration of this engine.
    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Build an unsecured token: `b64(header).b64(claims).`
    pub fn build_plain(&self, header: &Header, claims: &ClaimsSet) -> Result<String> {
        self.check_plain_allowed()?;
        expect_kind(header, HeaderKind::Plain)?;
        header.validate_critical(self.config.understood_critical_headers())?;

        Ok(compact::join(&[&header.encode()?, &claims.encode()?, ""]))
    }

    /// Build a signed token, signing with the handler for the header's `alg`.
    pub fn build_signed(&self, header: &Header, claims: &ClaimsSet, key: &Key) -> Result<String> {
        expect_kind(header, HeaderKind::Signed)?;
        let alg = header.alg().unwrap_or_default();
        let handler = self.registry.signing_handler(alg, key)?;
        self.build_signed_with(header, claims, &handler)
    }

    /// Build a signed token with a handler chosen by the caller.
    ///
    /// The handler's algorithm must be the header's `alg`.
    pub fn build_signed_with(
        &self,
        header: &Header,
        claims: &ClaimsSet,
        handler: &dyn SigningHandler,
    ) -> Result<String> {
        expect_kind(header, HeaderKind::Signed)?;
        if header.alg() != Some(handler.algorithm()) {
            return Err(JoseError::key_resolution(format!(
                "handler for '{}' cannot sign a token with alg '{}'",
                handler.algorithm(),
                header.alg().unwrap_or_default()
            )));
        }
        header.validate_critical(self.config.understood_critical_headers())?;

        let signing_input = compact::join(&[&header.encode()?, &claims.encode()?]);
        let signature = handler.sign(signing_input.as_bytes())?;
        Ok(compact::join(&[&signing_input, &compact::encode(signature)]))
    }

    /// Build an encrypted token for the recipient's (public or shared) key.
    pub fn build_encrypted(
        &self,
        header: &Header,
        claims: &ClaimsSet,
        recipient_key: &Key,
    ) -> Result<String> {
        self.encrypt(header, &claims.to_vec()?, recipient_key)
    }

    /// Build a signed token, then encrypt it for the recipient.
    ///
    /// The outer header gets `cty: JWT`.
    pub fn build_signed_then_encrypted(
        &self,
        inner_header: &Header,
        claims: &ClaimsSet,
        signing_key: &Key,
        outer_header: &Header,
        recipient_key: &Key,
    ) -> Result<String> {
        let inner = self.build_signed(inner_header, claims, signing_key)?;
        let outer_header = outer_header.clone().with_cty("JWT".to_owned());
        self.encrypt(&outer_header, inner.as_bytes(), recipient_key)
    }

    fn encrypt(&self, header: &Header, payload: &[u8], recipient_key: &Key) -> Result<String> {
        expect_kind(header, HeaderKind::Encrypted)?;
        let (alg, enc) = (
            header.alg().unwrap_or_default(),
            header.enc().unwrap_or_default(),
        );
        let handler = self.registry.encryption_handler(alg, enc)?;
        header.validate_critical(self.config.understood_critical_headers())?;

        let compressed;
        let plaintext = match compression::compression(header)? {
            Some(_) => {
                compressed = deflate(payload)?;
                &compressed[..]
            }
            None => payload,
        };

        let cek = handler.generate_content_encryption_key(recipient_key)?;
        let encrypted_key = handler.encrypt_content_encryption_key(recipient_key, &cek)?;
        let iv = handler.generate_initialization_vector()?;
        let encoded_header = header.encode()?;
        let (ciphertext, tag) =
            handler.encrypt_plaintext(&cek, &iv, plaintext, encoded_header.as_bytes())?;

        Ok(compact::join(&[
            &encoded_header,
            &compact::encode(encrypted_key),
            &compact::encode(iv),
            &compact::encode(ciphertext),
            &compact::encode(tag),
        ]))
    }

    /// Reconstruct a token from its compact serialization.
    ///
    /// Only the structure is checked: signatures are verified and
    /// payloads decrypted by the returned token.
    pub fn reconstruct(&self, token: &str) -> Result<Token> {
        if token.len() > self.config.max_token_len() {
            return Err(JoseError::malformed_token(format!(
                "token of {} bytes exceeds the limit of {} bytes",
                token.len(),
                self.config.max_token_len()
            )));
        }

        let parts = compact::split(token)?;
        let header = Header::parse(&compact::decode(parts.header(), "header")?)?;
        header.validate_critical(self.config.understood_critical_headers())?;
        let kind = header.kind();
        tracing::trace!(%kind, "reconstruct token");

        match (parts, kind) {
            (CompactParts::Three([_, claims, signature]), HeaderKind::Plain) => {
                self.check_plain_allowed()?;
                if !signature.is_empty() {
                    return Err(JoseError::malformed_token(
                        "plain token must have an empty signature",
                    ));
                }
                let claims = ClaimsSet::parse(&compact::decode(claims, "claims")?)?;
                Ok(PlainJwt::new(header, claims).into())
            }
            (CompactParts::Three([encoded_header, claims, signature]), HeaderKind::Signed) => {
                // the exact received bytes, never a re-serialization
                let signing_input = compact::join(&[encoded_header, claims]);
                let signature = compact::decode(signature, "signature")?;
                let claims = ClaimsSet::parse(&compact::decode(claims, "claims")?)?;
                Ok(SignedJwt::new(header, claims, signing_input, signature).into())
            }
            (
                CompactParts::Five([encoded_header, encrypted_key, iv, ciphertext, tag]),
                HeaderKind::Encrypted,
            ) => {
                let parts = [
                    compact::decode(encrypted_key, "encrypted key")?,
                    compact::decode(iv, "iv")?,
                    compact::decode(ciphertext, "ciphertext")?,
                    compact::decode(tag, "tag")?,
                ];
                let nested = header.is_nested();
                let encrypted =
                    EncryptedJwt::new(header, encoded_header.to_owned(), parts, self.clone());
                Ok(if nested {
                    SignedThenEncryptedJwt::new(encrypted).into()
                } else {
                    encrypted.into()
                })
            }
            (CompactParts::Three(_), kind) => Err(JoseError::malformed_token(format!(
                "{kind} header in a three part token"
            ))),
            (CompactParts::Five(_), kind) => Err(JoseError::malformed_token(format!(
                "{kind} header in a five part token"
            ))),
        }
    }

    fn check_plain_allowed(&self) -> Result<()> {
        if self.config.allow_plain() {
            Ok(())
        } else {
            Err(JoseError::unsupported_algorithm("plain tokens are not allowed"))
        }
    }
}

fn expect_kind(header: &Header, expected: HeaderKind) -> Result<()> {
    let kind = header.kind();
    if kind == expected {
        Ok(())
    } else {
        Err(JoseError::malformed_token(format!(
            "{kind} header cannot be used to build a {expected} token"
        )))
    }
}
