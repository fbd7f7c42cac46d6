use jostle_crypto::jose::{Key, KeyProvider, SigningHandler};
use zeroize::Zeroizing;

use crate::{
    ClaimsSet, ErrorKind, Header, JoseError, Jwt, Result, SignedJwt, Token,
    compression::{self, inflate},
};

#[derive(Debug, Clone)]
/// JWE secured JWT:
/// `b64(header).b64(encrypted_key).b64(iv).b64(ciphertext).b64(tag)`.
pub struct EncryptedJwt {
    header: Header,
    aad: String,
    encrypted_key: Vec<u8>,
    iv: Vec<u8>,
    ciphertext: Vec<u8>,
    tag: Vec<u8>,
    engine: Jwt,
}

impl EncryptedJwt {
    pub(crate) fn new(
        header: Header,
        aad: String,
        [encrypted_key, iv, ciphertext, tag]: [Vec<u8>; 4],
        engine: Jwt,
    ) -> Self {
        Self {
            header,
            aad,
            encrypted_key,
            iv,
            ciphertext,
            tag,
            engine,
        }
    }

    /// Header of the token, which is authenticated but not encrypted.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// The protected content encryption key, empty for `dir`.
    pub fn encrypted_key(&self) -> &[u8] {
        &self.encrypted_key
    }

    /// The initialization vector.
    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    /// The encrypted payload.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// The authentication tag.
    pub fn tag(&self) -> &[u8] {
        &self.tag
    }

    /// Decrypt the payload with the recipient's private (or shared) key.
    ///
    /// Unregistered `alg`, `enc` or `zip` identifiers are reported as such,
    /// every other failure is the opaque cryptographic failure.
    pub fn decrypt_payload(&self, key: &Key) -> Result<Zeroizing<Vec<u8>>> {
        let (alg, enc) = match (self.header.alg(), self.header.enc()) {
            (Some(alg), Some(enc)) => (alg, enc),
            _ => {
                return Err(JoseError::malformed_token(
                    "encrypted token header requires 'alg' and 'enc'",
                ));
            }
        };
        let handler = self.engine.registry().encryption_handler(alg, enc)?;
        let zip = compression::compression(&self.header)?;

        let plaintext = handler
            .decrypt_content_encryption_key(key, &self.encrypted_key)
            .and_then(|cek| {
                handler.decrypt_ciphertext(
                    &cek,
                    &self.iv,
                    &self.ciphertext,
                    &self.tag,
                    self.aad.as_bytes(),
                )
            })
            .inspect_err(|err| tracing::debug!(alg, enc, "decryption failed: {err}"))?;

        match zip {
            Some(_) => inflate(&plaintext, self.engine.config().max_inflated_len()),
            None => Ok(plaintext),
        }
    }

    /// Decrypt the token with the recipient's private (or shared) key.
    pub fn decrypt(&self, key: &Key) -> Result<ClaimsSet> {
        let payload = self.decrypt_payload(key)?;
        ClaimsSet::parse(&payload)
    }

    /// Decrypt the token with the key the provider returns for the header's `kid`.
    pub fn decrypt_with_provider(&self, provider: &dyn KeyProvider) -> Result<ClaimsSet> {
        let key = lookup_key(&self.header, provider)?;
        self.decrypt(&key)
    }
}

#[derive(Debug, Clone)]
/// Nested JWT: a JWE whose payload (`cty: JWT`) is a signed JWT.
///
/// The inner token is only reachable after decryption, so the
/// outer token itself cannot be verified.
pub struct SignedThenEncryptedJwt(EncryptedJwt);

impl SignedThenEncryptedJwt {
    pub(crate) fn new(token: EncryptedJwt) -> Self {
        Self(token)
    }

    /// Header of the outer (encrypted) token.
    pub fn header(&self) -> &Header {
        self.0.header()
    }

    /// The outer encrypted token.
    pub fn encrypted(&self) -> &EncryptedJwt {
        &self.0
    }

    /// Decrypt the outer token and reconstruct the inner signed token,
    /// which is not verified yet.
    pub fn decrypt(&self, key: &Key) -> Result<SignedJwt> {
        let payload = self.0.decrypt_payload(key)?;
        let inner = std::str::from_utf8(&payload)
            .map_err(|err| JoseError::new(ErrorKind::MalformedToken, err))?;
        match self.0.engine.reconstruct(inner)? {
            Token::Signed(token) => Ok(token),
            _ => Err(JoseError::malformed_token(
                "nested token payload is not a signed token",
            )),
        }
    }

    /// Decrypt the outer token, then verify the inner token
    /// with a handler chosen by the caller.
    pub fn decrypt_and_verify(
        &self,
        key: &Key,
        handler: &dyn SigningHandler,
    ) -> Result<ClaimsSet> {
        let inner = self.decrypt(key)?;
        inner.verify(handler)?;
        Ok(inner.into_unverified_claims())
    }

    /// Decrypt with the key the provider returns for the outer `kid`,
    /// then verify the inner token.
    pub fn decrypt_with_provider_and_verify(
        &self,
        provider: &dyn KeyProvider,
        handler: &dyn SigningHandler,
    ) -> Result<ClaimsSet> {
        let key = lookup_key(self.header(), provider)?;
        self.decrypt_and_verify(&key, handler)
    }

    /// A nested token has no signature of its own: this always fails
    /// with the cryptographic failure. Use [`Self::decrypt_and_verify`].
    pub fn verify(&self, _handler: &dyn SigningHandler) -> Result<ClaimsSet> {
        tracing::debug!("verify called on a nested token before decryption");
        Err(JoseError::cryptographic_failure())
    }
}

fn lookup_key(header: &Header, provider: &dyn KeyProvider) -> Result<Key> {
    let kid = header
        .kid()
        .ok_or_else(|| JoseError::key_resolution("header has no 'kid' to look up a key"))?;
    provider
        .lookup(kid)
        .map_err(|err| JoseError::new(ErrorKind::KeyResolution, err))
}
