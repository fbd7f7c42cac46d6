//! Tokens and the [`Jwt`] engine which builds and reconstructs them.

use crate::Header;

mod engine;
pub use engine::Jwt;

mod plain;
pub use plain::PlainJwt;

mod signed;
pub use signed::SignedJwt;

mod encrypted;
pub use encrypted::{EncryptedJwt, SignedThenEncryptedJwt};

#[derive(Debug, Clone)]
/// A reconstructed compact token.
///
/// Nothing is verified or decrypted yet: signed tokens carry their
/// signature until [`SignedJwt::verify`] is called, encrypted tokens
/// their ciphertext until they are decrypted with the recipient key.
pub enum Token {
    /// Unsecured JWT.
    Plain(PlainJwt),
    /// JWS secured JWT.
    Signed(SignedJwt),
    /// JWE secured JWT.
    Encrypted(EncryptedJwt),
    /// JWE secured JWT wrapping a signed JWT (`cty: JWT`).
    SignedThenEncrypted(SignedThenEncryptedJwt),
}

impl Token {
    /// The (outer) header of the token.
    pub fn header(&self) -> &Header {
        match self {
            Self::Plain(token) => token.header(),
            Self::Signed(token) => token.header(),
            Self::Encrypted(token) => token.header(),
            Self::SignedThenEncrypted(token) => token.header(),
        }
    }

    /// Returns the plain token, if this is one.
    pub fn into_plain(self) -> Option<PlainJwt> {
        match self {
            Self::Plain(token) => Some(token),
            _ => None,
        }
    }

    /// Returns the signed token, if this is one.
    pub fn into_signed(self) -> Option<SignedJwt> {
        match self {
            Self::Signed(token) => Some(token),
            _ => None,
        }
    }

    /// Returns the encrypted token, if this is one.
    pub fn into_encrypted(self) -> Option<EncryptedJwt> {
        match self {
            Self::Encrypted(token) => Some(token),
            _ => None,
        }
    }

    /// Returns the nested token, if this is one.
    pub fn into_signed_then_encrypted(self) -> Option<SignedThenEncryptedJwt> {
        match self {
            Self::SignedThenEncrypted(token) => Some(token),
            _ => None,
        }
    }
}

impl From<PlainJwt> for Token {
    fn from(value: PlainJwt) -> Self {
        Self::Plain(value)
    }
}

impl From<SignedJwt> for Token {
    fn from(value: SignedJwt) -> Self {
        Self::Signed(value)
    }
}

impl From<EncryptedJwt> for Token {
    fn from(value: EncryptedJwt) -> Self {
        Self::Encrypted(value)
    }
}

impl From<SignedThenEncryptedJwt> for Token {
    fn from(value: SignedThenEncryptedJwt) -> Self {
        Self::SignedThenEncrypted(value)
    }
}
