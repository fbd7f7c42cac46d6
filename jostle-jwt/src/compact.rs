//! Compact serialization: `.`-joined base64url segments without padding.

use base64::{Engine as _, prelude::BASE64_URL_SAFE_NO_PAD};

use crate::{ErrorKind, JoseError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The segments of a compact token, borrowed from the token string.
pub enum CompactParts<'a> {
    /// `header.payload.signature`, used by plain and signed tokens.
    Three([&'a str; 3]),
    /// `header.encrypted_key.iv.ciphertext.tag`, used by encrypted tokens.
    Five([&'a str; 5]),
}

impl<'a> CompactParts<'a> {
    /// The (encoded) header segment.
    pub fn header(&self) -> &'a str {
        match self {
            Self::Three([header, ..]) | Self::Five([header, ..]) => header,
        }
    }
}

/// Split a compact token on `.`.
///
/// Anything other than 3 or 5 segments is a [`ErrorKind::MalformedToken`].
pub fn split(token: &str) -> Result<CompactParts<'_>> {
    let parts: Vec<&str> = token.split('.').collect();
    match parts.as_slice() {
        &[a, b, c] => Ok(CompactParts::Three([a, b, c])),
        &[a, b, c, d, e] => Ok(CompactParts::Five([a, b, c, d, e])),
        _ => Err(JoseError::malformed_token(format!(
            "expected 3 or 5 parts, got {}",
            parts.len()
        ))),
    }
}

/// Join already encoded segments with `.`.
pub fn join(parts: &[&str]) -> String {
    parts.join(".")
}

/// Encode bytes as base64url without padding.
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode a base64url segment, rejecting padding and non-canonical encodings.
///
/// `segment` names the part of the token for the error message.
pub fn decode(value: &str, segment: &'static str) -> Result<Vec<u8>> {
    BASE64_URL_SAFE_NO_PAD.decode(value).map_err(|err| {
        JoseError::message(
            ErrorKind::MalformedToken,
            format!("invalid base64url in {segment}: {err}"),
        )
    })
}
