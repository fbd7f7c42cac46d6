//! `zip: DEF` payload compression (raw DEFLATE, rfc1951).

use std::io::{Read as _, Write as _};

use flate2::{Compression, read::DeflateDecoder, write::DeflateEncoder};
use jostle_crypto::jose::JWECompression;
use zeroize::Zeroizing;

use crate::{ErrorKind, Header, JoseError, Result};

/// Resolve the `zip` header parameter.
///
/// Unknown values are an [`ErrorKind::UnsupportedAlgorithm`].
pub(crate) fn compression(header: &Header) -> Result<Option<JWECompression>> {
    header.zip().map(str::parse::<JWECompression>).transpose()
}

pub(crate) fn deflate(payload: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(payload)
        .map_err(|err| JoseError::new(ErrorKind::Encoding, err))?;
    encoder
        .finish()
        .map(Zeroizing::new)
        .map_err(|err| JoseError::new(ErrorKind::Encoding, err))
}

/// Inflate a decrypted payload, reading at most `max_len` bytes.
///
/// Every failure, including exceeding the limit, is the opaque cryptographic failure.
pub(crate) fn inflate(payload: &[u8], max_len: usize) -> Result<Zeroizing<Vec<u8>>> {
    let mut inflated = Zeroizing::new(Vec::new());
    DeflateDecoder::new(payload)
        .take(u64::try_from(max_len).unwrap_or(u64::MAX).saturating_add(1))
        .read_to_end(&mut inflated)
        .map_err(JoseError::cryptographic_failure_from)?;
    if inflated.len() > max_len {
        tracing::debug!(max_len, "inflated payload exceeds limit");
        return Err(JoseError::cryptographic_failure());
    }
    Ok(inflated)
}
