use aws_lc_rs::aead::{
    AES_128_GCM, AES_256_GCM, Aad, Algorithm, LessSafeKey, NONCE_LEN, Nonce, UnboundKey,
};
use zeroize::Zeroizing;

use crate::{
    JoseError, Result,
    jose::{ContentEncryptionHandler, JWEEncryption},
};

const TAG_LEN: usize = 16;

#[derive(Debug, Clone, Copy)]
/// AES GCM content encryption (`A128GCM`, `A256GCM`),
/// with a 96 bit IV and a 128 bit tag.
pub struct AesGcmContentEncryption {
    enc: JWEEncryption,
    algorithm: &'static Algorithm,
}

impl AesGcmContentEncryption {
    /// `A128GCM`
    pub const A128GCM: Self = Self {
        enc: JWEEncryption::A128Gcm,
        algorithm: &AES_128_GCM,
    };

    /// `A256GCM`
    pub const A256GCM: Self = Self {
        enc: JWEEncryption::A256Gcm,
        algorithm: &AES_256_GCM,
    };

    fn key(&self, cek: &[u8]) -> Result<LessSafeKey> {
        if cek.len() != self.key_len() {
            return Err(JoseError::cryptographic_failure());
        }
        UnboundKey::new(self.algorithm, cek)
            .map(LessSafeKey::new)
            .map_err(JoseError::cryptographic_failure_from)
    }
}

impl ContentEncryptionHandler for AesGcmContentEncryption {
    fn algorithm(&self) -> &str {
        self.enc.as_str()
    }

    fn key_len(&self) -> usize {
        self.enc.key_len()
    }

    fn iv_len(&self) -> usize {
        NONCE_LEN
    }

    fn encrypt(
        &self,
        cek: &[u8],
        iv: &[u8],
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<(Vec<u8>, Vec<u8>)> {
        let key = self.key(cek)?;
        let nonce = Nonce::try_assume_unique_for_key(iv)
            .map_err(|err| JoseError::new(crate::ErrorKind::Encoding, err))?;

        let mut ciphertext = plaintext.to_vec();
        let tag = key
            .seal_in_place_separate_tag(nonce, Aad::from(aad), &mut ciphertext)
            .map_err(|err| JoseError::new(crate::ErrorKind::Encoding, err))?;
        Ok((ciphertext, tag.as_ref().to_vec()))
    }

    fn decrypt(
        &self,
        cek: &[u8],
        iv: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        aad: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        if tag.len() != TAG_LEN {
            return Err(JoseError::cryptographic_failure());
        }
        let key = self.key(cek)?;
        let nonce =
            Nonce::try_assume_unique_for_key(iv).map_err(JoseError::cryptographic_failure_from)?;

        let mut buffer = Zeroizing::new(Vec::with_capacity(ciphertext.len() + TAG_LEN));
        buffer.extend_from_slice(ciphertext);
        buffer.extend_from_slice(tag);
        let len = key
            .open_in_place(nonce, Aad::from(aad), &mut buffer)
            .map_err(JoseError::cryptographic_failure_from)?
            .len();
        buffer.truncate(len);
        Ok(buffer)
    }
}
