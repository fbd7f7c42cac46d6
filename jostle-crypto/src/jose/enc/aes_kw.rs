use aws_lc_rs::key_wrap::{AES_128, AES_256, AesBlockCipher, AesKek, KeyWrap as _};
use zeroize::Zeroizing;

use super::symmetric_key;
use crate::{
    JoseError, Result,
    jose::{JWEAlgorithm, Key, KeyManagementHandler},
};

/// Size of the AES key wrap integrity check block.
const KW_BLOCK_LEN: usize = 8;

#[derive(Debug, Clone, Copy)]
/// AES key wrap (`A128KW`, `A256KW`) as defined in rfc3394.
pub struct AesKeyWrapKeyManagement {
    alg: JWEAlgorithm,
    cipher: &'static AesBlockCipher,
    key_len: usize,
}

impl AesKeyWrapKeyManagement {
    /// `A128KW`
    pub const A128KW: Self = Self {
        alg: JWEAlgorithm::A128KW,
        cipher: &AES_128,
        key_len: 16,
    };

    /// `A256KW`
    pub const A256KW: Self = Self {
        alg: JWEAlgorithm::A256KW,
        cipher: &AES_256,
        key_len: 32,
    };
}

impl KeyManagementHandler for AesKeyWrapKeyManagement {
    fn algorithm(&self) -> &str {
        self.alg.as_str()
    }

    fn encrypt_content_encryption_key(&self, key: &Key, cek: &[u8]) -> Result<Vec<u8>> {
        let kek = symmetric_key(self.algorithm(), key, self.key_len)?;
        let kek = AesKek::new(self.cipher, kek)
            .map_err(|err| JoseError::new(crate::ErrorKind::KeyResolution, err))?;

        let mut output = vec![0u8; cek.len() + KW_BLOCK_LEN];
        let len = kek
            .wrap(cek, &mut output)
            .map_err(|err| JoseError::new(crate::ErrorKind::KeyResolution, err))?
            .len();
        output.truncate(len);
        Ok(output)
    }

    fn decrypt_content_encryption_key(
        &self,
        key: &Key,
        encrypted_key: &[u8],
        cek_len: usize,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let kek = symmetric_key(self.algorithm(), key, self.key_len)?;
        if encrypted_key.len() < 3 * KW_BLOCK_LEN
            || encrypted_key.len() % KW_BLOCK_LEN != 0
            || encrypted_key.len() != cek_len + KW_BLOCK_LEN
        {
            return Err(JoseError::cryptographic_failure());
        }

        let kek = AesKek::new(self.cipher, kek)
            .map_err(|err| JoseError::new(crate::ErrorKind::KeyResolution, err))?;
        let mut output = Zeroizing::new(vec![0u8; encrypted_key.len()]);
        let len = kek
            .unwrap(encrypted_key, &mut output)
            .map_err(JoseError::cryptographic_failure_from)?
            .len();
        output.truncate(len);
        Ok(output)
    }
}
