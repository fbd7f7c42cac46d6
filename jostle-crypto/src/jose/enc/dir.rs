use zeroize::Zeroizing;

use super::symmetric_key;
use crate::{
    JoseError, Result,
    jose::{Key, KeyManagementHandler},
};

#[derive(Debug, Clone, Copy, Default)]
/// Direct encryption (`dir`): the shared symmetric key is the CEK
/// and the JWE encrypted key is empty.
pub struct DirectKeyManagement;

impl KeyManagementHandler for DirectKeyManagement {
    fn algorithm(&self) -> &str {
        "dir"
    }

    fn content_encryption_key(
        &self,
        key: &Key,
        cek_len: usize,
    ) -> Result<Option<Zeroizing<Vec<u8>>>> {
        let key = symmetric_key(self.algorithm(), key, cek_len)?;
        Ok(Some(Zeroizing::new(key.to_vec())))
    }

    fn encrypt_content_encryption_key(&self, _key: &Key, _cek: &[u8]) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn decrypt_content_encryption_key(
        &self,
        key: &Key,
        encrypted_key: &[u8],
        cek_len: usize,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let key = symmetric_key(self.algorithm(), key, cek_len)?;
        if !encrypted_key.is_empty() {
            return Err(JoseError::cryptographic_failure());
        }
        Ok(Zeroizing::new(key.to_vec()))
    }
}
