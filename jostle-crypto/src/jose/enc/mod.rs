//! Encryption handlers for compact JWE.
//!
//! A JWE is produced by two cooperating algorithms:
//!
//! * key management (`alg`): protects the content encryption key (CEK)
//!   for the recipient, see [`KeyManagementHandler`];
//! * content encryption (`enc`): authenticated encryption of the payload
//!   with the CEK, see [`ContentEncryptionHandler`].
//!
//! The [`EncryptionHandler`] pairs both for one (`alg`, `enc`) combination.
//!
//! All decryption failures are reported as the same opaque
//! cryptographic failure, so that they cannot be told apart by a caller.

use std::{fmt, sync::Arc};

use zeroize::Zeroizing;

use crate::{JoseError, Result, jose::Key};

mod aes_kw;
pub use aes_kw::AesKeyWrapKeyManagement;

mod cbc_hmac;
pub use cbc_hmac::AesCbcHmacContentEncryption;

mod dir;
pub use dir::DirectKeyManagement;

mod gcm;
pub use gcm::AesGcmContentEncryption;

mod rsa;
pub use rsa::RsaKeyManagement;

/// Key management algorithm (the JWE `alg` header parameter).
pub trait KeyManagementHandler: Send + Sync + fmt::Debug {
    /// The `alg` identifier this handler implements.
    fn algorithm(&self) -> &str;

    /// The CEK to use with the given recipient key, if this algorithm
    /// determines it, as direct encryption does.
    ///
    /// Returns `None` when a random CEK of `cek_len` bytes is to be generated.
    fn content_encryption_key(
        &self,
        _key: &Key,
        _cek_len: usize,
    ) -> Result<Option<Zeroizing<Vec<u8>>>> {
        Ok(None)
    }

    /// Protect the CEK for the recipient, returning the JWE encrypted key.
    fn encrypt_content_encryption_key(&self, key: &Key, cek: &[u8]) -> Result<Vec<u8>>;

    /// Recover the CEK of `cek_len` bytes from the JWE encrypted key.
    fn decrypt_content_encryption_key(
        &self,
        key: &Key,
        encrypted_key: &[u8],
        cek_len: usize,
    ) -> Result<Zeroizing<Vec<u8>>>;
}

/// Content encryption algorithm (the JWE `enc` header parameter).
pub trait ContentEncryptionHandler: Send + Sync + fmt::Debug {
    /// The `enc` identifier this handler implements.
    fn algorithm(&self) -> &str;

    /// Size in bytes of the CEK.
    fn key_len(&self) -> usize;

    /// Size in bytes of the initialization vector.
    fn iv_len(&self) -> usize;

    /// Encrypt the plaintext, returning the ciphertext and the authentication tag.
    fn encrypt(
        &self,
        cek: &[u8],
        iv: &[u8],
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<(Vec<u8>, Vec<u8>)>;

    /// Authenticate and decrypt the ciphertext.
    fn decrypt(
        &self,
        cek: &[u8],
        iv: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        aad: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>>;
}

#[derive(Clone, Debug)]
/// Encryption handler for one (`alg`, `enc`) pair.
pub struct EncryptionHandler {
    key_management: Arc<dyn KeyManagementHandler>,
    content_encryption: Arc<dyn ContentEncryptionHandler>,
}

impl EncryptionHandler {
    /// Create a new [`EncryptionHandler`] from its two halves.
    pub fn new(
        key_management: Arc<dyn KeyManagementHandler>,
        content_encryption: Arc<dyn ContentEncryptionHandler>,
    ) -> Self {
        Self {
            key_management,
            content_encryption,
        }
    }

    /// The `alg` identifier.
    pub fn algorithm(&self) -> &str {
        self.key_management.algorithm()
    }

    /// The `enc` identifier.
    pub fn encryption(&self) -> &str {
        self.content_encryption.algorithm()
    }

    /// Generate the CEK for a new token for the given recipient key.
    pub fn generate_content_encryption_key(&self, key: &Key) -> Result<Zeroizing<Vec<u8>>> {
        let len = self.content_encryption.key_len();
        if let Some(cek) = self.key_management.content_encryption_key(key, len)? {
            return Ok(cek);
        }
        let mut cek = Zeroizing::new(vec![0u8; len]);
        aws_lc_rs::rand::fill(&mut cek)
            .map_err(|err| JoseError::new(crate::ErrorKind::KeyResolution, err))?;
        Ok(cek)
    }

    /// Protect the CEK for the recipient.
    pub fn encrypt_content_encryption_key(&self, key: &Key, cek: &[u8]) -> Result<Vec<u8>> {
        self.key_management.encrypt_content_encryption_key(key, cek)
    }

    /// Recover the CEK using the recipient's private (or shared) key.
    pub fn decrypt_content_encryption_key(
        &self,
        key: &Key,
        encrypted_key: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        self.key_management.decrypt_content_encryption_key(
            key,
            encrypted_key,
            self.content_encryption.key_len(),
        )
    }

    /// Generate a fresh random initialization vector.
    pub fn generate_initialization_vector(&self) -> Result<Vec<u8>> {
        let mut iv = vec![0u8; self.content_encryption.iv_len()];
        aws_lc_rs::rand::fill(&mut iv)
            .map_err(|err| JoseError::new(crate::ErrorKind::KeyResolution, err))?;
        Ok(iv)
    }

    /// Encrypt the plaintext, returning the ciphertext and the authentication tag.
    pub fn encrypt_plaintext(
        &self,
        cek: &[u8],
        iv: &[u8],
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<(Vec<u8>, Vec<u8>)> {
        self.content_encryption.encrypt(cek, iv, plaintext, aad)
    }

    /// Authenticate and decrypt the ciphertext.
    pub fn decrypt_ciphertext(
        &self,
        cek: &[u8],
        iv: &[u8],
        ciphertext: &[u8],
        tag: &[u8],
        aad: &[u8],
    ) -> Result<Zeroizing<Vec<u8>>> {
        self.content_encryption
            .decrypt(cek, iv, ciphertext, tag, aad)
    }
}

fn symmetric_key<'a>(alg: &str, key: &'a Key, len: usize) -> Result<&'a [u8]> {
    match key {
        Key::Symmetric(key) if key.len() == len => Ok(key.as_bytes()),
        Key::Symmetric(key) => Err(JoseError::key_resolution(format!(
            "{alg} requires a key of {len} bytes, got {}",
            key.len()
        ))),
        Key::RsaPrivate(_) | Key::RsaPublic(_) | Key::EcPrivate(_) | Key::EcPublic(_) => {
            Err(key.mismatch(alg))
        }
    }
}
