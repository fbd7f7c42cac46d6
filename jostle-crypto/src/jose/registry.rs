use std::{fmt, sync::Arc};

use indexmap::IndexMap;

use crate::{
    JoseError, Result,
    jose::{
        AesCbcHmacContentEncryption, AesGcmContentEncryption, AesKeyWrapKeyManagement,
        ContentEncryptionHandler, DirectKeyManagement, EncryptionHandler, JWA, Key,
        KeyManagementHandler, RsaKeyManagement, SigningAlgorithm, SigningHandler,
    },
};

#[derive(Clone, Default)]
/// Maps algorithm identifiers found in JOSE headers to their handlers.
///
/// The registry is read-only once built and is meant to be shared,
/// e.g. behind an [`Arc`]. Token orchestration looks up every
/// algorithm here, so algorithms can be added or removed without
/// touching it.
pub struct AlgorithmRegistry {
    signing: IndexMap<String, Arc<dyn SigningAlgorithm>>,
    key_management: IndexMap<String, Arc<dyn KeyManagementHandler>>,
    content_encryption: IndexMap<String, Arc<dyn ContentEncryptionHandler>>,
}

impl AlgorithmRegistry {
    /// Create a new [`AlgorithmRegistry`] with all built-in algorithms registered.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for alg in JWA::ALL {
            registry.set_signing_algorithm(Arc::new(*alg));
        }
        registry
            .set_key_management_algorithm(Arc::new(RsaKeyManagement::RSA1_5))
            .set_key_management_algorithm(Arc::new(RsaKeyManagement::RSA_OAEP))
            .set_key_management_algorithm(Arc::new(RsaKeyManagement::RSA_OAEP_256))
            .set_key_management_algorithm(Arc::new(AesKeyWrapKeyManagement::A128KW))
            .set_key_management_algorithm(Arc::new(AesKeyWrapKeyManagement::A256KW))
            .set_key_management_algorithm(Arc::new(DirectKeyManagement))
            .set_content_encryption_algorithm(Arc::new(
                AesCbcHmacContentEncryption::A128CBC_HS256,
            ))
            .set_content_encryption_algorithm(Arc::new(
                AesCbcHmacContentEncryption::A256CBC_HS512,
            ))
            .set_content_encryption_algorithm(Arc::new(AesGcmContentEncryption::A128GCM))
            .set_content_encryption_algorithm(Arc::new(AesGcmContentEncryption::A256GCM));
        registry
    }

    /// Create a new [`AlgorithmRegistry`] without any algorithm registered.
    pub fn empty() -> Self {
        Self::default()
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Register a signing algorithm, replacing any algorithm with the same name.
        pub fn signing_algorithm(mut self, algorithm: Arc<dyn SigningAlgorithm>) -> Self {
            self.signing.insert(algorithm.name().to_owned(), algorithm);
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Register a key management algorithm, replacing any algorithm with the same name.
        pub fn key_management_algorithm(mut self, algorithm: Arc<dyn KeyManagementHandler>) -> Self {
            self.key_management.insert(algorithm.algorithm().to_owned(), algorithm);
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Register a content encryption algorithm, replacing any algorithm with the same name.
        pub fn content_encryption_algorithm(mut self, algorithm: Arc<dyn ContentEncryptionHandler>) -> Self {
            self.content_encryption.insert(algorithm.algorithm().to_owned(), algorithm);
            self
        }
    }

    /// Remove the signing algorithm with the given identifier, if registered.
    #[must_use]
    pub fn without_signing_algorithm(mut self, alg: &str) -> Self {
        self.signing.shift_remove(alg);
        self
    }

    /// Returns true if a signing algorithm is registered for `alg`.
    pub fn supports_signing(&self, alg: &str) -> bool {
        self.signing.contains_key(alg)
    }

    /// Returns true if an encryption handler can be built for (`alg`, `enc`).
    pub fn supports_encryption(&self, alg: &str, enc: &str) -> bool {
        self.key_management.contains_key(alg) && self.content_encryption.contains_key(enc)
    }

    /// Identifiers of the registered signing algorithms, in registration order.
    pub fn signing_algorithms(&self) -> impl Iterator<Item = &str> {
        self.signing.keys().map(String::as_str)
    }

    /// Create the signing handler for `alg` with the given key.
    pub fn signing_handler(&self, alg: &str, key: &Key) -> Result<Box<dyn SigningHandler>> {
        let algorithm = self.signing.get(alg).ok_or_else(|| {
            JoseError::unsupported_algorithm(format!("no signing algorithm registered for '{alg}'"))
        })?;
        algorithm.handler(key)
    }

    /// Create the encryption handler for the (`alg`, `enc`) pair.
    pub fn encryption_handler(&self, alg: &str, enc: &str) -> Result<EncryptionHandler> {
        let key_management = self.key_management.get(alg).ok_or_else(|| {
            JoseError::unsupported_algorithm(format!(
                "no key management algorithm registered for '{alg}'"
            ))
        })?;
        let content_encryption = self.content_encryption.get(enc).ok_or_else(|| {
            JoseError::unsupported_algorithm(format!(
                "no content encryption algorithm registered for '{enc}'"
            ))
        })?;
        Ok(EncryptionHandler::new(
            key_management.clone(),
            content_encryption.clone(),
        ))
    }
}

impl fmt::Debug for AlgorithmRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmRegistry")
            .field("signing", &self.signing.keys().collect::<Vec<_>>())
            .field("key_management", &self.key_management.keys().collect::<Vec<_>>())
            .field(
                "content_encryption",
                &self.content_encryption.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}
