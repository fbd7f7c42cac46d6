//! # JOSE: JSON Object Signing and Encryption
//!
//! JOSE is an IETF standard for securely transferring data between parties using JSON.
//! It provides a general framework for signing and encrypting any kind of data, and it's
//! the foundation for technologies like JSON Web Tokens (JWTs).
//!
//! This module provides the algorithm and key layer of the framework:
//!
//! * JWA (JSON Web Algorithms): the identifiers found in the `alg`, `enc` and `zip`
//!   header parameters, see [`JWA`], [`JWEAlgorithm`], [`JWEEncryption`] and
//!   [`JWECompression`]. See [`rfc7518`] for more details.
//!
//! * JWK (JSON Web Key): a JSON format for representing cryptographic keys, see [`JWK`]
//!   and [`JWKSet`]. Keys are resolved into native key material ([`Key`]) before use.
//!   See [`rfc7517`] for more details.
//!
//! * Handlers: capability objects that sign/verify ([`SigningHandler`]) or
//!   encrypt/decrypt ([`EncryptionHandler`]) for one algorithm. Handlers are
//!   looked up by identifier through an [`AlgorithmRegistry`], so that
//!   token orchestration never needs to branch on algorithm names.
//!
//! Building and reconstructing the compact JWS ([`rfc7515`]) and
//! JWE ([`rfc7516`]) serializations is done by the `jostle-jwt` crate.
//!
//! [`rfc7515`]: https://datatracker.ietf.org/doc/html/rfc7515
//! [`rfc7516`]: https://datatracker.ietf.org/doc/html/rfc7516
//! [`rfc7517`]: https://datatracker.ietf.org/doc/html/rfc7517
//! [`rfc7518`]: https://datatracker.ietf.org/doc/html/rfc7518

mod jwa;
pub use jwa::{JWA, JWECompression, JWEAlgorithm, JWEEncryption};

mod key;
pub use key::{
    EcPrivateKey, EcPublicKey, Key, KeyProvider, RsaPrivateKey, RsaPublicKey, SymmetricKey,
};

mod jwk;
pub use jwk::{JWK, JWKEllipticCurves, JWKType, JWKUse};

mod jwk_set;
pub use jwk_set::{JWKSet, KeyIndex, KeySetFetcher};

mod sign;
pub use sign::{
    EcdsaSigningHandler, HmacSigningHandler, NoneSigningHandler, RsaSigningHandler,
    SigningAlgorithm, SigningHandler,
};

mod enc;
pub use enc::{
    AesCbcHmacContentEncryption, AesGcmContentEncryption, AesKeyWrapKeyManagement,
    ContentEncryptionHandler, DirectKeyManagement, EncryptionHandler, KeyManagementHandler,
    RsaKeyManagement,
};

mod registry;
pub use registry::AlgorithmRegistry;
