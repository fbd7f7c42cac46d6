//! Compact JSON Web Tokens for jostle.
//!
//! This crate builds and reconstructs the four kinds of compact tokens:
//!
//! - plain (unsecured) JWTs, see [`PlainJwt`]
//! - signed JWTs ([`rfc7515`] JWS), see [`SignedJwt`]
//! - encrypted JWTs ([`rfc7516`] JWE), see [`EncryptedJwt`]
//! - nested signed-then-encrypted JWTs, see [`SignedThenEncryptedJwt`]
//!
//! All algorithms are looked up through an
//! [`AlgorithmRegistry`](jostle_crypto::jose::AlgorithmRegistry) owned by the [`Jwt`] engine.
//!
//! Crate used by the end-user `jostle` crate and `jostle` crate authors alike.
//!
//! [`rfc7515`]: https://datatracker.ietf.org/doc/html/rfc7515
//! [`rfc7516`]: https://datatracker.ietf.org/doc/html/rfc7516

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(test), warn(clippy::print_stdout, clippy::dbg_macro))]

pub use jostle_crypto::{ErrorKind, JoseError, Result};

pub mod compact;
pub mod json;

mod claims;
pub use claims::ClaimsSet;

mod config;
pub use config::JwtConfig;

mod header;
pub use header::{Header, HeaderKind};

mod compression;

mod token;
pub use token::{EncryptedJwt, Jwt, PlainJwt, SignedJwt, SignedThenEncryptedJwt, Token};
