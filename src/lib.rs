//! jostle builds, serializes, signs, encrypts, parses, verifies and decrypts
//! compact JSON security tokens:
//!
//! - [JWT](jwt) headers and claims, plain (unsecured) tokens
//! - JWS signed tokens: `HS*`, `RS*`, `PS*`, `ES*` and `none`
//! - JWE encrypted tokens: `RSA1_5`, `RSA-OAEP(-256)`, `A128KW`, `A256KW` and `dir`
//!   with `A128CBC-HS256`, `A256CBC-HS512`, `A128GCM` and `A256GCM`
//! - nested signed-then-encrypted tokens
//! - [JWK and JWK Sets](crypto::jose) to resolve key material
//!
//! All primitives are provided by [`aws-lc-rs`](https://docs.rs/aws-lc-rs).
//!
//! # Example
//!
//! ```
//! use jostle::{
//!     crypto::jose::{JWK, JWKEllipticCurves},
//!     jwt::{ClaimsSet, Header, Jwt},
//! };
//!
//! let jwt = Jwt::default();
//! let jwk = JWK::generate_ec(JWKEllipticCurves::P256)?;
//! let key = jwk.resolve()?;
//!
//! let claims = ClaimsSet::new().with_issuer("joe".to_owned());
//! let token = jwt.build_signed(&Header::signed("ES256"), &claims, &key)?;
//!
//! let signed = jwt.reconstruct(&token)?.into_signed().ok_or("not signed")?;
//! let verifier = jwt.registry().signing_handler("ES256", &key.to_public())?;
//! assert_eq!(signed.verify(&verifier)?.iss(), Some("joe"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Verification and decryption failures are deliberately indistinguishable:
//! each is reported as the same [`ErrorKind::CryptographicFailure`].

#![cfg_attr(docsrs, feature(doc_cfg))]

#[doc(inline)]
pub use jostle_crypto::{ErrorKind, JoseError, Result};

pub mod error {
    //! Error utilities shared by the jostle crates.

    #[doc(inline)]
    pub use jostle_error::*;
}

pub mod crypto {
    //! DER codec, JOSE algorithms, key material and the algorithm registry.

    #[doc(inline)]
    pub use jostle_crypto::*;
}

pub mod jwt {
    //! Headers, claims and the compact token engine.

    #[doc(inline)]
    pub use jostle_jwt::*;
}
