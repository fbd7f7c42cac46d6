//! Crypto primitives used by jostle.
//!
//! This includes:
//! - a minimal [DER codec](der) for ECDSA signatures and RSA keys
//! - Javascript object signing and encryption (JOSE) algorithms: JWA, JWK, JWKSet
//! - signing and encryption handlers, looked up through an [`AlgorithmRegistry`](jose::AlgorithmRegistry)
//!
//! All primitives are provided by [`aws-lc-rs`](https://docs.rs/aws-lc-rs).
//!
//! Crate used by the end-user `jostle` crate and `jostle` crate authors alike.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(test), warn(clippy::print_stdout, clippy::dbg_macro))]

mod error;
pub use error::{ErrorKind, JoseError, Result};

pub mod der;
pub mod jose;

pub mod dep {
    //! Dependencies for jostle crypto modules.
    //!
    //! Exported for your convenience

    pub mod aws_lc_rs {
        //! Re-export of the [`aws-lc-rs`] crate.
        //!
        //! [`aws-lc-rs`]: https://docs.rs/aws-lc-rs

        #[doc(inline)]
        pub use aws_lc_rs::*;
    }

    pub mod zeroize {
        //! Re-export of the [`zeroize`] crate.
        //!
        //! [`zeroize`]: https://docs.rs/zeroize

        #[doc(inline)]
        pub use zeroize::*;
    }
}
