//! utilities crate for jostle
//!
//! `jostle-utils` contains utilities used by the other `jostle` crates,
//! not really being part of one of them.
//!
//! Crate used by the end-user `jostle` crate and `jostle` crate authors alike.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(not(test), warn(clippy::print_stdout, clippy::dbg_macro))]

#[doc(hidden)]
#[macro_use]
pub mod macros;
