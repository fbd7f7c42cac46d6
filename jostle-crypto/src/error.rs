//! Defines the [`JoseError`] type returned by every
//! fallible operation of the jostle crates.

use std::fmt::{self, Debug, Display};

use jostle_error::{BoxError, OpaqueError};

/// Result type for JOSE operations.
///
/// See [`JoseError`] for more information about the error type.
pub type Result<T> = std::result::Result<T, JoseError>;

/// The kind of [`JoseError`] that can occur while building,
/// parsing, verifying or decrypting a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The token is structurally invalid: wrong number of parts,
    /// invalid base64url, invalid UTF-8 or JSON, duplicate JSON keys
    /// or an unsupported critical header.
    MalformedToken,
    /// The `alg`, `enc` or `zip` identifier is not registered.
    ///
    /// This is a configuration error rather than a data error.
    UnsupportedAlgorithm,
    /// Key material is missing required fields or does not match
    /// the algorithm it is used with.
    KeyResolution,
    /// A DER structure could not be read or written.
    Encoding,
    /// Verification or decryption failed.
    ///
    /// Errors of this kind never carry a source and always render
    /// the exact same message, whatever the underlying cause.
    CryptographicFailure,
    /// A registered claim (e.g. `exp` or `nbf`) did not validate.
    InvalidClaims,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedToken => write!(f, "malformed token"),
            Self::UnsupportedAlgorithm => write!(f, "unsupported algorithm"),
            Self::KeyResolution => write!(f, "key resolution"),
            Self::Encoding => write!(f, "encoding"),
            Self::CryptographicFailure => write!(f, "cryptographic failure"),
            Self::InvalidClaims => write!(f, "invalid claims"),
        }
    }
}

/// Error type for all JOSE operations.
///
/// Call [`JoseError::kind`] to determine the kind of error that occurred,
/// and [`std::error::Error::source`] to get the underlying error, which can be
/// typechecked or downcasted as usual for boxed errors.
///
/// A [`ErrorKind::CryptographicFailure`] is opaque by construction:
/// any source passed along with it is dropped.
pub struct JoseError {
    kind: ErrorKind,
    source: Option<BoxError>,
}

impl JoseError {
    /// Create a new [`JoseError`] with the given kind and source.
    pub fn new(kind: ErrorKind, source: impl Into<BoxError>) -> Self {
        if kind == ErrorKind::CryptographicFailure {
            return Self::cryptographic_failure();
        }
        Self {
            kind,
            source: Some(source.into()),
        }
    }

    /// Create a new [`JoseError`] with the given kind and a display message as source.
    pub fn message(kind: ErrorKind, msg: impl Display + Debug + Send + Sync + 'static) -> Self {
        Self::new(kind, OpaqueError::from_display(msg))
    }

    /// Create a [`ErrorKind::MalformedToken`] error.
    pub fn malformed_token(msg: impl Display + Debug + Send + Sync + 'static) -> Self {
        Self::message(ErrorKind::MalformedToken, msg)
    }

    /// Create a [`ErrorKind::UnsupportedAlgorithm`] error.
    pub fn unsupported_algorithm(msg: impl Display + Debug + Send + Sync + 'static) -> Self {
        Self::message(ErrorKind::UnsupportedAlgorithm, msg)
    }

    /// Create a [`ErrorKind::KeyResolution`] error.
    pub fn key_resolution(msg: impl Display + Debug + Send + Sync + 'static) -> Self {
        Self::message(ErrorKind::KeyResolution, msg)
    }

    /// Create a [`ErrorKind::Encoding`] error.
    pub fn encoding(msg: impl Display + Debug + Send + Sync + 'static) -> Self {
        Self::message(ErrorKind::Encoding, msg)
    }

    /// Create a [`ErrorKind::InvalidClaims`] error.
    pub fn invalid_claims(msg: impl Display + Debug + Send + Sync + 'static) -> Self {
        Self::message(ErrorKind::InvalidClaims, msg)
    }

    /// Create the one and only [`ErrorKind::CryptographicFailure`] error.
    pub fn cryptographic_failure() -> Self {
        Self {
            kind: ErrorKind::CryptographicFailure,
            source: None,
        }
    }

    /// Create the [`ErrorKind::CryptographicFailure`] error for a failing
    /// primitive. The given error is dropped.
    pub fn cryptographic_failure_from(source: impl Into<BoxError>) -> Self {
        Self::new(ErrorKind::CryptographicFailure, source)
    }

    /// Get the kind of error that occurred.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns true if this error is the opaque verification/decryption failure.
    pub fn is_cryptographic_failure(&self) -> bool {
        self.kind == ErrorKind::CryptographicFailure
    }
}

impl Debug for JoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoseError")
            .field("kind", &self.kind)
            .field("source", &self.source)
            .finish()
    }
}

impl Display for JoseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "jose error ({}): {source}", self.kind),
            None => write!(f, "jose error ({})", self.kind),
        }
    }
}

impl std::error::Error for JoseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|source| source as &(dyn std::error::Error + 'static))
    }
}
