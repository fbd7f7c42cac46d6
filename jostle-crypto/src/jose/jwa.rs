use std::{fmt, str::FromStr};

use aws_lc_rs::signature::EcdsaSigningAlgorithm;
use serde::{Deserialize, Serialize};

use crate::JoseError;
use crate::jose::JWKEllipticCurves;

macro_rules! jose_identifier {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident => $value:literal,
            )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            /// All variants, in registration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// The identifier as it appears in a JOSE header.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $value,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = JoseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok(Self::$variant),)+
                    other => Err(JoseError::unsupported_algorithm(format!(
                        concat!("unknown ", stringify!($name), " identifier '{}'"),
                        other
                    ))),
                }
            }
        }
    };
}

jose_identifier! {
    /// [`JWA`] or JSON Web Algorithms for digital signatures and MACs,
    /// as defined in [`rfc7518, section 3`]
    ///
    /// Some algorithms are required to be implemented when supporting
    /// JWA, while others are recommended or optional.
    ///
    /// [`rfc7518, section 3`]: https://datatracker.ietf.org/doc/html/rfc7518#section-3
    pub enum JWA {
        /// HMAC using SHA-256 (Required)
        HS256 => "HS256",
        /// HMAC using SHA-384 (Optional)
        HS384 => "HS384",
        /// HMAC using SHA-512 (Optional)
        HS512 => "HS512",
        /// RSASSA-PKCS1-v1_5 using SHA-256 (Recommended)
        RS256 => "RS256",
        /// RSASSA-PKCS1-v1_5 using SHA-384 (Optional)
        RS384 => "RS384",
        /// RSASSA-PKCS1-v1_5 using SHA-512 (Optional)
        RS512 => "RS512",
        /// ECDSA using P-256 and SHA-256 (Recommended+)
        ES256 => "ES256",
        /// ECDSA using P-384 and SHA-384 (Optional)
        ES384 => "ES384",
        /// ECDSA using P-521 and SHA-512 (Optional)
        ES512 => "ES512",
        /// RSASSA-PSS using SHA-256 and MGF1 with SHA-256 (Optional)
        PS256 => "PS256",
        /// RSASSA-PSS using SHA-384 and MGF1 with SHA-384 (Optional)
        PS384 => "PS384",
        /// RSASSA-PSS using SHA-512 and MGF1 with SHA-512 (Optional)
        PS512 => "PS512",
        /// No digital signature or MAC performed (Optional)
        None => "none",
    }
}

jose_identifier! {
    /// Key management algorithms (the JWE `alg` header parameter),
    /// as defined in [`rfc7518, section 4`]
    ///
    /// [`rfc7518, section 4`]: https://datatracker.ietf.org/doc/html/rfc7518#section-4
    pub enum JWEAlgorithm {
        /// RSAES-PKCS1-v1_5 (Recommended-)
        Rsa1_5 => "RSA1_5",
        /// RSAES OAEP using default parameters (Recommended+)
        RsaOaep => "RSA-OAEP",
        /// RSAES OAEP using SHA-256 and MGF1 with SHA-256 (Optional)
        RsaOaep256 => "RSA-OAEP-256",
        /// AES Key Wrap with default initial value using 128-bit key (Recommended)
        A128KW => "A128KW",
        /// AES Key Wrap with default initial value using 256-bit key (Recommended)
        A256KW => "A256KW",
        /// Direct use of a shared symmetric key as the CEK (Recommended)
        Dir => "dir",
    }
}

jose_identifier! {
    /// Content encryption algorithms (the JWE `enc` header parameter),
    /// as defined in [`rfc7518, section 5`]
    ///
    /// [`rfc7518, section 5`]: https://datatracker.ietf.org/doc/html/rfc7518#section-5
    pub enum JWEEncryption {
        /// AES_128_CBC_HMAC_SHA_256 authenticated encryption (Required)
        A128CbcHs256 => "A128CBC-HS256",
        /// AES_256_CBC_HMAC_SHA_512 authenticated encryption (Required)
        A256CbcHs512 => "A256CBC-HS512",
        /// AES GCM using 128-bit key (Recommended)
        A128Gcm => "A128GCM",
        /// AES GCM using 256-bit key (Recommended)
        A256Gcm => "A256GCM",
    }
}

jose_identifier! {
    /// Compression algorithms (the JWE `zip` header parameter),
    /// as defined in [`rfc7516, section 4.1.3`]
    ///
    /// [`rfc7516, section 4.1.3`]: https://datatracker.ietf.org/doc/html/rfc7516#section-4.1.3
    pub enum JWECompression {
        /// DEFLATE as defined in RFC 1951
        Deflate => "DEF",
    }
}

impl From<JWKEllipticCurves> for JWA {
    fn from(value: JWKEllipticCurves) -> Self {
        match value {
            JWKEllipticCurves::P256 => Self::ES256,
            JWKEllipticCurves::P384 => Self::ES384,
            JWKEllipticCurves::P521 => Self::ES512,
        }
    }
}

impl TryFrom<JWA> for JWKEllipticCurves {
    type Error = JoseError;

    fn try_from(value: JWA) -> Result<Self, Self::Error> {
        match value {
            JWA::ES256 => Ok(Self::P256),
            JWA::ES384 => Ok(Self::P384),
            JWA::ES512 => Ok(Self::P521),
            JWA::HS256 | JWA::HS384 | JWA::HS512 => Err(JoseError::key_resolution(
                "Hmac cannot be converted to elliptic curve",
            )),
            JWA::RS256 | JWA::RS384 | JWA::RS512 | JWA::PS256 | JWA::PS384 | JWA::PS512 => Err(
                JoseError::key_resolution("RSA cannot be converted to elliptic curve"),
            ),
            JWA::None => Err(JoseError::key_resolution(
                "none cannot be converted to elliptic curve",
            )),
        }
    }
}

impl TryFrom<JWA> for &'static EcdsaSigningAlgorithm {
    type Error = JoseError;

    fn try_from(value: JWA) -> Result<Self, Self::Error> {
        let curve = JWKEllipticCurves::try_from(value)?;
        Ok(curve.signing_algorithm())
    }
}

impl JWEEncryption {
    /// Size in bytes of the content encryption key.
    pub fn key_len(&self) -> usize {
        match self {
            Self::A128CbcHs256 | Self::A256Gcm => 32,
            Self::A256CbcHs512 => 64,
            Self::A128Gcm => 16,
        }
    }
}
