use std::fmt;

use aws_lc_rs::{
    digest::{Digest, SHA256, digest},
    signature::{
        ECDSA_P256_SHA256_ASN1, ECDSA_P256_SHA256_ASN1_SIGNING, ECDSA_P384_SHA384_ASN1,
        ECDSA_P384_SHA384_ASN1_SIGNING, ECDSA_P521_SHA512_ASN1, ECDSA_P521_SHA512_ASN1_SIGNING,
        EcdsaSigningAlgorithm, EcdsaVerificationAlgorithm,
    },
};
use base64::{Engine as _, prelude::BASE64_URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize, Serializer, ser::SerializeStruct};
use zeroize::Zeroizing;

use crate::{
    ErrorKind, JoseError, Result,
    der::RsaPrivateKeyComponents,
    jose::{EcPrivateKey, EcPublicKey, Key, RsaPrivateKey, RsaPublicKey, SymmetricKey},
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
/// [`JWK`] or JSON Web Key as defined in [`rfc7517`]
///
/// [`rfc7517`]: https://datatracker.ietf.org/doc/html/rfc7517
pub struct JWK {
    /// Key identifier, used to select a key from a [`JWKSet`](super::JWKSet)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kid: Option<String>,
    /// Intended algorithm to be used with this key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    alg: Option<String>,
    #[serde(flatten)]
    key_type: JWKType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    r#use: Option<JWKUse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key_ops: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x5c: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x5t: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "x5t#S256")]
    x5t_sha256: Option<String>,
}

#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "kty")]
/// The "kty" (key type) parameter identifies the cryptographic algorithm family used with the key, such as "RSA", "EC", or "oct"
///
/// All members are base64url encoded big-endian integers or octet sequences.
/// Private members are only present for private keys.
pub enum JWKType {
    /// RSA key: modulus and exponent, plus the private exponent and CRT members for private keys.
    RSA {
        n: String,
        e: String,
        #[serde(default)]
        d: Option<String>,
        #[serde(default)]
        p: Option<String>,
        #[serde(default)]
        q: Option<String>,
        #[serde(default)]
        dp: Option<String>,
        #[serde(default)]
        dq: Option<String>,
        #[serde(default)]
        qi: Option<String>,
    },
    /// Elleptic curve
    EC {
        crv: JWKEllipticCurves,
        x: String,
        y: String,
        #[serde(default)]
        d: Option<String>,
    },
    /// an octet sequence key, which represents a symmetric key
    #[serde(rename = "oct")]
    OCT { k: String },
}

impl fmt::Debug for JWKType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RSA { n, e, d, .. } => f
                .debug_struct("RSA")
                .field("n", n)
                .field("e", e)
                .field("private", &d.is_some())
                .finish(),
            Self::EC { crv, x, y, d } => f
                .debug_struct("EC")
                .field("crv", crv)
                .field("x", x)
                .field("y", y)
                .field("private", &d.is_some())
                .finish(),
            Self::OCT { .. } => f.debug_struct("OCT").finish_non_exhaustive(),
        }
    }
}

impl Serialize for JWKType {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Required members are written in lexicographic order, this output is used
        // as is to compute the jwk thumbprint. Private members follow.
        match &self {
            Self::EC { crv, x, y, d } => {
                let mut state = serializer.serialize_struct("JWKType", 5)?;
                state.serialize_field("crv", crv)?;
                state.serialize_field("kty", "EC")?;
                state.serialize_field("x", x)?;
                state.serialize_field("y", y)?;
                if let Some(d) = d {
                    state.serialize_field("d", d)?;
                } else {
                    state.skip_field("d")?;
                }
                state.end()
            }
            Self::RSA {
                n,
                e,
                d,
                p,
                q,
                dp,
                dq,
                qi,
            } => {
                let mut state = serializer.serialize_struct("JWKType", 9)?;
                state.serialize_field("e", e)?;
                state.serialize_field("kty", "RSA")?;
                state.serialize_field("n", n)?;
                for (name, value) in [
                    ("d", d),
                    ("p", p),
                    ("q", q),
                    ("dp", dp),
                    ("dq", dq),
                    ("qi", qi),
                ] {
                    if let Some(value) = value {
                        state.serialize_field(name, value)?;
                    } else {
                        state.skip_field(name)?;
                    }
                }
                state.end()
            }
            Self::OCT { k } => {
                let mut state = serializer.serialize_struct("JWKType", 2)?;
                state.serialize_field("k", k)?;
                state.serialize_field("kty", "oct")?;
                state.end()
            }
        }
    }
}

impl JWKType {
    /// Return a copy of this key type with all private members removed.
    ///
    /// `oct` keys have no public part and are returned as is.
    #[must_use]
    pub fn to_public(&self) -> Self {
        match self {
            Self::RSA { n, e, .. } => Self::RSA {
                n: n.clone(),
                e: e.clone(),
                d: None,
                p: None,
                q: None,
                dp: None,
                dq: None,
                qi: None,
            },
            Self::EC { crv, x, y, .. } => Self::EC {
                crv: *crv,
                x: x.clone(),
                y: y.clone(),
                d: None,
            },
            Self::OCT { k } => Self::OCT { k: k.clone() },
        }
    }

    /// Serialization used as input of the [`rfc7638`] thumbprint:
    /// only the required public members, in lexicographic order.
    ///
    /// [`rfc7638`]: https://datatracker.ietf.org/doc/html/rfc7638
    fn thumbprint_input(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.to_public())
            .map_err(|err| JoseError::new(ErrorKind::Encoding, err))
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum JWKEllipticCurves {
    #[serde(rename = "P-256")]
    P256,
    #[serde(rename = "P-384")]
    P384,
    #[serde(rename = "P-521")]
    P521,
}

impl JWKEllipticCurves {
    /// All supported curves.
    pub const ALL: &'static [Self] = &[Self::P256, Self::P384, Self::P521];

    /// Name of the curve as used in the `crv` member.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::P256 => "P-256",
            Self::P384 => "P-384",
            Self::P521 => "P-521",
        }
    }

    /// Size in bytes of a single coordinate (and of the private scalar).
    pub fn coordinate_len(&self) -> usize {
        match self {
            Self::P256 => 32,
            Self::P384 => 48,
            Self::P521 => 66,
        }
    }

    /// Size in bytes of a fixed width `r‖s` JWS signature.
    pub fn signature_len(&self) -> usize {
        2 * self.coordinate_len()
    }

    /// Signing algorithm producing ASN.1 DER signatures for this curve.
    pub fn signing_algorithm(&self) -> &'static EcdsaSigningAlgorithm {
        match self {
            Self::P256 => &ECDSA_P256_SHA256_ASN1_SIGNING,
            Self::P384 => &ECDSA_P384_SHA384_ASN1_SIGNING,
            Self::P521 => &ECDSA_P521_SHA512_ASN1_SIGNING,
        }
    }

    /// Verification algorithm accepting ASN.1 DER signatures for this curve.
    pub fn verification_algorithm(&self) -> &'static EcdsaVerificationAlgorithm {
        match self {
            Self::P256 => &ECDSA_P256_SHA256_ASN1,
            Self::P384 => &ECDSA_P384_SHA384_ASN1,
            Self::P521 => &ECDSA_P521_SHA512_ASN1,
        }
    }
}

impl fmt::Display for JWKEllipticCurves {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
/// [`JWKUse`] identifies the intended use of the public key
pub enum JWKUse {
    #[serde(rename = "sig")]
    Signature,
    #[serde(rename = "enc")]
    Encryption,
}

impl JWK {
    /// Create a new [`JWK`] for the given key type, without any optional members.
    pub fn new(key_type: JWKType) -> Self {
        Self {
            kid: None,
            alg: None,
            key_type,
            r#use: None,
            key_ops: None,
            x5c: None,
            x5t: None,
            x5t_sha256: None,
        }
    }

    /// Parse a single [`JWK`] from its JSON representation.
    pub fn parse(json: &[u8]) -> Result<Self> {
        serde_json::from_slice(json).map_err(|err| JoseError::new(ErrorKind::KeyResolution, err))
    }

    /// Create a [`JWK`] for the given native key.
    pub fn from_key(key: &Key) -> Self {
        let key_type = match key {
            Key::Symmetric(key) => JWKType::OCT {
                k: encode(key.as_bytes()),
            },
            Key::RsaPublic(key) => rsa_public_key_type(key),
            Key::RsaPrivate(key) => match key.components() {
                Ok(components) => JWKType::RSA {
                    n: encode(&components.n),
                    e: encode(&components.e),
                    d: Some(encode(&components.d)),
                    p: Some(encode(&components.p)),
                    q: Some(encode(&components.q)),
                    dp: Some(encode(&components.dp)),
                    dq: Some(encode(&components.dq)),
                    qi: Some(encode(&components.qi)),
                },
                // pkcs8 was produced by our own encoder, treat failure as public only
                Err(err) => {
                    tracing::warn!("failed to export RSA private components: {err}");
                    rsa_public_key_type(key.public_key())
                }
            },
            Key::EcPublic(key) => ec_key_type(key, None),
            Key::EcPrivate(key) => ec_key_type(key.public_key(), Some(encode(key.d()))),
        };
        Self::new(key_type)
    }

    /// Generate a new random `oct` [`JWK`] of `len` bytes.
    pub fn generate_oct(len: usize) -> Result<Self> {
        Ok(Self::from_key(&Key::Symmetric(SymmetricKey::generate(len)?)))
    }

    /// Generate a new private EC [`JWK`] on the given curve,
    /// intended for signing with the matching `ES*` algorithm.
    pub fn generate_ec(curve: JWKEllipticCurves) -> Result<Self> {
        let key = EcPrivateKey::generate(curve)?;
        Ok(Self::from_key(&Key::EcPrivate(key))
            .with_alg(crate::jose::JWA::from(curve).as_str())
            .with_key_use(JWKUse::Signature))
    }

    /// Generate a new private RSA [`JWK`] with a modulus of `bits` bits.
    pub fn generate_rsa(bits: usize) -> Result<Self> {
        Ok(Self::from_key(&Key::RsaPrivate(RsaPrivateKey::generate(
            bits,
        )?)))
    }

    /// Create a private RSA [`JWK`] from an unencrypted PKCS#8 DER document.
    pub fn rsa_from_pkcs8_der(der: &[u8]) -> Result<Self> {
        Ok(Self::from_key(&Key::RsaPrivate(
            RsaPrivateKey::from_pkcs8_der(der)?,
        )))
    }

    /// Create a private EC [`JWK`] from an unencrypted PKCS#8 DER document.
    pub fn ec_from_pkcs8_der(curve: JWKEllipticCurves, der: &[u8]) -> Result<Self> {
        Ok(Self::from_key(&Key::EcPrivate(
            EcPrivateKey::from_pkcs8_der(curve, der)?,
        )))
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the key identifier
        pub fn kid(mut self, kid: impl Into<String>) -> Self {
            self.kid = Some(kid.into());
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the intended algorithm
        pub fn alg(mut self, alg: impl Into<String>) -> Self {
            self.alg = Some(alg.into());
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the intended use of this key
        pub fn key_use(mut self, key_use: JWKUse) -> Self {
            self.r#use = Some(key_use);
            self
        }
    }

    /// Key identifier, if any.
    pub fn kid(&self) -> Option<&str> {
        self.kid.as_deref()
    }

    /// Intended algorithm, if any.
    pub fn alg(&self) -> Option<&str> {
        self.alg.as_deref()
    }

    /// Intended use, if any.
    pub fn key_use(&self) -> Option<JWKUse> {
        self.r#use
    }

    /// Permitted operations, if restricted.
    pub fn key_ops(&self) -> Option<&[String]> {
        self.key_ops.as_deref()
    }

    /// The key type and its members.
    pub fn key_type(&self) -> &JWKType {
        &self.key_type
    }

    /// Returns true if this key carries private members (or is an `oct` key).
    pub fn is_private(&self) -> bool {
        match &self.key_type {
            JWKType::RSA { d, .. } | JWKType::EC { d, .. } => d.is_some(),
            JWKType::OCT { .. } => true,
        }
    }

    /// Returns true if this key may be used for the given use.
    ///
    /// Keys without a `use` member may be used for anything.
    pub fn is_usable_for(&self, key_use: JWKUse) -> bool {
        self.r#use.is_none_or(|u| u == key_use)
    }

    /// Return a copy of this [`JWK`] with all private members removed.
    #[must_use]
    pub fn to_public(&self) -> Self {
        Self {
            key_type: self.key_type.to_public(),
            ..self.clone()
        }
    }

    /// [`JWKThumb`] as defined in [`rfc7638`] is url safe identifier for a [`JWK`]
    ///
    /// [`rfc7638`]: https://datatracker.ietf.org/doc/html/rfc7638
    pub fn thumb_sha256(&self) -> Result<Digest> {
        Ok(digest(&SHA256, &self.key_type.thumbprint_input()?))
    }

    /// Base64url encoded [`rfc7638`] thumbprint, often used as `kid`.
    ///
    /// [`rfc7638`]: https://datatracker.ietf.org/doc/html/rfc7638
    pub fn thumbprint(&self) -> Result<String> {
        Ok(encode(self.thumb_sha256()?.as_ref()))
    }

    /// Resolve this [`JWK`] into native key material.
    ///
    /// RSA and EC keys resolve to private keys when their private members
    /// are present, and to public keys otherwise. Private RSA keys require
    /// all CRT members.
    pub fn resolve(&self) -> Result<Key> {
        match &self.key_type {
            JWKType::OCT { k } => Ok(Key::Symmetric(SymmetricKey::new(decode("k", k)?)?)),
            JWKType::EC { crv, x, y, d } => {
                let public = EcPublicKey::new(*crv, &decode("x", x)?, &decode("y", y)?)?;
                match d {
                    None => Ok(Key::EcPublic(public)),
                    Some(d) => {
                        let d = Zeroizing::new(decode("d", d)?);
                        Ok(Key::EcPrivate(EcPrivateKey::new(public, &d)?))
                    }
                }
            }
            JWKType::RSA {
                n,
                e,
                d,
                p,
                q,
                dp,
                dq,
                qi,
            } => {
                let n = decode("n", n)?;
                let e = decode("e", e)?;
                let Some(d) = d else {
                    return Ok(Key::RsaPublic(RsaPublicKey::new(&n, &e)?));
                };

                let member = |name: &'static str, value: &Option<String>| match value {
                    Some(value) => decode(name, value),
                    None => Err(JoseError::key_resolution(format!(
                        "RSA private key is missing member '{name}'"
                    ))),
                };
                let components = RsaPrivateKeyComponents {
                    n,
                    e,
                    d: decode("d", d)?,
                    p: member("p", p)?,
                    q: member("q", q)?,
                    dp: member("dp", dp)?,
                    dq: member("dq", dq)?,
                    qi: member("qi", qi)?,
                };
                Ok(Key::RsaPrivate(RsaPrivateKey::from_components(
                    &components,
                )?))
            }
        }
    }
}

fn rsa_public_key_type(key: &RsaPublicKey) -> JWKType {
    JWKType::RSA {
        n: encode(key.n()),
        e: encode(key.e()),
        d: None,
        p: None,
        q: None,
        dp: None,
        dq: None,
        qi: None,
    }
}

fn ec_key_type(key: &EcPublicKey, d: Option<String>) -> JWKType {
    JWKType::EC {
        crv: key.curve(),
        x: encode(key.x()),
        y: encode(key.y()),
        d,
    }
}

fn encode(bytes: &[u8]) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(bytes)
}

fn decode(member: &'static str, value: &str) -> Result<Vec<u8>> {
    BASE64_URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|err| JoseError::message(ErrorKind::KeyResolution, format!("jwk member '{member}': {err}")))
}
