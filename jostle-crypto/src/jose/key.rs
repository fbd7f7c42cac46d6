use std::{fmt, sync::Arc};

use aws_lc_rs::{
    encoding::AsBigEndian as _,
    rsa::{PrivateDecryptingKey, PublicEncryptingKey},
    signature::{EcdsaKeyPair, KeyPair as _, RsaKeyPair},
};
use jostle_error::{BoxError, ErrorContext as _};
use zeroize::Zeroizing;

use crate::{
    ErrorKind, JoseError, Result,
    der::{
        RsaPrivateKeyComponents, decode_pkcs8_rsa_private_key, encode_pkcs8_rsa_private_key,
        encode_rsa_subject_public_key_info,
    },
    jose::JWKEllipticCurves,
};

/// Native key material, resolved from a [`JWK`](super::JWK)
/// or supplied by a [`KeyProvider`].
///
/// Keys are immutable and cheap to clone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Key {
    /// Shared secret, used for HMAC, AES key wrap and direct encryption.
    Symmetric(SymmetricKey),
    /// RSA private key (which includes its public key).
    RsaPrivate(RsaPrivateKey),
    /// RSA public key.
    RsaPublic(RsaPublicKey),
    /// Elliptic curve private key (which includes its public key).
    EcPrivate(EcPrivateKey),
    /// Elliptic curve public key.
    EcPublic(EcPublicKey),
}

impl Key {
    /// Returns true if this key holds secret material.
    pub fn is_private(&self) -> bool {
        matches!(self, Self::Symmetric(_) | Self::RsaPrivate(_) | Self::EcPrivate(_))
    }

    /// Return the public part of this key.
    ///
    /// Symmetric keys have no public part and are returned as-is.
    #[must_use]
    pub fn to_public(&self) -> Self {
        match self {
            Self::RsaPrivate(key) => Self::RsaPublic(key.public_key().clone()),
            Self::EcPrivate(key) => Self::EcPublic(key.public_key().clone()),
            Self::Symmetric(_) | Self::RsaPublic(_) | Self::EcPublic(_) => self.clone(),
        }
    }

    /// Short human readable name of the key type, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Symmetric(_) => "symmetric",
            Self::RsaPrivate(_) => "RSA private",
            Self::RsaPublic(_) => "RSA public",
            Self::EcPrivate(_) => "EC private",
            Self::EcPublic(_) => "EC public",
        }
    }

    /// The error for using this key with an algorithm it does not fit.
    pub(crate) fn mismatch(&self, alg: impl fmt::Display) -> JoseError {
        JoseError::key_resolution(format!(
            "{} key cannot be used with {alg}",
            self.kind_name()
        ))
    }

    /// The RSA public key of this key, if it is an RSA key.
    pub fn rsa_public_key(&self) -> Option<&RsaPublicKey> {
        match self {
            Self::RsaPrivate(key) => Some(key.public_key()),
            Self::RsaPublic(key) => Some(key),
            Self::Symmetric(_) | Self::EcPrivate(_) | Self::EcPublic(_) => None,
        }
    }

    /// The EC public key of this key, if it is an elliptic curve key.
    pub fn ec_public_key(&self) -> Option<&EcPublicKey> {
        match self {
            Self::EcPrivate(key) => Some(key.public_key()),
            Self::EcPublic(key) => Some(key),
            Self::Symmetric(_) | Self::RsaPrivate(_) | Self::RsaPublic(_) => None,
        }
    }
}

impl From<SymmetricKey> for Key {
    fn from(value: SymmetricKey) -> Self {
        Self::Symmetric(value)
    }
}

impl From<RsaPrivateKey> for Key {
    fn from(value: RsaPrivateKey) -> Self {
        Self::RsaPrivate(value)
    }
}

impl From<RsaPublicKey> for Key {
    fn from(value: RsaPublicKey) -> Self {
        Self::RsaPublic(value)
    }
}

impl From<EcPrivateKey> for Key {
    fn from(value: EcPrivateKey) -> Self {
        Self::EcPrivate(value)
    }
}

impl From<EcPublicKey> for Key {
    fn from(value: EcPublicKey) -> Self {
        Self::EcPublic(value)
    }
}

/// Capability to look up locally stored key material by alias,
/// e.g. backed by a keystore.
pub trait KeyProvider: Send + Sync {
    /// Look up the key stored under the given alias.
    fn lookup(&self, alias: &str) -> std::result::Result<Key, BoxError>;
}

#[derive(Clone, PartialEq, Eq)]
/// Shared secret key bytes, zeroed on drop.
pub struct SymmetricKey(Arc<Zeroizing<Vec<u8>>>);

impl SymmetricKey {
    /// Create a new [`SymmetricKey`] from the given bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = Zeroizing::new(bytes.into());
        if bytes.is_empty() {
            return Err(JoseError::key_resolution("empty symmetric key"));
        }
        Ok(Self(Arc::new(bytes)))
    }

    /// Generate a new random [`SymmetricKey`] of `len` bytes.
    pub fn generate(len: usize) -> Result<Self> {
        let mut bytes = Zeroizing::new(vec![0u8; len]);
        aws_lc_rs::rand::fill(&mut bytes)
            .context("failed to generate symmetric key")
            .map_err(|err| JoseError::new(ErrorKind::KeyResolution, err))?;
        Self::new(bytes.to_vec())
    }

    /// The raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Size of the key in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false, empty keys are rejected on construction.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// RSA public key, stored as its unsigned big-endian modulus and exponent.
pub struct RsaPublicKey {
    n: Vec<u8>,
    e: Vec<u8>,
}

impl RsaPublicKey {
    /// Create a new [`RsaPublicKey`] from the big-endian modulus `n` and exponent `e`.
    ///
    /// Leading zero bytes are stripped.
    pub fn new(n: &[u8], e: &[u8]) -> Result<Self> {
        let n = strip_leading_zeros(n);
        let e = strip_leading_zeros(e);
        if n.is_empty() || e.is_empty() {
            return Err(JoseError::key_resolution(
                "RSA modulus and exponent must not be zero",
            ));
        }
        Ok(Self {
            n: n.to_vec(),
            e: e.to_vec(),
        })
    }

    /// The modulus, without leading zeros.
    pub fn n(&self) -> &[u8] {
        &self.n
    }

    /// The public exponent, without leading zeros.
    pub fn e(&self) -> &[u8] {
        &self.e
    }

    /// Size of the modulus in bytes.
    pub fn modulus_len(&self) -> usize {
        self.n.len()
    }

    /// DER encoded `SubjectPublicKeyInfo` of this key.
    pub fn subject_public_key_info(&self) -> Vec<u8> {
        encode_rsa_subject_public_key_info(&self.n, &self.e)
    }

    pub(crate) fn encrypting_key(&self) -> Result<PublicEncryptingKey> {
        PublicEncryptingKey::from_der(&self.subject_public_key_info())
            .map_err(|err| JoseError::message(ErrorKind::KeyResolution, err.to_string()))
    }
}

#[derive(Clone)]
/// RSA private key, kept as an unencrypted PKCS#8 document.
pub struct RsaPrivateKey {
    public: RsaPublicKey,
    pkcs8: Arc<Zeroizing<Vec<u8>>>,
}

impl RsaPrivateKey {
    /// Create a new [`RsaPrivateKey`] from its CRT components.
    ///
    /// The components are validated by the crypto backend.
    pub fn from_components(components: &RsaPrivateKeyComponents) -> Result<Self> {
        let public = RsaPublicKey::new(&components.n, &components.e)?;
        let pkcs8 = encode_pkcs8_rsa_private_key(components);
        Self::validate(&pkcs8)?;
        Ok(Self {
            public,
            pkcs8: Arc::new(pkcs8),
        })
    }

    /// Create a new [`RsaPrivateKey`] from an unencrypted PKCS#8 DER document.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        Self::validate(der)?;
        let components = decode_pkcs8_rsa_private_key(der)?;
        Self::from_components(&components)
    }

    /// Generate a new [`RsaPrivateKey`] with a modulus of `bits` bits.
    ///
    /// Supported sizes are 2048, 3072, 4096 and 8192 bits.
    pub fn generate(bits: usize) -> Result<Self> {
        use aws_lc_rs::{encoding::AsDer as _, rsa::KeySize};

        let size = match bits {
            2048 => KeySize::Rsa2048,
            3072 => KeySize::Rsa3072,
            4096 => KeySize::Rsa4096,
            8192 => KeySize::Rsa8192,
            other => {
                return Err(JoseError::key_resolution(format!(
                    "unsupported RSA key size of {other} bits"
                )));
            }
        };
        let key_pair = RsaKeyPair::generate(size)
            .context("failed to generate RSA key")
            .map_err(|err| JoseError::new(ErrorKind::KeyResolution, err))?;
        let pkcs8 = key_pair
            .as_der()
            .context("failed to export RSA key")
            .map_err(|err| JoseError::new(ErrorKind::KeyResolution, err))?;
        Self::from_pkcs8_der(pkcs8.as_ref())
    }

    fn validate(pkcs8: &[u8]) -> Result<()> {
        RsaKeyPair::from_pkcs8(pkcs8)
            .map(drop)
            .map_err(|err| JoseError::message(ErrorKind::KeyResolution, err.to_string()))
    }

    /// The public part of this key.
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    /// Decode the CRT components of this key.
    pub fn components(&self) -> Result<RsaPrivateKeyComponents> {
        decode_pkcs8_rsa_private_key(&self.pkcs8)
    }

    /// The unencrypted PKCS#8 DER document of this key.
    pub fn pkcs8_der(&self) -> &[u8] {
        &self.pkcs8
    }

    pub(crate) fn key_pair(&self) -> Result<RsaKeyPair> {
        RsaKeyPair::from_pkcs8(&self.pkcs8)
            .map_err(|err| JoseError::message(ErrorKind::KeyResolution, err.to_string()))
    }

    pub(crate) fn decrypting_key(&self) -> Result<PrivateDecryptingKey> {
        PrivateDecryptingKey::from_pkcs8(&self.pkcs8)
            .map_err(|err| JoseError::message(ErrorKind::KeyResolution, err.to_string()))
    }
}

impl PartialEq for RsaPrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.public == other.public
            && aws_lc_rs::constant_time::verify_slices_are_equal(&self.pkcs8, &other.pkcs8).is_ok()
    }
}

impl Eq for RsaPrivateKey {}

impl fmt::Debug for RsaPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaPrivateKey")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Elliptic curve public key, stored as an uncompressed SEC1 point (`0x04‖x‖y`).
pub struct EcPublicKey {
    curve: JWKEllipticCurves,
    point: Vec<u8>,
}

impl EcPublicKey {
    /// Create a new [`EcPublicKey`] from its big-endian affine coordinates.
    pub fn new(curve: JWKEllipticCurves, x: &[u8], y: &[u8]) -> Result<Self> {
        let len = curve.coordinate_len();
        if x.len() != len || y.len() != len {
            return Err(JoseError::key_resolution(format!(
                "{curve} coordinates must be {len} bytes"
            )));
        }

        let mut point = Vec::with_capacity(1 + 2 * len);
        point.push(0x04);
        point.extend_from_slice(x);
        point.extend_from_slice(y);
        Ok(Self { curve, point })
    }

    /// Create a new [`EcPublicKey`] from an uncompressed SEC1 point.
    pub fn from_uncompressed_point(curve: JWKEllipticCurves, point: &[u8]) -> Result<Self> {
        match point {
            [0x04, coordinates @ ..] if coordinates.len() == 2 * curve.coordinate_len() => {
                let (x, y) = coordinates.split_at(curve.coordinate_len());
                Self::new(curve, x, y)
            }
            _ => Err(JoseError::key_resolution(format!(
                "invalid uncompressed {curve} point"
            ))),
        }
    }

    /// The curve of this key.
    pub fn curve(&self) -> JWKEllipticCurves {
        self.curve
    }

    /// The x coordinate.
    pub fn x(&self) -> &[u8] {
        &self.point[1..1 + self.curve.coordinate_len()]
    }

    /// The y coordinate.
    pub fn y(&self) -> &[u8] {
        &self.point[1 + self.curve.coordinate_len()..]
    }

    /// The uncompressed SEC1 point.
    pub fn uncompressed_point(&self) -> &[u8] {
        &self.point
    }
}

#[derive(Clone)]
/// Elliptic curve private key.
pub struct EcPrivateKey {
    public: EcPublicKey,
    d: Arc<Zeroizing<Vec<u8>>>,
}

impl EcPrivateKey {
    /// Create a new [`EcPrivateKey`] from its public key and big-endian private scalar `d`.
    ///
    /// The backend checks that `d` matches the public key.
    pub fn new(public: EcPublicKey, d: &[u8]) -> Result<Self> {
        if d.len() != public.curve.coordinate_len() {
            return Err(JoseError::key_resolution(format!(
                "{} private scalar must be {} bytes",
                public.curve,
                public.curve.coordinate_len()
            )));
        }
        let key = Self {
            public,
            d: Arc::new(Zeroizing::new(d.to_vec())),
        };
        key.key_pair()?;
        Ok(key)
    }

    /// Create a new [`EcPrivateKey`] from an unencrypted PKCS#8 DER document.
    pub fn from_pkcs8_der(curve: JWKEllipticCurves, der: &[u8]) -> Result<Self> {
        let key_pair = EcdsaKeyPair::from_pkcs8(curve.signing_algorithm(), der)
            .map_err(|err| JoseError::message(ErrorKind::KeyResolution, err.to_string()))?;
        Self::from_key_pair(curve, &key_pair)
    }

    /// Generate a new random [`EcPrivateKey`] on the given curve.
    pub fn generate(curve: JWKEllipticCurves) -> Result<Self> {
        let key_pair = EcdsaKeyPair::generate(curve.signing_algorithm())
            .context("failed to generate EC key")
            .map_err(|err| JoseError::new(ErrorKind::KeyResolution, err))?;
        Self::from_key_pair(curve, &key_pair)
    }

    fn from_key_pair(curve: JWKEllipticCurves, key_pair: &EcdsaKeyPair) -> Result<Self> {
        let public = EcPublicKey::from_uncompressed_point(curve, key_pair.public_key().as_ref())?;
        let d = key_pair
            .private_key()
            .as_be_bytes()
            .context("failed to export EC private scalar")
            .map_err(|err| JoseError::new(ErrorKind::KeyResolution, err))?;
        Self::new(public, d.as_ref())
    }

    /// The public part of this key.
    pub fn public_key(&self) -> &EcPublicKey {
        &self.public
    }

    /// The big-endian private scalar.
    pub fn d(&self) -> &[u8] {
        &self.d
    }

    pub(crate) fn key_pair(&self) -> Result<EcdsaKeyPair> {
        EcdsaKeyPair::from_private_key_and_public_key(
            self.public.curve.signing_algorithm(),
            &self.d,
            &self.public.point,
        )
        .map_err(|err| JoseError::message(ErrorKind::KeyResolution, err.to_string()))
    }
}

impl PartialEq for EcPrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.public == other.public
            && aws_lc_rs::constant_time::verify_slices_are_equal(&self.d, &other.d).is_ok()
    }
}

impl Eq for EcPrivateKey {}

impl fmt::Debug for EcPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcPrivateKey")
            .field("public", &self.public)
            .finish_non_exhaustive()
    }
}

fn strip_leading_zeros(value: &[u8]) -> &[u8] {
    let skip = value.iter().take_while(|byte| **byte == 0).count();
    &value[skip..]
}
