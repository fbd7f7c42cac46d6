use std::fmt;

use jostle_crypto::jose::{JWA, JWK};
use serde_json::{Map, Value};

use crate::{ErrorKind, JoseError, Result, compact, json};

/// Header parameter names registered by rfc7515, rfc7516 and rfc7518.
///
/// These can never be listed in `crit`.
const REGISTERED_NAMES: &[&str] = &[
    "alg", "enc", "zip", "jku", "jwk", "kid", "x5u", "x5c", "x5t", "x5t#S256", "typ", "cty",
    "crit", "epk", "apu", "apv", "iv", "tag", "p2s", "p2c",
];

const STRING_PARAMS: &[&str] = &["alg", "enc", "zip", "jku", "kid", "x5u", "typ", "cty"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The kind of token a [`Header`] describes.
pub enum HeaderKind {
    /// No `enc`, and `alg` is absent or `none`.
    Plain,
    /// No `enc`, and an `alg` other than `none`.
    Signed,
    /// An `enc` is present.
    Encrypted,
}

impl fmt::Display for HeaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Signed => write!(f, "signed"),
            Self::Encrypted => write!(f, "encrypted"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
/// JOSE header of a compact token: an ordered map of parameter name to value.
///
/// The registered parameters have typed accessors. Any other parameter
/// can be read and written through [`Header::get`] and [`Header::with_param`].
pub struct Header {
    params: Map<String, Value>,
}

impl Header {
    /// Create an empty [`Header`], describing a plain token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the header of a plain token: `{"alg":"none"}`.
    pub fn plain() -> Self {
        Self::new().with_alg(JWA::None.as_str().to_owned())
    }

    /// Create the header of a signed token using `alg`.
    pub fn signed(alg: impl Into<String>) -> Self {
        Self::new().with_alg(alg.into())
    }

    /// Create the header of an encrypted token using
    /// key management algorithm `alg` and content encryption `enc`.
    pub fn encrypted(alg: impl Into<String>, enc: impl Into<String>) -> Self {
        Self::new().with_alg(alg.into()).with_enc(enc.into())
    }

    /// Parse a header from its decoded JSON bytes.
    ///
    /// Duplicate keys and registered parameters of the wrong JSON type
    /// fail with [`ErrorKind::MalformedToken`].
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Self::from_map(json::parse_object(bytes)?)
    }

    /// Create a header from an existing JSON object,
    /// checking the types of the registered parameters.
    pub fn from_map(params: Map<String, Value>) -> Result<Self> {
        for name in STRING_PARAMS {
            if params.get(*name).is_some_and(|value| !value.is_string()) {
                return Err(JoseError::malformed_token(format!(
                    "header parameter '{name}' must be a string"
                )));
            }
        }
        if params.get("jwk").is_some_and(|value| !value.is_object()) {
            return Err(JoseError::malformed_token(
                "header parameter 'jwk' must be an object",
            ));
        }
        if let Some(x5c) = params.get("x5c")
            && string_array(x5c).is_none()
        {
            return Err(JoseError::malformed_token(
                "header parameter 'x5c' must be an array of strings",
            ));
        }
        Ok(Self { params })
    }

    /// The kind of token this header describes.
    pub fn kind(&self) -> HeaderKind {
        if self.enc().is_some() {
            HeaderKind::Encrypted
        } else if self.alg().is_some_and(|alg| alg != JWA::None.as_str()) {
            HeaderKind::Signed
        } else {
            HeaderKind::Plain
        }
    }

    /// The signing or key management algorithm.
    pub fn alg(&self) -> Option<&str> {
        self.str_param("alg")
    }

    /// The content encryption algorithm of an encrypted token.
    pub fn enc(&self) -> Option<&str> {
        self.str_param("enc")
    }

    /// The compression algorithm applied before encryption.
    pub fn zip(&self) -> Option<&str> {
        self.str_param("zip")
    }

    /// The media type of the complete token, e.g. `JWT`.
    pub fn typ(&self) -> Option<&str> {
        self.str_param("typ")
    }

    /// The media type of the payload, `JWT` for nested tokens.
    pub fn cty(&self) -> Option<&str> {
        self.str_param("cty")
    }

    /// Returns true if `cty` marks the payload as a nested JWT.
    pub fn is_nested(&self) -> bool {
        self.cty().is_some_and(|cty| cty.eq_ignore_ascii_case("JWT"))
    }

    /// Hint for the key used to secure the token.
    pub fn kid(&self) -> Option<&str> {
        self.str_param("kid")
    }

    /// URL of the key set containing the key used to secure the token.
    pub fn jku(&self) -> Option<&str> {
        self.str_param("jku")
    }

    /// URL of the X.509 certificate (chain) of the key.
    pub fn x5u(&self) -> Option<&str> {
        self.str_param("x5u")
    }

    /// The X.509 certificate chain of the key, as base64 DER values.
    pub fn x5c(&self) -> Option<Vec<&str>> {
        self.params.get("x5c").and_then(string_array)
    }

    /// The public key used to secure the token, embedded as a [`JWK`].
    pub fn jwk(&self) -> Result<Option<JWK>> {
        self.params
            .get("jwk")
            .map(|value| {
                serde_json::from_value::<JWK>(value.clone())
                    .map_err(|err| JoseError::new(ErrorKind::MalformedToken, err))
            })
            .transpose()
    }

    /// Header parameters the recipient must understand.
    pub fn crit(&self) -> Option<Vec<&str>> {
        self.params.get("crit").and_then(string_array)
    }

    /// Get any header parameter.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// All header parameters, in order.
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    fn str_param(&self, name: &str) -> Option<&str> {
        self.params.get(name).and_then(Value::as_str)
    }

    fn set_str_param(&mut self, name: &str, value: Option<String>) {
        match value {
            Some(value) => {
                self.params.insert(name.to_owned(), Value::String(value));
            }
            None => {
                self.params.shift_remove(name);
            }
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the `alg` header parameter.
        pub fn alg(mut self, alg: Option<String>) -> Self {
            self.set_str_param("alg", alg);
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the `enc` header parameter.
        pub fn enc(mut self, enc: Option<String>) -> Self {
            self.set_str_param("enc", enc);
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the `zip` header parameter.
        pub fn zip(mut self, zip: Option<String>) -> Self {
            self.set_str_param("zip", zip);
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the `typ` header parameter.
        pub fn typ(mut self, typ: Option<String>) -> Self {
            self.set_str_param("typ", typ);
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the `cty` header parameter.
        pub fn cty(mut self, cty: Option<String>) -> Self {
            self.set_str_param("cty", cty);
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the `kid` header parameter.
        pub fn kid(mut self, kid: Option<String>) -> Self {
            self.set_str_param("kid", kid);
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the `jku` header parameter.
        pub fn jku(mut self, jku: Option<String>) -> Self {
            self.set_str_param("jku", jku);
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the `x5u` header parameter.
        pub fn x5u(mut self, x5u: Option<String>) -> Self {
            self.set_str_param("x5u", x5u);
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the `x5c` header parameter.
        pub fn x5c(mut self, x5c: Vec<String>) -> Self {
            self.params.insert(
                "x5c".to_owned(),
                Value::Array(x5c.into_iter().map(Value::String).collect()),
            );
            self
        }
    }

    /// Embed the public part of `jwk` as the `jwk` header parameter.
    pub fn with_jwk(mut self, jwk: &JWK) -> Result<Self> {
        self.set_jwk(jwk)?;
        Ok(self)
    }

    /// Embed the public part of `jwk` as the `jwk` header parameter.
    pub fn set_jwk(&mut self, jwk: &JWK) -> Result<&mut Self> {
        let value = serde_json::to_value(jwk.to_public())
            .map_err(|err| JoseError::new(ErrorKind::Encoding, err))?;
        self.params.insert("jwk".to_owned(), value);
        Ok(self)
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the `crit` header parameter.
        ///
        /// Every name listed must also be set as a parameter.
        pub fn crit(mut self, crit: Vec<String>) -> Self {
            self.params.insert(
                "crit".to_owned(),
                Value::Array(crit.into_iter().map(Value::String).collect()),
            );
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set any header parameter, replacing an existing value.
        pub fn param(mut self, name: String, value: Value) -> Self {
            self.params.insert(name, value);
            self
        }
    }

    /// Serialize the header as JSON and encode it as base64url.
    pub fn encode(&self) -> Result<String> {
        let bytes = serde_json::to_vec(&self.params)
            .map_err(|err| JoseError::new(ErrorKind::Encoding, err))?;
        Ok(compact::encode(bytes))
    }

    /// Check the `crit` header parameter.
    ///
    /// When present it must be a non-empty array of names, each
    /// set in this header, not registered by the JOSE specifications,
    /// and listed in `understood`.
    pub fn validate_critical(&self, understood: &[String]) -> Result<()> {
        let Some(crit) = self.params.get("crit") else {
            return Ok(());
        };
        let names = string_array(crit)
            .filter(|names| !names.is_empty())
            .ok_or_else(|| {
                JoseError::malformed_token("header parameter 'crit' must be a non-empty array of strings")
            })?;

        for name in names {
            if REGISTERED_NAMES.contains(&name) {
                return Err(JoseError::malformed_token(format!(
                    "registered header parameter '{name}' cannot be critical"
                )));
            }
            if !self.params.contains_key(name) {
                return Err(JoseError::malformed_token(format!(
                    "critical header parameter '{name}' is missing"
                )));
            }
            if !understood.iter().any(|known| known == name) {
                return Err(JoseError::malformed_token(format!(
                    "critical header parameter '{name}' is not understood"
                )));
            }
        }
        Ok(())
    }
}

fn string_array(value: &Value) -> Option<Vec<&str>> {
    value.as_array()?.iter().map(Value::as_str).collect()
}
