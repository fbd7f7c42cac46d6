use jiff::{SignedDuration, Timestamp};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::{ErrorKind, JoseError, Result, compact, json};

const STRING_CLAIMS: &[&str] = &["iss", "sub", "jti"];
const DATE_CLAIMS: &[&str] = &["exp", "nbf", "iat"];

#[derive(Debug, Clone, Default, PartialEq)]
/// JWT Claims Set as defined in [`rfc7519, section 4`]:
/// an ordered map of claim name to value.
///
/// Dates are seconds since the epoch on the wire and
/// a [`Timestamp`] through the typed accessors.
///
/// [`rfc7519, section 4`]: https://datatracker.ietf.org/doc/html/rfc7519#section-4
pub struct ClaimsSet {
    claims: Map<String, Value>,
}

impl ClaimsSet {
    /// Create an empty [`ClaimsSet`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a claims set from its decoded JSON bytes.
    ///
    /// Duplicate keys and registered claims of the wrong type
    /// fail with [`ErrorKind::MalformedToken`].
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        Self::from_map(json::parse_object(bytes)?)
    }

    /// Create a claims set from an existing JSON object,
    /// checking the types of the registered claims.
    pub fn from_map(claims: Map<String, Value>) -> Result<Self> {
        for name in STRING_CLAIMS {
            if claims.get(*name).is_some_and(|value| !value.is_string()) {
                return Err(JoseError::malformed_token(format!(
                    "claim '{name}' must be a string"
                )));
            }
        }
        for name in DATE_CLAIMS {
            if claims.get(*name).is_some_and(|value| numeric_date(value).is_none()) {
                return Err(JoseError::malformed_token(format!(
                    "claim '{name}' must be a numeric date"
                )));
            }
        }
        if claims.get("aud").is_some_and(|aud| audience(aud).is_none()) {
            return Err(JoseError::malformed_token(
                "claim 'aud' must be a string or an array of strings",
            ));
        }
        Ok(Self { claims })
    }

    /// Serialize the claims as JSON.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.claims).map_err(|err| JoseError::new(ErrorKind::Encoding, err))
    }

    /// Serialize the claims as JSON and encode them as base64url.
    pub fn encode(&self) -> Result<String> {
        self.to_vec().map(compact::encode)
    }

    /// Issuer
    pub fn iss(&self) -> Option<&str> {
        self.claims.get("iss").and_then(Value::as_str)
    }

    /// Subject
    pub fn sub(&self) -> Option<&str> {
        self.claims.get("sub").and_then(Value::as_str)
    }

    /// JWT ID
    pub fn jti(&self) -> Option<&str> {
        self.claims.get("jti").and_then(Value::as_str)
    }

    /// Audience, which is either a single string or an array of strings on the wire.
    pub fn aud(&self) -> Vec<&str> {
        self.claims
            .get("aud")
            .and_then(audience)
            .unwrap_or_default()
    }

    /// Expiration time
    pub fn exp(&self) -> Option<Timestamp> {
        self.claims.get("exp").and_then(numeric_date)
    }

    /// Not before
    pub fn nbf(&self) -> Option<Timestamp> {
        self.claims.get("nbf").and_then(numeric_date)
    }

    /// Issued at
    pub fn iat(&self) -> Option<Timestamp> {
        self.claims.get("iat").and_then(numeric_date)
    }

    /// Get any claim.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }

    /// Deserialize a claim into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        self.claims
            .get(name)
            .map(|value| {
                T::deserialize(value).map_err(|err| JoseError::new(ErrorKind::MalformedToken, err))
            })
            .transpose()
    }

    /// All claims, in order.
    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    fn set_or_remove_claim(&mut self, name: &str, value: Option<Value>) {
        match value {
            Some(value) => {
                self.claims.insert(name.to_owned(), value);
            }
            None => {
                self.claims.shift_remove(name);
            }
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the issuer claim.
        pub fn issuer(mut self, iss: Option<String>) -> Self {
            self.set_or_remove_claim("iss", iss.map(Value::String));
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the subject claim.
        pub fn subject(mut self, sub: Option<String>) -> Self {
            self.set_or_remove_claim("sub", sub.map(Value::String));
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the JWT ID claim.
        pub fn jwt_id(mut self, jti: Option<String>) -> Self {
            self.set_or_remove_claim("jti", jti.map(Value::String));
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the audience claim.
        ///
        /// A single audience is written as a string.
        pub fn audience(mut self, aud: Vec<String>) -> Self {
            let value = match <[String; 1]>::try_from(aud) {
                Ok([single]) => Value::String(single),
                Err(aud) => Value::Array(aud.into_iter().map(Value::String).collect()),
            };
            self.claims.insert("aud".to_owned(), value);
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the expiration time claim, truncated to whole seconds.
        pub fn expiration(mut self, exp: Option<Timestamp>) -> Self {
            self.set_or_remove_claim("exp", exp.map(|ts| Value::from(ts.as_second())));
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the not before claim, truncated to whole seconds.
        pub fn not_before(mut self, nbf: Option<Timestamp>) -> Self {
            self.set_or_remove_claim("nbf", nbf.map(|ts| Value::from(ts.as_second())));
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the issued at claim, truncated to whole seconds.
        pub fn issued_at(mut self, iat: Option<Timestamp>) -> Self {
            self.set_or_remove_claim("iat", iat.map(|ts| Value::from(ts.as_second())));
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set any claim, replacing an existing value.
        ///
        /// Registered claims should be set through their typed setters.
        pub fn claim(mut self, name: String, value: Value) -> Self {
            self.claims.insert(name, value);
            self
        }
    }

    /// Serialize `value` and set it as claim `name`.
    pub fn try_with_claim(mut self, name: impl Into<String>, value: impl Serialize) -> Result<Self> {
        let value =
            serde_json::to_value(value).map_err(|err| JoseError::new(ErrorKind::Encoding, err))?;
        self.claims.insert(name.into(), value);
        Ok(self)
    }

    /// Check the `exp` and `nbf` claims against `now`,
    /// allowing for `leeway` of clock skew.
    ///
    /// A token is expired from the moment `now` reaches `exp`.
    pub fn validate_time(&self, now: Timestamp, leeway: SignedDuration) -> Result<()> {
        let leeway = leeway.abs();
        if let Some(exp) = self.exp()
            && now.duration_since(exp) >= leeway
        {
            return Err(JoseError::invalid_claims(format!("token expired at {exp}")));
        }
        if let Some(nbf) = self.nbf()
            && nbf.duration_since(now) > leeway
        {
            return Err(JoseError::invalid_claims(format!(
                "token not valid before {nbf}"
            )));
        }
        Ok(())
    }
}

fn numeric_date(value: &Value) -> Option<Timestamp> {
    if let Some(seconds) = value.as_i64() {
        return Timestamp::from_second(seconds).ok();
    }
    let seconds = value.as_f64()?;
    SignedDuration::try_from_secs_f64(seconds)
        .ok()
        .and_then(|duration| Timestamp::from_duration(duration).ok())
}

fn audience(value: &Value) -> Option<Vec<&str>> {
    match value {
        Value::String(aud) => Some(vec![aud.as_str()]),
        Value::Array(values) => values.iter().map(Value::as_str).collect(),
        _ => None,
    }
}
