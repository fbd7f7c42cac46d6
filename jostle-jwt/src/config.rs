/// Default upper bound for the length of a compact token, in bytes.
pub(crate) const DEFAULT_MAX_TOKEN_LEN: usize = 1024 * 1024;

/// Default upper bound for an inflated (`zip: DEF`) payload, in bytes.
pub(crate) const DEFAULT_MAX_INFLATED_LEN: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Limits and policy of a [`Jwt`](crate::Jwt) engine.
///
/// Immutable once handed to the engine.
pub struct JwtConfig {
    max_token_len: usize,
    max_inflated_len: usize,
    understood_critical_headers: Vec<String>,
    allow_plain: bool,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            max_token_len: DEFAULT_MAX_TOKEN_LEN,
            max_inflated_len: DEFAULT_MAX_INFLATED_LEN,
            understood_critical_headers: Vec::new(),
            allow_plain: true,
        }
    }
}

impl JwtConfig {
    /// Create a new [`JwtConfig`] with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the maximum length of a compact token accepted for reconstruction.
        pub fn max_token_len(mut self, len: usize) -> Self {
            self.max_token_len = len;
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the maximum size a compressed payload may inflate to.
        pub fn max_inflated_len(mut self, len: usize) -> Self {
            self.max_inflated_len = len;
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Set the extension header parameters this application understands,
        /// and thus accepts when listed in `crit`.
        pub fn understood_critical_headers(mut self, names: Vec<String>) -> Self {
            self.understood_critical_headers = names;
            self
        }
    }

    jostle_utils::macros::generate_set_and_with! {
        /// Allow or refuse building and reconstructing plain (unsecured) tokens.
        pub fn allow_plain(mut self, allow: bool) -> Self {
            self.allow_plain = allow;
            self
        }
    }

    /// Maximum length of a compact token accepted for reconstruction.
    pub fn max_token_len(&self) -> usize {
        self.max_token_len
    }

    /// Maximum size a compressed payload may inflate to.
    pub fn max_inflated_len(&self) -> usize {
        self.max_inflated_len
    }

    /// Extension header parameters accepted in `crit`.
    pub fn understood_critical_headers(&self) -> &[String] {
        &self.understood_critical_headers
    }

    /// Returns true if plain tokens are allowed.
    pub fn allow_plain(&self) -> bool {
        self.allow_plain
    }
}
