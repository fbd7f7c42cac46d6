use indexmap::IndexMap;
use jostle_error::BoxError;
use serde::{Deserialize, Serialize};

use crate::{
    ErrorKind, JoseError, Result,
    jose::{AlgorithmRegistry, JWK, JWKEllipticCurves, JWKUse, Key, KeyProvider, SigningHandler},
};

/// Capability to retrieve the raw bytes of a remote key set,
/// e.g. over HTTP from a `jwks_uri`.
///
/// Caching and transport policy are up to the implementation.
pub trait KeySetFetcher: Send + Sync {
    /// Fetch the key set document found at the given url.
    fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, BoxError>;
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
/// [`JWKSet`] or JSON Web Key Set as defined in [`rfc7517, section 5`]
///
/// Immutable once parsed.
///
/// [`rfc7517, section 5`]: https://datatracker.ietf.org/doc/html/rfc7517#section-5
pub struct JWKSet {
    keys: Vec<JWK>,
}

#[derive(Deserialize)]
struct RawJWKSet {
    keys: Vec<serde_json::Value>,
}

impl JWKSet {
    /// Create a new [`JWKSet`] from the given keys.
    pub fn new(keys: Vec<JWK>) -> Self {
        Self { keys }
    }

    /// Parse a [`JWKSet`] from its JSON representation: `{"keys": [...]}`.
    ///
    /// Entries with a key type or curve that is not supported
    /// are skipped, as required by rfc7517. An entry of a supported
    /// type with missing or invalid members fails the whole set.
    pub fn parse(json: &[u8]) -> Result<Self> {
        let raw: RawJWKSet = serde_json::from_slice(json)
            .map_err(|err| JoseError::new(ErrorKind::KeyResolution, err))?;

        let mut keys = Vec::with_capacity(raw.keys.len());
        for (index, value) in raw.keys.into_iter().enumerate() {
            if !is_supported_key_type(&value) {
                tracing::debug!("skipping unsupported key #{index} in JWK set");
                continue;
            }
            let jwk = serde_json::from_value::<JWK>(value).map_err(|err| {
                JoseError::key_resolution(format!("invalid key #{index} in JWK set: {err}"))
            })?;
            keys.push(jwk);
        }
        Ok(Self { keys })
    }

    /// Fetch and parse a [`JWKSet`] using the given [`KeySetFetcher`].
    pub fn fetch(fetcher: &dyn KeySetFetcher, url: &str) -> Result<Self> {
        tracing::trace!(url, "fetching JWK set");
        let bytes = fetcher
            .fetch(url)
            .map_err(|err| JoseError::new(ErrorKind::KeyResolution, err))?;
        Self::parse(&bytes)
    }

    /// The keys of this set, in document order.
    pub fn keys(&self) -> &[JWK] {
        &self.keys
    }

    /// Number of keys in this set.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if this set holds no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Resolve every key of this set once, indexed by key id.
    ///
    /// Keys without `kid` are indexed under their thumbprint.
    /// If a key id is used more than once, the last key wins.
    pub fn index(&self) -> Result<KeyIndex> {
        let mut entries = IndexMap::with_capacity(self.keys.len());
        for jwk in &self.keys {
            let kid = match jwk.kid() {
                Some(kid) => kid.to_owned(),
                None => jwk.thumbprint()?,
            };
            let entry = IndexEntry {
                key: jwk.resolve()?,
                key_use: jwk.key_use(),
                alg: jwk.alg().map(ToOwned::to_owned),
            };
            if entries.insert(kid.clone(), entry).is_some() {
                tracing::warn!(%kid, "duplicate kid in JWK set, last key wins");
            }
        }
        Ok(KeyIndex { entries })
    }

    /// Build signing handlers for every key usable to verify
    /// a signature made with `alg`.
    ///
    /// When `kid` is given, only keys with that id are considered.
    /// Keys declaring a different `alg` or a `use` other than `sig` are skipped,
    /// as are keys that cannot be used with the algorithm.
    pub fn verification_candidates(
        &self,
        registry: &AlgorithmRegistry,
        kid: Option<&str>,
        alg: &str,
    ) -> Vec<Box<dyn SigningHandler>> {
        self.keys
            .iter()
            .filter(|jwk| kid.is_none_or(|kid| jwk.kid() == Some(kid)))
            .filter(|jwk| jwk.alg().is_none_or(|key_alg| key_alg == alg))
            .filter(|jwk| jwk.is_usable_for(JWKUse::Signature))
            .filter_map(|jwk| {
                let key = jwk
                    .resolve()
                    .inspect_err(|err| tracing::debug!("skipping unresolvable candidate key: {err}"))
                    .ok()?;
                registry
                    .signing_handler(alg, &key)
                    .inspect_err(|err| tracing::debug!("skipping candidate key: {err}"))
                    .ok()
            })
            .collect()
    }
}

#[derive(Clone, Debug)]
struct IndexEntry {
    key: Key,
    key_use: Option<JWKUse>,
    alg: Option<String>,
}

#[derive(Clone, Debug, Default)]
/// Resolved keys of a [`JWKSet`], indexed by key id.
pub struct KeyIndex {
    entries: IndexMap<String, IndexEntry>,
}

impl KeyIndex {
    /// Find the key with the given key id.
    pub fn find(&self, kid: &str) -> Option<&Key> {
        self.entries.get(kid).map(|entry| &entry.key)
    }

    /// Find the key with the given key id, if it may be used for `key_use`.
    pub fn find_for_use(&self, kid: &str, key_use: JWKUse) -> Option<&Key> {
        self.entries
            .get(kid)
            .filter(|entry| entry.key_use.is_none_or(|u| u == key_use))
            .map(|entry| &entry.key)
    }

    /// Intended algorithm of the key with the given key id, if declared.
    pub fn alg(&self, kid: &str) -> Option<&str> {
        self.entries.get(kid).and_then(|entry| entry.alg.as_deref())
    }

    /// Iterate over all key ids and their keys, in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Key)> {
        self.entries
            .iter()
            .map(|(kid, entry)| (kid.as_str(), &entry.key))
    }

    /// Number of indexed keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no keys are indexed.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `kty` is one of `oct`, `RSA` or `EC`, and an `EC` key names a supported curve.
///
/// An `EC` key without `crv` counts as supported, so that it fails to resolve.
fn is_supported_key_type(value: &serde_json::Value) -> bool {
    let member = |name| value.get(name).and_then(serde_json::Value::as_str);
    match member("kty") {
        Some("oct" | "RSA") => true,
        Some("EC") => member("crv").is_none_or(|crv| {
            JWKEllipticCurves::ALL
                .iter()
                .any(|curve| curve.as_str() == crv)
        }),
        _ => false,
    }
}

impl KeyProvider for KeyIndex {
    fn lookup(&self, alias: &str) -> std::result::Result<Key, BoxError> {
        self.find(alias)
            .cloned()
            .ok_or_else(|| format!("no key with id '{alias}' in JWK set").into())
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::assert_err;

    use super::*;

    fn oct(kid: &str, k: &str) -> serde_json::Value {
        serde_json::json!({"kty": "oct", "kid": kid, "k": k})
    }

    #[test]
    fn parse_skips_unsupported_key_types() {
        let json = serde_json::json!({
            "keys": [
                oct("a", "AAECAwQFBgcICQoLDA0ODw"),
                {"kty": "OKP", "crv": "Ed25519", "x": "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo"},
                {"kty": "EC", "crv": "secp256k1", "x": "AA", "y": "AA"},
            ]
        });
        let set = JWKSet::parse(&serde_json::to_vec(&json).unwrap()).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.keys()[0].kid(), Some("a"));
    }

    #[test]
    fn parse_rejects_supported_key_types_with_missing_members() {
        for key in [
            serde_json::json!({"kty": "EC", "crv": "P-256", "y": "4Etl6SRW2YiLUrN5vfvVHuhp7x8PxltmWWlbbM4IFyM"}),
            serde_json::json!({"kty": "EC", "x": "f83OJ3D2xF1Bg8vub9tLe1gHMzV76e8Tus9uPHvRVEU", "y": "x_FEzRu9m36HLN_tue659LNpXW6pCyStikYjKIWI5a0"}),
            serde_json::json!({"kty": "RSA", "e": "AQAB"}),
            serde_json::json!({"kty": "oct"}),
        ] {
            let json = serde_json::json!({"keys": [oct("a", "AAECAwQFBgcICQoLDA0ODw"), key]});
            let err = assert_err!(JWKSet::parse(&serde_json::to_vec(&json).unwrap()));
            assert_eq!(err.kind(), ErrorKind::KeyResolution);
            assert!(err.to_string().contains("key #1"), "{err}");
        }
    }

    #[test]
    fn parse_requires_keys_member() {
        let err = JWKSet::parse(br#"{"kees": []}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyResolution);
    }

    #[test]
    #[tracing_test::traced_test]
    fn duplicate_kid_last_wins() {
        let json = serde_json::json!({
            "keys": [
                oct("dup", "AQEBAQEBAQEBAQEBAQEBAQ"),
                oct("other", "AgICAgICAgICAgICAgICAg"),
                oct("dup", "AwMDAwMDAwMDAwMDAwMDAw"),
            ]
        });
        let index = JWKSet::parse(&serde_json::to_vec(&json).unwrap())
            .unwrap()
            .index()
            .unwrap();

        assert_eq!(index.len(), 2);
        let Some(Key::Symmetric(key)) = index.find("dup") else {
            panic!("expected symmetric key");
        };
        assert_eq!(key.as_bytes(), &[3u8; 16]);
        assert!(logs_contain("duplicate kid"));
    }

    #[test]
    fn index_uses_thumbprint_without_kid() {
        let jwk = JWK::generate_ec(JWKEllipticCurves::P256).unwrap();
        let thumbprint = jwk.thumbprint().unwrap();
        let index = JWKSet::new(vec![jwk]).index().unwrap();
        assert!(index.find(&thumbprint).is_some());
    }

    #[test]
    fn find_for_use_respects_key_use() {
        let signing = JWK::generate_ec(JWKEllipticCurves::P256)
            .unwrap()
            .with_kid("sig");
        let encryption = JWK::generate_oct(16)
            .unwrap()
            .with_kid("enc")
            .with_key_use(JWKUse::Encryption);
        let index = JWKSet::new(vec![signing, encryption]).index().unwrap();

        assert!(index.find_for_use("sig", JWKUse::Signature).is_some());
        assert!(index.find_for_use("enc", JWKUse::Signature).is_none());
        assert!(index.find_for_use("enc", JWKUse::Encryption).is_some());
        assert_eq!(index.alg("sig"), Some("ES256"));
        assert!(index.find("missing").is_none());
    }

    #[test]
    fn invalid_key_fails_index() {
        let json = serde_json::json!({
            "keys": [{"kty": "EC", "crv": "P-256", "kid": "bad", "x": "AA", "y": "AA"}]
        });
        let set = JWKSet::parse(&serde_json::to_vec(&json).unwrap()).unwrap();
        let err = assert_err!(set.index());
        assert_eq!(err.kind(), ErrorKind::KeyResolution);
    }

    struct StaticFetcher(&'static [u8]);

    impl KeySetFetcher for StaticFetcher {
        fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, BoxError> {
            if url == "https://issuer.example/jwks" {
                Ok(self.0.to_vec())
            } else {
                Err("not found".into())
            }
        }
    }

    #[test]
    fn fetch_delegates_to_fetcher() {
        let fetcher = StaticFetcher(br#"{"keys":[{"kty":"oct","k":"AAECAwQFBgcICQoLDA0ODw"}]}"#);
        let set = JWKSet::fetch(&fetcher, "https://issuer.example/jwks").unwrap();
        assert_eq!(set.len(), 1);

        let err = JWKSet::fetch(&fetcher, "https://other.example/jwks").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyResolution);
    }

    #[test]
    fn verification_candidates_filter_on_kid_and_alg() {
        let registry = AlgorithmRegistry::new();
        let a = JWK::generate_ec(JWKEllipticCurves::P256)
            .unwrap()
            .with_kid("a");
        let b = JWK::generate_ec(JWKEllipticCurves::P256)
            .unwrap()
            .with_kid("b");
        let c = JWK::generate_ec(JWKEllipticCurves::P384)
            .unwrap()
            .with_kid("c");
        let set = JWKSet::new(vec![a, b, c]);

        assert_eq!(set.verification_candidates(&registry, None, "ES256").len(), 2);
        assert_eq!(
            set.verification_candidates(&registry, Some("b"), "ES256").len(),
            1
        );
        assert_eq!(
            set.verification_candidates(&registry, Some("c"), "ES256").len(),
            0
        );
        assert_eq!(set.verification_candidates(&registry, None, "HS1").len(), 0);
    }
}
