use std::sync::LazyLock;

use jiff::Timestamp;
use jostle::{
    crypto::jose::{
        EcPrivateKey, JWA, JWEAlgorithm, JWEEncryption, JWKEllipticCurves, Key, RsaPrivateKey,
        SymmetricKey,
    },
    jwt::ClaimsSet,
};
use serde_json::json;

static RSA_KEY: LazyLock<RsaPrivateKey> =
    LazyLock::new(|| RsaPrivateKey::generate(2048).expect("generate RSA key"));

pub(super) fn rsa_key() -> Key {
    Key::RsaPrivate(RSA_KEY.clone())
}

pub(super) fn claims() -> ClaimsSet {
    ClaimsSet::new()
        .with_issuer("joe".to_owned())
        .with_subject("alice".to_owned())
        .with_audience(vec!["https://api.example.com".to_owned()])
        .with_expiration(Timestamp::from_second(1_300_819_380).unwrap())
        .with_claim("http://example.com/is_root".to_owned(), json!(true))
}

/// A private (or shared) key usable to sign with `alg`.
pub(super) fn signing_key(alg: JWA) -> Key {
    match alg {
        JWA::HS256 | JWA::HS384 | JWA::HS512 => {
            Key::Symmetric(SymmetricKey::generate(64).unwrap())
        }
        JWA::RS256 | JWA::RS384 | JWA::RS512 | JWA::PS256 | JWA::PS384 | JWA::PS512 => rsa_key(),
        JWA::ES256 | JWA::ES384 | JWA::ES512 => {
            let curve = JWKEllipticCurves::try_from(alg).unwrap();
            Key::EcPrivate(EcPrivateKey::generate(curve).unwrap())
        }
        JWA::None => panic!("none has no key"),
    }
}

/// The recipient's private (or shared) key for `alg` and `enc`.
pub(super) fn recipient_key(alg: JWEAlgorithm, enc: JWEEncryption) -> Key {
    match alg {
        JWEAlgorithm::Rsa1_5 | JWEAlgorithm::RsaOaep | JWEAlgorithm::RsaOaep256 => rsa_key(),
        JWEAlgorithm::A128KW => Key::Symmetric(SymmetricKey::generate(16).unwrap()),
        JWEAlgorithm::A256KW => Key::Symmetric(SymmetricKey::generate(32).unwrap()),
        JWEAlgorithm::Dir => Key::Symmetric(SymmetricKey::generate(enc.key_len()).unwrap()),
    }
}

/// Split a compact token into its decoded segments.
pub(super) fn decode_segments(token: &str) -> Vec<Vec<u8>> {
    token
        .split('.')
        .map(|segment| jostle::jwt::compact::decode(segment, "segment").unwrap())
        .collect()
}

/// Join decoded segments back into a compact token.
pub(super) fn encode_segments(segments: &[Vec<u8>]) -> String {
    let encoded: Vec<String> = segments.iter().map(jostle::jwt::compact::encode).collect();
    let parts: Vec<&str> = encoded.iter().map(String::as_str).collect();
    jostle::jwt::compact::join(&parts)
}
