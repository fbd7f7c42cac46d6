use jostle::{
    ErrorKind,
    crypto::jose::{
        JWEAlgorithm, JWEEncryption, JWK, JWKEllipticCurves, JWKSet, JWKUse, KeySetFetcher,
    },
    error::BoxError,
    jwt::{ClaimsSet, Header, Jwt},
};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use tracing_test::traced_test;

use crate::utils::{claims, recipient_key};

struct StaticFetcher(Vec<u8>);

impl KeySetFetcher for StaticFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, BoxError> {
        match url {
            "https://issuer.example.com/.well-known/jwks.json" => Ok(self.0.clone()),
            _ => Err(format!("unknown url: {url}").into()),
        }
    }
}

fn publish(keys: &[&JWK]) -> Vec<u8> {
    let keys: Vec<JWK> = keys.iter().map(|jwk| jwk.to_public()).collect();
    serde_json::to_vec(&JWKSet::new(keys)).unwrap()
}

#[test]
fn verify_against_fetched_key_set() {
    let jwt = Jwt::default();
    let current = JWK::generate_ec(JWKEllipticCurves::P256)
        .unwrap()
        .with_kid("2026-10");
    let previous = JWK::generate_rsa(2048)
        .unwrap()
        .with_kid("2026-09")
        .with_alg("RS256");

    let fetcher = StaticFetcher(publish(&[&previous, &current]));
    let key_set = assert_ok!(JWKSet::fetch(
        &fetcher,
        "https://issuer.example.com/.well-known/jwks.json"
    ));
    assert_eq!(key_set.len(), 2);
    assert!(key_set.keys().iter().all(|jwk| !jwk.is_private()));

    for signer in [&current, &previous] {
        let header = Header::signed(signer.alg().unwrap())
            .with_kid(signer.kid().unwrap().to_owned());
        let token = jwt
            .build_signed(&header, &claims(), &signer.resolve().unwrap())
            .unwrap();
        let signed = jwt.reconstruct(&token).unwrap().into_signed().unwrap();
        assert_eq!(
            assert_ok!(signed.verify_with_key_set(jwt.registry(), &key_set)),
            &claims()
        );
    }

    let err = assert_err!(JWKSet::fetch(&fetcher, "https://evil.example.com/jwks"));
    assert_eq!(err.kind(), ErrorKind::KeyResolution);
}

#[test]
fn token_without_kid_tries_every_candidate() {
    let jwt = Jwt::default();
    let keys: Vec<JWK> = (0..3)
        .map(|_| JWK::generate_ec(JWKEllipticCurves::P384).unwrap())
        .collect();
    let signer = &keys[2];
    let key_set = JWKSet::new(keys.iter().map(JWK::to_public).collect());

    let token = jwt
        .build_signed(
            &Header::signed("ES384"),
            &ClaimsSet::new().with_subject("alice".to_owned()),
            &signer.resolve().unwrap(),
        )
        .unwrap();
    let signed = jwt.reconstruct(&token).unwrap().into_signed().unwrap();
    let claims = assert_ok!(signed.verify_with_key_set(jwt.registry(), &key_set));
    assert_eq!(claims.sub(), Some("alice"));
}

#[test]
fn encryption_keys_are_not_verification_candidates() {
    let jwt = Jwt::default();
    let signer = JWK::generate_ec(JWKEllipticCurves::P256)
        .unwrap()
        .with_kid("k1")
        .with_key_use(JWKUse::Encryption);
    let token = jwt
        .build_signed(
            &Header::signed("ES256").with_kid("k1".to_owned()),
            &claims(),
            &signer.resolve().unwrap(),
        )
        .unwrap();
    let signed = jwt.reconstruct(&token).unwrap().into_signed().unwrap();

    let key_set = JWKSet::new(vec![signer.to_public()]);
    let err = assert_err!(signed.verify_with_key_set(jwt.registry(), &key_set));
    assert!(err.is_cryptographic_failure());
}

#[test]
#[traced_test]
fn key_index_resolves_recipient_keys() {
    let jwt = Jwt::default();
    let shared = json!({"kty": "oct", "kid": "shared", "k": "GawgguFyGrWKav7AX4VKUg"});
    let replaced = json!({"kty": "oct", "kid": "shared", "k": "AyM1SysPpbyDfgZld3umj1qzKObwVMkoqQ-EstJQLr8"});
    let unsupported = json!({"kty": "OKP", "crv": "Ed25519", "x": "11qYAYKxCrfVS_7TyWQHOg7hcvPapiMlrwIaaPcHURo"});
    let document = serde_json::to_vec(&json!({"keys": [shared, unsupported, replaced]})).unwrap();

    let key_set = assert_ok!(JWKSet::parse(&document));
    assert_eq!(key_set.len(), 2);
    assert!(logs_contain("skipping unsupported key #1 in JWK set"));

    let index = assert_ok!(key_set.index());
    assert_eq!(index.len(), 1);
    assert!(logs_contain("duplicate kid in JWK set, last key wins"));

    let key = index.find("shared").unwrap().clone();
    let header = Header::encrypted("dir", "A128CBC-HS256").with_kid("shared".to_owned());
    let token = jwt.build_encrypted(&header, &claims(), &key).unwrap();
    let encrypted = jwt.reconstruct(&token).unwrap().into_encrypted().unwrap();
    assert_eq!(assert_ok!(encrypted.decrypt_with_provider(&index)), claims());

    let stranger = recipient_key(JWEAlgorithm::Dir, JWEEncryption::A128CbcHs256);
    let header = Header::encrypted("dir", "A128CBC-HS256").with_kid("unknown".to_owned());
    let token = jwt.build_encrypted(&header, &claims(), &stranger).unwrap();
    let encrypted = jwt.reconstruct(&token).unwrap().into_encrypted().unwrap();
    let err = assert_err!(encrypted.decrypt_with_provider(&index));
    assert_eq!(err.kind(), ErrorKind::KeyResolution);
}

#[test]
fn embedded_jwk_header_carries_public_key_only() {
    let jwk = JWK::generate_ec(JWKEllipticCurves::P521).unwrap();
    let header = assert_ok!(Header::signed("ES512").with_jwk(&jwk));
    let embedded = header.jwk().unwrap().unwrap();
    assert!(!embedded.is_private());
    assert_eq!(embedded.thumbprint().unwrap(), jwk.thumbprint().unwrap());
}
