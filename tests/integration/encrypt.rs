use jostle::{
    ErrorKind,
    crypto::jose::{AlgorithmRegistry, JWEAlgorithm, JWEEncryption, Key, SymmetricKey},
    jwt::{Header, Jwt, JwtConfig},
};
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};
use tracing_test::traced_test;

use crate::utils::{claims, recipient_key};

#[test]
fn every_algorithm_pair_round_trips() {
    let jwt = Jwt::default();
    let claims = claims();

    for alg in JWEAlgorithm::ALL {
        for enc in JWEEncryption::ALL {
            let key = recipient_key(*alg, *enc);
            let header = Header::encrypted(alg.as_str(), enc.as_str());
            let token = assert_ok!(
                jwt.build_encrypted(&header, &claims, &key.to_public()),
                "build {alg} {enc}"
            );

            let segments: Vec<&str> = token.split('.').collect();
            assert_eq!(segments.len(), 5, "{alg} {enc}");
            if *alg == JWEAlgorithm::Dir {
                assert!(segments[1].is_empty(), "dir has no encrypted key");
            }

            let encrypted = jwt.reconstruct(&token).unwrap().into_encrypted().unwrap();
            assert_eq!(encrypted.header().enc(), Some(enc.as_str()));
            assert_eq!(
                assert_ok!(encrypted.decrypt(&key), "decrypt {alg} {enc}"),
                claims
            );
        }
    }
}

#[test]
fn compressed_payload_round_trips() {
    let jwt = Jwt::default();
    let claims = claims().with_claim(
        "padding".to_owned(),
        serde_json::Value::String("jostle ".repeat(256)),
    );

    for (alg, enc) in [
        (JWEAlgorithm::A128KW, JWEEncryption::A128CbcHs256),
        (JWEAlgorithm::RsaOaep256, JWEEncryption::A256Gcm),
    ] {
        let key = recipient_key(alg, enc);
        let header = Header::encrypted(alg.as_str(), enc.as_str()).with_zip("DEF".to_owned());
        let token = jwt
            .build_encrypted(&header, &claims, &key.to_public())
            .unwrap();
        let plain_len = jwt
            .build_encrypted(
                &Header::encrypted(alg.as_str(), enc.as_str()),
                &claims,
                &key.to_public(),
            )
            .unwrap()
            .len();
        assert!(token.len() < plain_len, "{alg} {enc} deflated");

        let encrypted = jwt.reconstruct(&token).unwrap().into_encrypted().unwrap();
        assert_eq!(encrypted.header().zip(), Some("DEF"));
        assert_eq!(assert_ok!(encrypted.decrypt(&key)), claims);
    }
}

#[test]
#[traced_test]
fn inflation_is_bounded() {
    let key = recipient_key(JWEAlgorithm::Dir, JWEEncryption::A128Gcm);
    let claims = claims().with_claim(
        "padding".to_owned(),
        serde_json::Value::String("a".repeat(4096)),
    );
    let header = Header::encrypted("dir", "A128GCM").with_zip("DEF".to_owned());
    let token = Jwt::default()
        .build_encrypted(&header, &claims, &key)
        .unwrap();

    let strict = Jwt::new(
        Arc::new(AlgorithmRegistry::new()),
        Arc::new(JwtConfig::new().with_max_inflated_len(1024)),
    );
    let encrypted = strict.reconstruct(&token).unwrap().into_encrypted().unwrap();
    let err = assert_err!(encrypted.decrypt(&key));
    assert_eq!(err.kind(), ErrorKind::CryptographicFailure);
    assert!(logs_contain("inflated payload exceeds limit"));
}

#[test]
fn unknown_compression_is_unsupported() {
    let key = recipient_key(JWEAlgorithm::Dir, JWEEncryption::A128Gcm);
    let header = Header::encrypted("dir", "A128GCM").with_zip("LZ4".to_owned());
    let err = assert_err!(Jwt::default().build_encrypted(&header, &claims(), &key));
    assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm);
}

#[test]
fn wrong_recipient_key_fails_opaquely() {
    let jwt = Jwt::default();
    let key = recipient_key(JWEAlgorithm::A256KW, JWEEncryption::A256Gcm);
    let token = jwt
        .build_encrypted(&Header::encrypted("A256KW", "A256GCM"), &claims(), &key)
        .unwrap();
    let encrypted = jwt.reconstruct(&token).unwrap().into_encrypted().unwrap();

    let other = Key::Symmetric(SymmetricKey::generate(32).unwrap());
    let err = assert_err!(encrypted.decrypt(&other));
    assert!(err.is_cryptographic_failure());
}

#[test]
fn unregistered_pair_is_unsupported() {
    let jwt = Jwt::default();
    let key = recipient_key(JWEAlgorithm::Dir, JWEEncryption::A128Gcm);
    for (alg, enc) in [("ECDH-ES", "A128GCM"), ("dir", "A192GCM")] {
        let err = assert_err!(jwt.build_encrypted(&Header::encrypted(alg, enc), &claims(), &key));
        assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm, "{alg} {enc}");
    }
}
