use std::collections::HashMap;

use jostle::{
    ErrorKind,
    crypto::jose::{JWA, JWEAlgorithm, JWEEncryption, Key, KeyProvider},
    error::{BoxError, OpaqueError},
    jwt::{Header, Jwt, Token},
};
use tokio_test::{assert_err, assert_ok};
use tracing_test::traced_test;

use crate::utils::{claims, recipient_key, signing_key};

struct Keystore(HashMap<&'static str, Key>);

impl KeyProvider for Keystore {
    fn lookup(&self, alias: &str) -> Result<Key, BoxError> {
        self.0
            .get(alias)
            .cloned()
            .ok_or_else(|| OpaqueError::from_display(format!("no key stored as '{alias}'")).into())
    }
}

#[test]
#[traced_test]
fn signed_then_encrypted_round_trip() {
    let jwt = Jwt::default();
    let signing = signing_key(JWA::ES256);
    let recipient = recipient_key(JWEAlgorithm::RsaOaep, JWEEncryption::A256CbcHs512);

    let token = jwt
        .build_signed_then_encrypted(
            &Header::signed("ES256"),
            &claims(),
            &signing,
            &Header::encrypted("RSA-OAEP", "A256CBC-HS512"),
            &recipient.to_public(),
        )
        .unwrap();

    let nested = match jwt.reconstruct(&token).unwrap() {
        Token::SignedThenEncrypted(nested) => nested,
        other => panic!("unexpected token: {other:?}"),
    };
    assert_eq!(nested.header().cty(), Some("JWT"));

    let verifier = jwt
        .registry()
        .signing_handler("ES256", &signing.to_public())
        .unwrap();
    let decrypted = assert_ok!(nested.decrypt_and_verify(&recipient, &verifier));
    assert_eq!(decrypted, claims());

    let err = assert_err!(nested.verify(&verifier));
    assert_eq!(err.kind(), ErrorKind::CryptographicFailure);
    assert!(logs_contain("verify called on a nested token before decryption"));
}

#[test]
fn inner_signature_is_checked() {
    let jwt = Jwt::default();
    let recipient = recipient_key(JWEAlgorithm::Dir, JWEEncryption::A128Gcm);
    let token = jwt
        .build_signed_then_encrypted(
            &Header::signed("HS256"),
            &claims(),
            &signing_key(JWA::HS256),
            &Header::encrypted("dir", "A128GCM"),
            &recipient,
        )
        .unwrap();
    let nested = jwt
        .reconstruct(&token)
        .unwrap()
        .into_signed_then_encrypted()
        .unwrap();

    let inner = assert_ok!(nested.decrypt(&recipient));
    assert_eq!(inner.unverified_claims(), &claims());

    let stranger = jwt
        .registry()
        .signing_handler("HS256", &signing_key(JWA::HS256))
        .unwrap();
    let err = assert_err!(nested.decrypt_and_verify(&recipient, &stranger));
    assert!(err.is_cryptographic_failure());
}

#[test]
fn recipient_key_from_provider() {
    let jwt = Jwt::default();
    let signing = signing_key(JWA::PS384);
    let recipient = recipient_key(JWEAlgorithm::A256KW, JWEEncryption::A256Gcm);
    let keystore = Keystore(HashMap::from([("recipient-1", recipient.clone())]));

    let token = jwt
        .build_signed_then_encrypted(
            &Header::signed("PS384"),
            &claims(),
            &signing,
            &Header::encrypted("A256KW", "A256GCM").with_kid("recipient-1".to_owned()),
            &recipient,
        )
        .unwrap();
    let nested = jwt
        .reconstruct(&token)
        .unwrap()
        .into_signed_then_encrypted()
        .unwrap();
    let verifier = jwt
        .registry()
        .signing_handler("PS384", &signing.to_public())
        .unwrap();
    assert_eq!(
        assert_ok!(nested.decrypt_with_provider_and_verify(&keystore, &verifier)),
        claims()
    );

    let empty = Keystore(HashMap::new());
    let err = assert_err!(nested.decrypt_with_provider_and_verify(&empty, &verifier));
    assert_eq!(err.kind(), ErrorKind::KeyResolution);
}

#[test]
fn encrypted_token_by_provider() {
    let jwt = Jwt::default();
    let recipient = recipient_key(JWEAlgorithm::Rsa1_5, JWEEncryption::A128CbcHs256);
    let keystore = Keystore(HashMap::from([("rsa", recipient.clone())]));
    let header = Header::encrypted("RSA1_5", "A128CBC-HS256").with_kid("rsa".to_owned());
    let token = jwt
        .build_encrypted(&header, &claims(), &recipient.to_public())
        .unwrap();

    let encrypted = jwt.reconstruct(&token).unwrap().into_encrypted().unwrap();
    assert_eq!(assert_ok!(encrypted.decrypt_with_provider(&keystore)), claims());
}
