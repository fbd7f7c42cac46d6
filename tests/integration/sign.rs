use jostle::{
    ErrorKind,
    crypto::jose::{JWA, JWK},
    jwt::{Header, Jwt},
};
use tokio_test::{assert_err, assert_ok};

use crate::utils::{claims, signing_key};

#[test]
fn every_signing_algorithm_round_trips() {
    let jwt = Jwt::default();
    let claims = claims();

    for alg in JWA::ALL.iter().filter(|alg| **alg != JWA::None) {
        let key = signing_key(*alg);
        let header = Header::signed(alg.as_str()).with_typ("JWT".to_owned());
        let token = assert_ok!(jwt.build_signed(&header, &claims, &key), "build {alg}");
        assert_eq!(token.split('.').count(), 3, "{alg}");

        let signed = jwt.reconstruct(&token).unwrap().into_signed().unwrap();
        assert_eq!(signed.header().alg(), Some(alg.as_str()));

        let verifier = jwt
            .registry()
            .signing_handler(alg.as_str(), &key.to_public())
            .unwrap();
        assert_eq!(assert_ok!(signed.verify(&verifier), "verify {alg}"), &claims);
    }
}

#[test]
fn verification_with_another_key_fails() {
    let jwt = Jwt::default();
    for alg in [JWA::HS256, JWA::ES384, JWA::PS256] {
        let token = jwt
            .build_signed(&Header::signed(alg.as_str()), &claims(), &signing_key(alg))
            .unwrap();
        let signed = jwt.reconstruct(&token).unwrap().into_signed().unwrap();

        let stranger = match alg {
            JWA::PS256 => JWK::generate_rsa(2048).unwrap().resolve().unwrap(),
            _ => signing_key(alg),
        };
        let verifier = jwt
            .registry()
            .signing_handler(alg.as_str(), &stranger.to_public())
            .unwrap();
        let err = assert_err!(signed.verify(&verifier));
        assert_eq!(err.kind(), ErrorKind::CryptographicFailure);
    }
}

#[test]
fn key_must_fit_the_algorithm() {
    let jwt = Jwt::default();
    let err = assert_err!(jwt.build_signed(
        &Header::signed("ES256"),
        &claims(),
        &signing_key(JWA::HS256)
    ));
    assert_eq!(err.kind(), ErrorKind::KeyResolution);

    let err = assert_err!(jwt.build_signed(
        &Header::signed("EdDSA"),
        &claims(),
        &signing_key(JWA::HS256)
    ));
    assert_eq!(err.kind(), ErrorKind::UnsupportedAlgorithm);
}

#[test]
fn signature_covers_received_bytes() {
    let jwt = Jwt::default();
    let key = signing_key(JWA::HS256);
    let token = jwt
        .build_signed(&Header::signed("HS256"), &claims(), &key)
        .unwrap();
    let signed = jwt.reconstruct(&token).unwrap().into_signed().unwrap();

    let (signing_input, _) = token.rsplit_once('.').unwrap();
    assert_eq!(signed.signing_input(), signing_input);
}
