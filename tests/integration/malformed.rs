use jostle::{
    ErrorKind,
    crypto::jose::{JWA, SigningHandler},
    jwt::{Header, Jwt, compact},
};
use tokio_test::assert_err;

use crate::utils::{claims, signing_key};

fn token(header: &str, claims: &str, signature: &str) -> String {
    compact::join(&[
        &compact::encode(header),
        &compact::encode(claims),
        signature,
    ])
}

fn assert_malformed(token: &str) {
    let err = assert_err!(Jwt::default().reconstruct(token), "{token}");
    assert_eq!(err.kind(), ErrorKind::MalformedToken, "{token}: {err}");
}

#[test]
fn duplicate_header_parameters_are_rejected() {
    assert_malformed(&token(r#"{"alg":"none","alg":"none"}"#, "{}", ""));
    assert_malformed(&token(r#"{"alg":"HS256","alg":"none"}"#, "{}", "c2ln"));
    assert_malformed(&token(
        r#"{"alg":"HS256","jwk":{"kty":"oct","kty":"oct"}}"#,
        "{}",
        "c2ln",
    ));
}

#[test]
fn duplicate_claims_are_rejected() {
    assert_malformed(&token(
        r#"{"alg":"none"}"#,
        r#"{"iss":"test","iss":"other"}"#,
        "",
    ));
    assert_malformed(&token(
        r#"{"alg":"HS256"}"#,
        r#"{"iss":"test","ext":{"a":1,"a":2}}"#,
        "c2ln",
    ));
}

#[test]
fn duplicate_claims_in_a_signed_token_are_rejected_before_verification() {
    let jwt = Jwt::default();
    let key = signing_key(JWA::HS256);
    let header = compact::encode(r#"{"alg":"HS256"}"#);
    let claims = compact::encode(r#"{"sub":"alice","sub":"admin"}"#);
    let signing_input = compact::join(&[&header, &claims]);
    let signature = jwt
        .registry()
        .signing_handler("HS256", &key)
        .unwrap()
        .sign(signing_input.as_bytes())
        .unwrap();

    let token = compact::join(&[&signing_input, &compact::encode(signature)]);
    assert_malformed(&token);
}

#[test]
fn structure_errors_are_malformed() {
    for token in [
        "",
        "a.b",
        "a.b.c.d",
        "a.b.c.d.e.f",
        "eyJhbGciOiJub25lIn0=.e30.",
        "eyJhbGciOiJub25lIn0.e30+.",
        "W10.e30.",
        "bm90IGpzb24.e30.",
        "eyJhbGciOiJub25lIn0.e30.c2ln",
    ] {
        assert_malformed(token);
    }
}

#[test]
fn registered_members_must_have_their_type() {
    assert_malformed(&token(r#"{"alg":256}"#, "{}", "c2ln"));
    assert_malformed(&token(r#"{"alg":"none"}"#, r#"{"exp":"tomorrow"}"#, ""));
    assert_malformed(&token(r#"{"alg":"none"}"#, r#"{"aud":[1,2]}"#, ""));
}

#[test]
fn kind_must_match_part_count() {
    let jwt = Jwt::default();
    let signed = jwt
        .build_signed(&Header::signed("HS256"), &claims(), &signing_key(JWA::HS256))
        .unwrap();
    let five_parts = format!("{signed}.x.y");
    assert_malformed(&five_parts);

    let encrypted_header = compact::encode(r#"{"alg":"dir","enc":"A128GCM"}"#);
    assert_malformed(&format!("{encrypted_header}.e30.c2ln"));
}
