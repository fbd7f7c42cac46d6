use jostle::{
    ErrorKind,
    jwt::{ClaimsSet, Header, HeaderKind, Jwt, Token},
};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

#[test]
fn plain_token_scenario() {
    let jwt = Jwt::default();
    let claims = ClaimsSet::new().with_issuer("test".to_owned());

    let token = assert_ok!(jwt.build_plain(&Header::plain(), &claims));
    assert_eq!(token, "eyJhbGciOiJub25lIn0.eyJpc3MiOiJ0ZXN0In0.");
    assert!(token.ends_with('.'));

    let plain = match assert_ok!(jwt.reconstruct(&token)) {
        Token::Plain(plain) => plain,
        other => panic!("unexpected token: {other:?}"),
    };
    assert_eq!(plain.header().kind(), HeaderKind::Plain);
    assert_eq!(plain.header().alg(), Some("none"));
    assert_eq!(plain.claims(), &claims);
    assert_eq!(plain.into_claims().iss(), Some("test"));
}

#[test]
fn plain_token_keeps_custom_claims_in_order() {
    let jwt = Jwt::default();
    let claims = ClaimsSet::new()
        .with_claim("z".to_owned(), json!(1))
        .with_claim("a".to_owned(), json!({"nested": [1, 2, 3]}))
        .with_issuer("test".to_owned());
    let token = jwt.build_plain(&Header::plain(), &claims).unwrap();

    let plain = jwt.reconstruct(&token).unwrap().into_plain().unwrap();
    let names: Vec<&str> = plain.claims().claims().keys().map(String::as_str).collect();
    assert_eq!(names, ["z", "a", "iss"]);
}

#[test]
fn plain_header_is_required_for_plain_tokens() {
    let err = assert_err!(Jwt::default().build_plain(&Header::signed("HS256"), &ClaimsSet::new()));
    assert_eq!(err.kind(), ErrorKind::MalformedToken);
}
