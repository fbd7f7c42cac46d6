use std::collections::BTreeSet;

use jostle::{
    JoseError, Result,
    crypto::jose::{JWA, JWEAlgorithm, JWEEncryption},
    jwt::{Header, Jwt},
};

use crate::utils::{claims, decode_segments, encode_segments, recipient_key, signing_key};

/// Replace the byte in the middle of `segment` with every other value,
/// returning the rendered error of each attempt.
fn substitute_each_byte(
    token: &str,
    segment: usize,
    check: impl Fn(&str) -> Result<()>,
) -> BTreeSet<String> {
    let segments = decode_segments(token);
    let position = segments[segment].len() / 2;
    let original = segments[segment][position];

    let mut messages = BTreeSet::new();
    for value in (0..=u8::MAX).filter(|value| *value != original) {
        let mut tampered = segments.clone();
        tampered[segment][position] = value;
        let err = check(&encode_segments(&tampered))
            .expect_err("tampered token must be rejected");
        assert!(err.is_cryptographic_failure(), "segment {segment}: {err:?}");
        messages.insert(err.to_string());
    }
    messages
}

#[test]
fn tampered_encrypted_tokens_fail_indistinguishably() {
    let jwt = Jwt::default();
    let mut messages = BTreeSet::new();

    for (alg, enc) in [
        (JWEAlgorithm::A128KW, JWEEncryption::A128CbcHs256),
        (JWEAlgorithm::RsaOaep, JWEEncryption::A256Gcm),
        (JWEAlgorithm::Rsa1_5, JWEEncryption::A128Gcm),
        (JWEAlgorithm::Dir, JWEEncryption::A256CbcHs512),
    ] {
        let key = recipient_key(alg, enc);
        let token = jwt
            .build_encrypted(
                &Header::encrypted(alg.as_str(), enc.as_str()),
                &claims(),
                &key.to_public(),
            )
            .unwrap();
        let decrypt = |token: &str| {
            let encrypted = jwt.reconstruct(token)?.into_encrypted().unwrap();
            encrypted.decrypt(&key).map(drop)
        };

        // encrypted key, IV, ciphertext and tag
        let first = if alg == JWEAlgorithm::Dir { 2 } else { 1 };
        for segment in first..5 {
            messages.append(&mut substitute_each_byte(&token, segment, decrypt));
        }
    }

    assert_eq!(
        messages,
        BTreeSet::from([JoseError::cryptographic_failure().to_string()])
    );
}

#[test]
fn tampered_signatures_fail_indistinguishably() {
    let jwt = Jwt::default();
    let mut messages = BTreeSet::new();

    for alg in [JWA::HS256, JWA::RS256, JWA::PS512, JWA::ES256, JWA::ES512] {
        let key = signing_key(alg);
        let token = jwt
            .build_signed(&Header::signed(alg.as_str()), &claims(), &key)
            .unwrap();
        let verifier = jwt
            .registry()
            .signing_handler(alg.as_str(), &key.to_public())
            .unwrap();
        let verify = |token: &str| {
            let signed = jwt.reconstruct(token)?.into_signed().unwrap();
            signed.verify(&verifier).map(drop)
        };
        messages.append(&mut substitute_each_byte(&token, 2, verify));
    }

    assert_eq!(
        messages,
        BTreeSet::from([JoseError::cryptographic_failure().to_string()])
    );
}

#[test]
fn tampered_nested_tokens_fail_indistinguishably() {
    let jwt = Jwt::default();
    let signing = signing_key(JWA::ES384);
    let recipient = recipient_key(JWEAlgorithm::A256KW, JWEEncryption::A128CbcHs256);
    let token = jwt
        .build_signed_then_encrypted(
            &Header::signed("ES384"),
            &claims(),
            &signing,
            &Header::encrypted("A256KW", "A128CBC-HS256"),
            &recipient,
        )
        .unwrap();
    let verifier = jwt
        .registry()
        .signing_handler("ES384", &signing.to_public())
        .unwrap();
    let decrypt_and_verify = |token: &str| {
        let nested = jwt.reconstruct(token)?.into_signed_then_encrypted().unwrap();
        nested.decrypt_and_verify(&recipient, &verifier).map(drop)
    };

    let mut messages = BTreeSet::new();
    for segment in 1..5 {
        messages.append(&mut substitute_each_byte(&token, segment, decrypt_and_verify));
    }
    assert_eq!(messages.len(), 1);
}
