//! Tests for the HS256 token verifier.

use super::*;
use crate::domain::service_test_support::{clock_on, date};
use rstest::{fixture, rstest};
use serde_json::json;

const SECRET: &[u8] = b"maintenance-secret";

/// 2024-12-16T12:00:00Z, the instant the fixture clock is pinned to.
const NOW: i64 = 1_734_350_400;

fn sign(header: &Value, claims: &Value, secret: &[u8]) -> String {
    let header = URL_SAFE_NO_PAD.encode(header.to_string());
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    let mut mac = HmacSha256::new_from_slice(secret).expect("hmac key");
    mac.update(format!("{header}.{payload}").as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
    format!("{header}.{payload}.{signature}")
}

fn token(claims: Value) -> String {
    sign(&json!({"alg": "HS256", "typ": "JWT"}), &claims, SECRET)
}

#[fixture]
fn verifier() -> Hs256TokenVerifier {
    Hs256TokenVerifier::new(
        Zeroizing::new(SECRET.to_vec()),
        clock_on(date(2024, 12, 16)),
    )
}

#[rstest]
#[tokio::test]
async fn accepts_customer_id_claim(verifier: Hs256TokenVerifier) {
    let jwt = token(json!({"customer_id": "C1", "customerName": "Acme", "exp": NOW + 60}));

    let claims = verifier
        .verify(&format!("Bearer {jwt}"))
        .await
        .expect("token accepted");

    assert_eq!(claims.customer_id.as_ref(), "C1");
    assert_eq!(claims.customer_name.as_deref(), Some("Acme"));
}

#[rstest]
#[tokio::test]
async fn falls_back_to_short_claim_names(verifier: Hs256TokenVerifier) {
    let jwt = token(json!({"cust_id": 42, "cust_name": "Plant 4"}));

    let claims = verifier.verify(&jwt).await.expect("bare token accepted");

    assert_eq!(claims.customer_id.as_ref(), "42");
    assert_eq!(claims.customer_name.as_deref(), Some("Plant 4"));
}

#[rstest]
#[case(NOW, AuthError::Expired)]
#[case(NOW - 1, AuthError::Expired)]
#[tokio::test]
async fn rejects_expired_tokens(
    verifier: Hs256TokenVerifier,
    #[case] exp: i64,
    #[case] expected: AuthError,
) {
    let jwt = token(json!({"customer_id": "C1", "exp": exp}));
    assert_eq!(verifier.verify(&jwt).await, Err(expected));
}

#[rstest]
#[tokio::test]
async fn rejects_foreign_signatures(verifier: Hs256TokenVerifier) {
    let jwt = sign(
        &json!({"alg": "HS256"}),
        &json!({"customer_id": "C1"}),
        b"someone-else",
    );
    assert_eq!(verifier.verify(&jwt).await, Err(AuthError::InvalidSignature));
}

#[rstest]
#[tokio::test]
async fn rejects_other_algorithms(verifier: Hs256TokenVerifier) {
    let jwt = sign(&json!({"alg": "none"}), &json!({"customer_id": "C1"}), SECRET);
    let err = verifier.verify(&jwt).await.expect_err("alg none");
    assert!(matches!(err, AuthError::Malformed { .. }));
}

#[rstest]
#[case("Bearer ", AuthError::MissingToken)]
#[case("", AuthError::MissingToken)]
#[tokio::test]
async fn rejects_blank_headers(
    verifier: Hs256TokenVerifier,
    #[case] header: &str,
    #[case] expected: AuthError,
) {
    assert_eq!(verifier.verify(header).await, Err(expected));
}

#[rstest]
#[case("only.two")]
#[case("a.b.c.d")]
#[case("!!.??.##")]
#[tokio::test]
async fn rejects_malformed_tokens(verifier: Hs256TokenVerifier, #[case] raw: &str) {
    let err = verifier.verify(raw).await.expect_err("malformed");
    assert!(matches!(err, AuthError::Malformed { .. }));
}

#[rstest]
#[tokio::test]
async fn requires_a_customer_claim(verifier: Hs256TokenVerifier) {
    let jwt = token(json!({"sub": "user-1", "customer_id": ""}));
    assert_eq!(verifier.verify(&jwt).await, Err(AuthError::MissingCustomer));
}
