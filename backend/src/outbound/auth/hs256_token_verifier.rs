//! HS256 JWT verification against a shared secret.
//!
//! Only the compact serialisation with `alg: HS256` is accepted. The `exp`
//! claim is enforced when present; `nbf`, `aud` and `iss` are not checked.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use mockable::Clock;
use serde::Deserialize;
use serde_json::Value;
use sha2::Sha256;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::CustomerId;
use crate::domain::ports::{AuthError, CustomerClaims, TokenVerifier, bearer_token};

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Deserialize)]
struct JoseHeader {
    alg: String,
}

#[derive(Debug, Default, Deserialize)]
struct Claims {
    exp: Option<i64>,
    customer_id: Option<Value>,
    cust_id: Option<Value>,
    #[serde(rename = "customerName")]
    customer_name: Option<String>,
    cust_name: Option<String>,
}

/// Verifies bearer tokens signed with HMAC-SHA256.
pub struct Hs256TokenVerifier {
    secret: Zeroizing<Vec<u8>>,
    clock: Arc<dyn Clock>,
}

impl Hs256TokenVerifier {
    pub fn new(secret: Zeroizing<Vec<u8>>, clock: Arc<dyn Clock>) -> Self {
        Self { secret, clock }
    }

    fn mac(&self) -> Result<HmacSha256, AuthError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|err| AuthError::malformed(err.to_string()))
    }
}

fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>, AuthError> {
    URL_SAFE_NO_PAD
        .decode(segment.trim_end_matches('='))
        .map_err(|err| AuthError::malformed(format!("{name} is not base64url: {err}")))
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_owned()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[async_trait]
impl TokenVerifier for Hs256TokenVerifier {
    async fn verify(&self, authorization: &str) -> Result<CustomerClaims, AuthError> {
        let token = bearer_token(authorization);
        if token.is_empty() {
            return Err(AuthError::missing_token());
        }

        let mut segments = token.split('.');
        let (Some(header), Some(payload), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AuthError::malformed("expected three dot-separated segments"));
        };

        let jose: JoseHeader = serde_json::from_slice(&decode_segment(header, "header")?)
            .map_err(|err| AuthError::malformed(format!("header: {err}")))?;
        if jose.alg != "HS256" {
            return Err(AuthError::malformed(format!(
                "unsupported algorithm {}",
                jose.alg
            )));
        }

        let signature = decode_segment(signature, "signature")?;
        let mut mac = self.mac()?;
        mac.update(header.as_bytes());
        mac.update(b".");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::invalid_signature())?;

        let claims: Claims = serde_json::from_slice(&decode_segment(payload, "payload")?)
            .map_err(|err| AuthError::malformed(format!("payload: {err}")))?;

        if let Some(exp) = claims.exp {
            let now = self.clock.utc().timestamp();
            if now >= exp {
                debug!(exp, now, "rejecting expired token");
                return Err(AuthError::expired());
            }
        }

        let raw_id = claims
            .customer_id
            .as_ref()
            .and_then(id_text)
            .or_else(|| claims.cust_id.as_ref().and_then(id_text))
            .ok_or_else(AuthError::missing_customer)?;
        let customer_id =
            CustomerId::new(raw_id).map_err(|err| AuthError::malformed(err.to_string()))?;

        Ok(CustomerClaims {
            customer_id,
            customer_name: claims.customer_name.or(claims.cust_name),
        })
    }
}

#[cfg(test)]
#[path = "hs256_token_verifier_tests.rs"]
mod tests;
