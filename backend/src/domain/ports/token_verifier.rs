//! Port for verifying bearer tokens on incoming requests.

use async_trait::async_trait;

use crate::domain::CustomerId;

use super::define_port_error;

define_port_error! {
    /// Reasons a token is refused.
    pub enum AuthError {
        /// No `Authorization` header was sent.
        MissingToken => Unauthorized: "authorization token is missing",
        /// The token is not a well-formed JWT.
        Malformed { message: String } => Unauthorized: "malformed token: {message}",
        /// The signature does not match the configured secret.
        InvalidSignature => Unauthorized: "token signature is invalid",
        /// The `exp` claim lies in the past.
        Expired => Unauthorized: "token has expired",
        /// Neither `customer_id` nor `cust_id` is present.
        MissingCustomer => Unauthorized: "token carries no customer id",
    }
}

/// Identity extracted from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerClaims {
    pub customer_id: CustomerId,
    pub customer_name: Option<String>,
}

/// Strip an optional `Bearer ` scheme prefix from an authorization header.
///
/// # Examples
/// ```
/// use switchgear_pm::domain::ports::bearer_token;
///
/// assert_eq!(bearer_token("Bearer abc"), "abc");
/// assert_eq!(bearer_token("abc"), "abc");
/// ```
pub fn bearer_token(header: &str) -> &str {
    let trimmed = header.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        None if trimmed.eq_ignore_ascii_case("bearer") => "",
        _ => trimmed,
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify the raw `Authorization` header value.
    ///
    /// Accepts `Bearer <jwt>` or the bare token.
    async fn verify(&self, authorization: &str) -> Result<CustomerClaims, AuthError>;
}

/// Verifier that trusts the token text as the customer id.
///
/// Only used in tests and local runs without a configured secret.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureTokenVerifier;

#[async_trait]
impl TokenVerifier for FixtureTokenVerifier {
    async fn verify(&self, authorization: &str) -> Result<CustomerClaims, AuthError> {
        let token = bearer_token(authorization);
        if token.is_empty() {
            return Err(AuthError::missing_token());
        }
        let customer_id =
            CustomerId::new(token).map_err(|err| AuthError::malformed(err.to_string()))?;
        Ok(CustomerClaims {
            customer_id,
            customer_name: None,
        })
    }
}
