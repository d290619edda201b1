//! OpenAPI schema definitions for domain types.
//!
//! The error payload is documented through wrappers registered under the
//! domain type names, so handler annotations can reference `ErrorSchema`
//! without the domain depending on the HTTP documentation layout.

use serde::Serialize;
use utoipa::ToSchema;

/// Bare acknowledgement returned by several mutations.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponseBody {
    pub message: String,
}

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The requested customer document or node does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// Duplicate breaker name or a stale document revision.
    #[schema(rename = "conflict")]
    Conflict,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Something went wrong")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "00000000-0000-0000-0000-000000000000")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::PartialSchema;

    fn schema_to_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[test]
    fn error_code_schema_has_expected_name() {
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        let name = ErrorCodeSchema::name();
        // utoipa replaces :: with . in schema names
        assert_eq!(name, "crate.domain.ErrorCode");
        assert!(
            schema_json.contains("invalid_request"),
            "schema should contain error code variants"
        );
    }

    #[test]
    fn error_schema_has_expected_name() {
        let schema_json = schema_to_json::<ErrorSchema>();
        let name = ErrorSchema::name();
        // utoipa replaces :: with . in schema names
        assert_eq!(name, "crate.domain.Error");
        assert!(
            schema_json.contains("message"),
            "schema should contain message field"
        );
        assert!(
            schema_json.contains("traceId"),
            "schema should contain traceId field"
        );
    }

    #[test]
    fn error_code_schema_variants_match_domain() {
        // Verify the schema contains all expected error code variants
        let schema_json = schema_to_json::<ErrorCodeSchema>();
        assert!(
            schema_json.contains("invalid_request"),
            "missing invalid_request"
        );
        assert!(schema_json.contains("unauthorized"), "missing unauthorized");
        assert!(schema_json.contains("not_found"), "missing not_found");
        assert!(schema_json.contains("conflict"), "missing conflict");
        assert!(!schema_json.contains("forbidden"), "forbidden is never returned");
        assert!(
            !schema_json.contains("service_unavailable"),
            "service_unavailable is never returned"
        );
        assert!(
            schema_json.contains("internal_error"),
            "missing internal_error"
        );
    }
}
