/// Error handling for the API server
///
/// All handlers return `ApiResult<T>`; errors convert into a JSON body:
///
/// ```json
/// { "error": "conflict", "message": "recipe 3 is already in favorites" }
/// ```
///
/// Validation failures add a `details` array of `{field, message}`.
///
/// # Example
///
/// ```
/// use recipebook_api::error::ApiResult;
/// use axum::Json;
/// use serde_json::{json, Value};
///
/// async fn handler() -> ApiResult<Json<Value>> {
///     Ok(Json(json!({ "ok": true })))
/// }
/// ```

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use recipebook_shared::auth::{authorization::AuthzError, middleware::AuthError};
use recipebook_shared::error::{DomainError, FieldViolation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403): not the recipe's author or an administrator
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409): duplicate favorite, cart entry or subscription
    Conflict(String),

    /// Unprocessable entity (422)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl From<FieldViolation> for ValidationErrorDetail {
    fn from(violation: FieldViolation) -> Self {
        Self {
            field: violation.field,
            message: violation.message,
        }
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "not_found", "empty_cart")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Validation errors, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert domain errors to API errors
impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(violations) => {
                ApiError::ValidationError(violations.into_iter().map(Into::into).collect())
            }
            DomainError::NotFound(what) => ApiError::NotFound(what),
            DomainError::Conflict(msg) => ApiError::Conflict(msg),
            DomainError::EmptyCart => ApiError::BadRequest("Shopping cart is empty".to_string()),
            DomainError::Database(err) => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            other => ApiError::InternalError(format!("Database error: {}", other)),
        }
    }
}

/// Convert JSON body rejections to API errors
///
/// A body that parses but has the wrong field types is a validation error;
/// anything else (bad syntax, wrong content type) is a bad request.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "body".to_string(),
                message: err.body_text(),
            }]),
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

/// Convert auth errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => ApiError::Unauthorized("Missing credentials".to_string()),
            AuthError::InvalidFormat(msg) => ApiError::BadRequest(msg),
            AuthError::InvalidToken(msg) => ApiError::Unauthorized(msg),
        }
    }
}

/// Convert authorization errors to API errors
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::NotAuthorOrAdmin => ApiError::Forbidden(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("recipe 1".to_string());
        assert_eq!(err.to_string(), "Not found: recipe 1");
    }

    #[test]
    fn test_domain_error_status_codes() {
        let cases = vec![
            (DomainError::invalid("cooking_time", "too small"), StatusCode::UNPROCESSABLE_ENTITY),
            (DomainError::NotFound("tag 9".to_string()), StatusCode::NOT_FOUND),
            (DomainError::Conflict("already added".to_string()), StatusCode::CONFLICT),
            (DomainError::EmptyCart, StatusCode::BAD_REQUEST),
            (DomainError::Database(sqlx::Error::PoolTimedOut), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[test]
    fn test_validation_details_are_kept() {
        let err = ApiError::from(DomainError::invalid("ingredients", "duplicate ingredient"));
        match err {
            ApiError::ValidationError(details) => {
                assert_eq!(
                    details,
                    vec![ValidationErrorDetail {
                        field: "ingredients".to_string(),
                        message: "duplicate ingredient".to_string(),
                    }]
                );
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_authz_error_is_forbidden() {
        let response = ApiError::from(AuthzError::NotAuthorOrAdmin).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_missing_credentials_is_unauthorized() {
        let response = ApiError::from(AuthError::MissingCredentials).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
