/// Domain error type shared by the composer, aggregator and join-table models
///
/// Every variant except `Database` is a client error: the API layer turns
/// them into 4xx responses. `Database` carries unexpected persistence
/// failures and becomes a 500.
///
/// # Example
///
/// ```
/// use recipebook_shared::error::DomainError;
///
/// let err = DomainError::invalid("cooking_time", "Cooking time must be at least 1");
/// assert!(matches!(err, DomainError::Validation(_)));
/// ```

use serde::{Deserialize, Serialize};

/// Result alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// A single rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Field that failed validation (e.g. `ingredients`)
    pub field: String,

    /// Human-readable reason
    pub message: String,
}

/// Errors raised by domain operations
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// Input has the wrong shape or values
    #[error("Validation failed: {} errors", .0.len())]
    Validation(Vec<FieldViolation>),

    /// A referenced tag, ingredient, recipe or user does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate favorite, cart entry or subscription, or a self-subscription
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Shopping list requested with nothing in the cart
    #[error("Shopping cart is empty")]
    EmptyCart,

    /// Unexpected persistence failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl DomainError {
    /// Builds a validation error for a single field
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::Validation(vec![FieldViolation {
            field: field.into(),
            message: message.into(),
        }])
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut violations: Vec<FieldViolation> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldViolation {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        // field_errors() is a HashMap; keep the output stable
        violations.sort_by(|a, b| a.field.cmp(&b.field));
        DomainError::Validation(violations)
    }
}

/// Returns true if the error is a unique-constraint violation
///
/// Used to turn the loser of a concurrent duplicate insert into a
/// `DomainError::Conflict` instead of a 500.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// Returns true if the error is a CHECK-constraint violation
pub fn is_check_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_check_violation(),
        _ => false,
    }
}

/// Returns true if the error is a foreign-key violation
///
/// Inserting a join row for a recipe or user deleted concurrently fails
/// this way; callers report it as `DomainError::NotFound`.
pub fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_foreign_key_violation(),
        _ => false,
    }
}
