/// Request identity for Axum handlers
///
/// The identity provider is external: requests carry an
/// `Authorization: Bearer <jwt>` header which we validate here. After
/// validation the router's middleware inserts into request extensions:
///
/// - `AuthContext` on routes that require a user
/// - `Viewer` on routes that also serve anonymous visitors
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use recipebook_shared::auth::middleware::{AuthContext, Viewer};
///
/// async fn me(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
///
/// async fn page(Extension(viewer): Extension<Viewer>) -> String {
///     match viewer.user_id() {
///         Some(id) => format!("Hello, {}", id),
///         None => "Hello, stranger".to_string(),
///     }
/// }
/// ```

use axum::{
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::jwt::{validate_token, JwtError};
use crate::models::user::UserRole;

/// Authenticated user of the current request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: i64,

    /// Role claimed by the token
    pub role: UserRole,
}

impl AuthContext {
    pub fn new(user_id: i64, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// Administrators may act on any recipe
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// The requester of a public route: a user or an anonymous visitor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewer(pub Option<AuthContext>);

impl Viewer {
    /// User ID, or `None` for anonymous visitors
    pub fn user_id(&self) -> Option<i64> {
        self.0.map(|auth| auth.user_id)
    }
}

/// Error type for request authentication
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
            JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
            other => AuthError::InvalidToken(format!("Invalid token: {}", other)),
        }
    }
}

/// Resolves the identity carried by the request headers
///
/// Returns `Ok(None)` when there is no `Authorization` header at all, so the
/// caller decides whether anonymous access is allowed. A header that is
/// present but malformed or invalid is always an error.
pub fn authenticate(headers: &HeaderMap, secret: &str) -> Result<Option<AuthContext>, AuthError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AuthError::InvalidFormat("Authorization header is not valid ASCII".to_string()))?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    let claims = validate_token(token, secret)?;
    let user_id = claims.user_id()?;

    Ok(Some(AuthContext::new(user_id, claims.role)))
}
