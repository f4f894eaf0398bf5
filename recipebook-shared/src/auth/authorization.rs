/// Authorization checks for recipe mutations
///
/// Recipes may be updated or deleted only by their author or by an
/// administrator. The composer does not enforce this itself; it exposes
/// `Recipe::author_id` and handlers call [`require_author_or_admin`] first.
///
/// # Example
///
/// ```
/// use recipebook_shared::auth::authorization::require_author_or_admin;
/// use recipebook_shared::auth::middleware::AuthContext;
/// use recipebook_shared::models::user::UserRole;
///
/// let author = AuthContext::new(1, UserRole::User);
/// assert!(require_author_or_admin(&author, 1).is_ok());
/// assert!(require_author_or_admin(&author, 2).is_err());
/// ```

use super::middleware::AuthContext;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// User is neither the author nor an administrator
    #[error("Only the author or an administrator may modify this recipe")]
    NotAuthorOrAdmin,
}

/// Allows the resource's author and administrators
pub fn require_author_or_admin(auth: &AuthContext, author_id: i64) -> Result<(), AuthzError> {
    if auth.user_id == author_id || auth.is_admin() {
        return Ok(());
    }

    tracing::debug!(
        user_id = auth.user_id,
        author_id,
        "Rejected recipe mutation by non-author"
    );
    Err(AuthzError::NotAuthorOrAdmin)
}
