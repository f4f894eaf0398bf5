/// JWT validation for identities issued by the external identity provider
///
/// The identity provider signs HS256 tokens with a secret shared with this
/// service. We only need to validate them and read the user ID and role;
/// [`create_token`] exists for provisioning tools and tests.
///
/// # Claims
///
/// - `sub`: user ID (decimal string)
/// - `role`: `user` or `admin`
/// - `iss`: always `"recipebook"`
/// - `iat`, `nbf`, `exp`: Unix timestamps
///
/// # Example
///
/// ```
/// use recipebook_shared::auth::jwt::{create_token, validate_token, Claims};
/// use recipebook_shared::models::user::UserRole;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(42, UserRole::User);
/// let token = create_token(&claims, "your-secret-key-at-least-32-bytes")?;
///
/// let validated = validate_token(&token, "your-secret-key-at-least-32-bytes")?;
/// assert_eq!(validated.user_id()?, 42);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::user::UserRole;

/// Issuer expected in every token
pub const ISSUER: &str = "recipebook";

/// Default lifetime of tokens minted by [`Claims::new`]
const DEFAULT_LIFETIME_HOURS: i64 = 24;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was issued by someone else
    #[error("Invalid issuer")]
    InvalidIssuer,

    /// `sub` is not a user ID
    #[error("Invalid subject: {0}")]
    InvalidSubject(String),
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user ID as a decimal string
    pub sub: String,

    /// Account role
    pub role: UserRole,

    /// Issuer, always [`ISSUER`]
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims valid for 24 hours
    pub fn new(user_id: i64, role: UserRole) -> Self {
        Self::with_expiration(user_id, role, Duration::hours(DEFAULT_LIFETIME_HOURS))
    }

    /// Creates claims with a custom lifetime
    ///
    /// A negative duration yields an already expired token, which is
    /// useful in tests.
    pub fn with_expiration(user_id: i64, role: UserRole, expires_in: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id.to_string(),
            role,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Parses the subject into a user ID
    pub fn user_id(&self) -> Result<i64, JwtError> {
        self.sub
            .parse::<i64>()
            .map_err(|_| JwtError::InvalidSubject(self.sub.clone()))
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims with HS256
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a token and returns its claims
///
/// Checks signature, expiration, not-before and issuer.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
