/// User model and database operations
///
/// Accounts are provisioned by the external identity provider. This service
/// reads them to resolve recipe authors and subscription targets, and keeps
/// a `role` column for the "author or administrator" check.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('user', 'admin');
///
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     email VARCHAR(254) NOT NULL UNIQUE,
///     username VARCHAR(150) NOT NULL UNIQUE,
///     first_name VARCHAR(150) NOT NULL,
///     last_name VARCHAR(150) NOT NULL,
///     role user_role NOT NULL DEFAULT 'user',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular authenticated user
    User,

    /// Administrator: may edit or delete any recipe
    Admin,
}

impl UserRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    /// Whether this role bypasses ownership checks
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Email address, unique across users
    pub email: String,

    /// Login name, unique across users
    pub username: String,

    pub first_name: String,

    pub last_name: String,

    /// Account role
    pub role: UserRole,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for provisioning a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,

    /// Defaults to `UserRole::User`
    #[serde(default = "default_role")]
    pub role: UserRole,
}

fn default_role() -> UserRole {
    UserRole::User
}

/// Public author card, relative to a viewer
///
/// `is_subscribed` is false for anonymous viewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuthorProfile {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl User {
    /// Inserts a user row
    ///
    /// # Errors
    ///
    /// Returns an error if the email or username is taken or the database
    /// operation fails
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, username, first_name, last_name, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, username, first_name, last_name, role, created_at
            "#,
        )
        .bind(data.email)
        .bind(data.username)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        tracing::info!(user_id = user.id, username = %user.username, "User provisioned");
        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, first_name, last_name, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Checks whether a user exists
    pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await?;

        Ok(exists)
    }

    /// Loads a user's public card as seen by `viewer`
    pub async fn find_profile(
        pool: &PgPool,
        id: i64,
        viewer: Option<i64>,
    ) -> Result<Option<AuthorProfile>, sqlx::Error> {
        let profile = sqlx::query_as::<_, AuthorProfile>(
            r#"
            SELECT u.id, u.email, u.username, u.first_name, u.last_name,
                   EXISTS(
                       SELECT 1 FROM subscriptions s
                       WHERE s.author_id = u.id AND s.subscriber_id = $2
                   ) AS is_subscribed
            FROM users u
            WHERE u.id = $1
            "#,
        )
        .bind(id)
        .bind(viewer)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }

    /// Deletes a user
    ///
    /// Cascades to the user's recipes, favorites, cart and subscriptions.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
