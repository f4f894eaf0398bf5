//! Common test utilities for API integration tests
//!
//! These tests require a running PostgreSQL database and the usual
//! environment (`DATABASE_URL`, `JWT_SECRET`).
//!
//! - Test database setup (migrations)
//! - Test user, tag and ingredient creation
//! - JWT token generation
//! - Request helpers

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use recipebook_api::app::{build_router, AppState};
use recipebook_api::config::Config;
use recipebook_shared::auth::jwt::{create_token, Claims};
use recipebook_shared::db::migrations::run_migrations;
use recipebook_shared::models::ingredient::{CreateIngredient, Ingredient};
use recipebook_shared::models::tag::{CreateTag, Tag};
use recipebook_shared::models::user::{CreateUser, User, UserRole};
use serde_json::Value;
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub jwt_token: String,
}

/// A response with its body already read
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!(
                "Response is not JSON ({}): {}",
                e,
                String::from_utf8_lossy(&self.body)
            )
        })
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

impl TestContext {
    /// Creates a new test context with a fresh user
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;
        run_migrations(&db).await?;

        let user = create_user(&db, UserRole::User).await?;
        let jwt_token = token_for(&config, &user)?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            jwt_token,
        })
    }

    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.jwt_token)
    }

    /// Creates another user and a token for them
    pub async fn other_user(&self, role: UserRole) -> anyhow::Result<(User, String)> {
        let user = create_user(&self.db, role).await?;
        let token = token_for(&self.config, &user)?;
        Ok((user, token))
    }

    /// Sends a request through the router
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Sends a request as the context's user
    pub async fn send_as_user(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        self.send(method, uri, Some(&self.jwt_token), body).await
    }

    /// Cleans up test data (recipes and list rows cascade)
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        User::delete(&self.db, self.user.id).await?;
        Ok(())
    }
}

pub fn token_for(config: &Config, user: &User) -> anyhow::Result<String> {
    Ok(create_token(&Claims::new(user.id, user.role), &config.jwt.secret)?)
}

pub async fn create_user(db: &PgPool, role: UserRole) -> anyhow::Result<User> {
    let suffix = Uuid::new_v4().simple().to_string();

    Ok(User::create(
        db,
        CreateUser {
            email: format!("test-{}@example.com", suffix),
            username: format!("user_{}", suffix),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            role,
        },
    )
    .await?)
}

pub async fn create_tag(db: &PgPool) -> anyhow::Result<Tag> {
    let suffix = Uuid::new_v4().simple().to_string();

    Ok(Tag::create(
        db,
        CreateTag {
            name: format!("Tag {}", suffix),
            color: format!("#{}", &suffix[..6]),
            slug: format!("tag-{}", suffix),
        },
    )
    .await?)
}

pub async fn create_ingredient(db: &PgPool, name: &str, unit: &str) -> anyhow::Result<Ingredient> {
    Ok(Ingredient::create(
        db,
        CreateIngredient {
            name: format!("{} {}", name, Uuid::new_v4().simple()),
            measurement_unit: unit.to_string(),
        },
    )
    .await?)
}
