/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use recipebook_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use recipebook_shared::auth::middleware::{authenticate, AuthError, Viewer};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Secret used to validate bearer tokens
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Page size for list requests without `limit`
    pub fn default_page_size(&self) -> i64 {
        self.config.api.default_page_size
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /health
/// └── /api/
///     ├── /tags                         GET list, GET /:id
///     ├── /ingredients                  GET list (?name=prefix), GET /:id
///     ├── /recipes                      GET list, GET /:id          (optional auth)
///     │   ├── POST /, PATCH /:id, DELETE /:id                      (auth)
///     │   ├── POST|DELETE /:id/favorite                            (auth)
///     │   ├── POST|DELETE /:id/shopping_cart                       (auth)
///     │   └── GET /download_shopping_cart                          (auth)
///     └── /users
///         ├── GET /:id                                             (optional auth)
///         ├── GET /subscriptions                                   (auth)
///         └── POST|DELETE /:id/subscribe                           (auth)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (per router: required or optional)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Reference data (public, no viewer-relative fields)
    let reference_routes = Router::new()
        .route("/tags", get(routes::tags::list_tags))
        .route("/tags/:id", get(routes::tags::get_tag))
        .route("/ingredients", get(routes::ingredients::list_ingredients))
        .route("/ingredients/:id", get(routes::ingredients::get_ingredient));

    // Reads that serve anonymous visitors but personalize for users
    let viewer_routes = Router::new()
        .route("/recipes", get(routes::recipes::list_recipes))
        .route("/recipes/:id", get(routes::recipes::get_recipe))
        .route("/users/:id", get(routes::subscriptions::get_user))
        .layer(middleware::from_fn_with_state(state.clone(), optional_auth_layer));

    // Everything that acts on behalf of a user
    let user_routes = Router::new()
        .route("/recipes", post(routes::recipes::create_recipe))
        .route(
            "/recipes/:id",
            axum::routing::patch(routes::recipes::update_recipe).delete(routes::recipes::delete_recipe),
        )
        .route(
            "/recipes/:id/favorite",
            post(routes::recipe_lists::add_favorite).delete(routes::recipe_lists::remove_favorite),
        )
        .route(
            "/recipes/:id/shopping_cart",
            post(routes::recipe_lists::add_to_cart).delete(routes::recipe_lists::remove_from_cart),
        )
        .route(
            "/recipes/download_shopping_cart",
            get(routes::shopping_list::download_shopping_cart),
        )
        .route("/users/subscriptions", get(routes::subscriptions::list_subscriptions))
        .route(
            "/users/:id/subscribe",
            post(routes::subscriptions::subscribe).delete(routes::subscriptions::unsubscribe),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth_layer));

    let api_routes = Router::new()
        .merge(reference_routes)
        .merge(viewer_routes)
        .merge(user_routes);

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        // Development mode: permissive CORS
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Requires a valid bearer token and injects `AuthContext`
async fn require_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth = authenticate(req.headers(), state.jwt_secret())?.ok_or(AuthError::MissingCredentials)?;

    req.extensions_mut().insert(auth);
    Ok(next.run(req).await)
}

/// Injects a `Viewer`; anonymous when no `Authorization` header is sent
async fn optional_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let viewer = Viewer(authenticate(req.headers(), state.jwt_secret())?);

    req.extensions_mut().insert(viewer);
    Ok(next.run(req).await)
}
