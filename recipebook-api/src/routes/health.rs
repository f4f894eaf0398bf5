/// Health check endpoint
///
/// ```text
/// GET /health
/// ```
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "schema_version": 20241019000004,
///   "pool": { "size": 2, "idle": 1, "in_use": 1 }
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use recipebook_shared::db::{
    migrations::schema_version,
    pool::{health_check as ping, pool_stats, PoolStats},
};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    pub status: &'static str,

    /// Application version
    pub version: &'static str,

    /// `connected` or `disconnected`
    pub database: &'static str,

    /// Latest applied migration, when the database answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<i64>,

    pub pool: PoolStats,
}

/// Reports service and database health
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let connected = match ping(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };

    let schema_version = if connected {
        schema_version(&state.db).await.ok().flatten()
    } else {
        None
    };

    Ok(Json(HealthResponse {
        status: if connected { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: if connected { "connected" } else { "disconnected" },
        schema_version,
        pool: pool_stats(&state.db),
    }))
}
