/// User cards and author subscriptions
///
/// ```text
/// GET    /api/users/:id                  author card (optional auth)
/// GET    /api/users/subscriptions        followed authors (?page&limit&recipes_limit)
/// POST   /api/users/:id/subscribe        201 + card (?recipes_limit)
/// DELETE /api/users/:id/subscribe        204
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use recipebook_shared::{
    auth::middleware::{AuthContext, Viewer},
    models::{
        subscription::{self, SubscriptionCard},
        user::{AuthorProfile, User},
    },
    pagination::{PageRequest, Paginated},
};
use serde::Deserialize;

/// Query parameters of the subscription endpoints
#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,

    /// Cap on recipes embedded per author card
    pub recipes_limit: Option<i64>,
}

/// Gets a user's public card
pub async fn get_user(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<i64>,
) -> ApiResult<Json<AuthorProfile>> {
    let profile = User::find_profile(&state.db, id, viewer.user_id())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {}", id)))?;

    Ok(Json(profile))
}

/// Lists the authors the caller follows, ordered by username
pub async fn list_subscriptions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<SubscriptionQuery>,
) -> ApiResult<Json<Paginated<SubscriptionCard>>> {
    let page = PageRequest::new(query.page, query.limit, state.default_page_size());
    let cards = subscription::list(&state.db, auth.user_id, page, query.recipes_limit).await?;

    Ok(Json(cards))
}

/// Follows an author
pub async fn subscribe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(author_id): Path<i64>,
    Query(query): Query<SubscriptionQuery>,
) -> ApiResult<(StatusCode, Json<SubscriptionCard>)> {
    let card = subscription::subscribe(&state.db, auth.user_id, author_id, query.recipes_limit).await?;
    Ok((StatusCode::CREATED, Json(card)))
}

/// Unfollows an author
pub async fn unsubscribe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(author_id): Path<i64>,
) -> ApiResult<StatusCode> {
    subscription::unsubscribe(&state.db, auth.user_id, author_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
