/// Tag endpoints (public, read-only)
///
/// ```text
/// GET /api/tags
/// GET /api/tags/:id
/// ```

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Json,
};
use recipebook_shared::models::tag::Tag;

/// Lists all tags ordered by name
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<Tag>>> {
    let tags = Tag::list(&state.db).await?;
    Ok(Json(tags))
}

/// Gets a single tag
pub async fn get_tag(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Tag>> {
    let tag = Tag::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("tag {}", id)))?;

    Ok(Json(tag))
}
