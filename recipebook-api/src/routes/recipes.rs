/// Recipe endpoints
///
/// ```text
/// GET    /api/recipes          list (optional auth)
/// GET    /api/recipes/:id      detail (optional auth)
/// POST   /api/recipes          create (auth)
/// PATCH  /api/recipes/:id      recompose (author or admin)
/// DELETE /api/recipes/:id      delete (author or admin)
/// ```
///
/// # List filters
///
/// - `author=<user id>`
/// - `tags=slug1,slug2`: recipes with any of these tags
/// - `is_favorited=1`, `is_in_shopping_cart=1`: the viewer's lists; ignored
///   for anonymous viewers
/// - `page`, `limit`

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use recipebook_shared::{
    auth::{
        authorization::require_author_or_admin,
        middleware::{AuthContext, Viewer},
    },
    composer::{self, RecipeInput},
    models::recipe::{Recipe, RecipeDetail, RecipeFilter},
    pagination::{PageRequest, Paginated},
};
use serde::Deserialize;

/// Recipe list query parameters
#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    pub page: Option<i64>,

    pub limit: Option<i64>,

    pub author: Option<i64>,

    /// Comma-separated tag slugs
    pub tags: Option<String>,

    pub is_favorited: Option<String>,

    pub is_in_shopping_cart: Option<String>,
}

/// Interprets `1`/`true` as set; anything else as unset
fn parse_flag(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1") | Some("true")
    )
}

impl RecipeListQuery {
    fn filter(&self) -> RecipeFilter {
        RecipeFilter {
            author: self.author,
            tags: self
                .tags
                .as_deref()
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|slug| !slug.is_empty())
                .map(str::to_string)
                .collect(),
            is_favorited: parse_flag(self.is_favorited.as_deref()),
            is_in_shopping_cart: parse_flag(self.is_in_shopping_cart.as_deref()),
        }
    }
}

/// Loads the recipe as `viewer` sees it, or 404
async fn detail(state: &AppState, id: i64, viewer: Option<i64>) -> ApiResult<RecipeDetail> {
    Recipe::find_detailed(&state.db, id, viewer)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("recipe {}", id)))
}

/// Lists recipes newest first
pub async fn list_recipes(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Query(query): Query<RecipeListQuery>,
) -> ApiResult<Json<Paginated<RecipeDetail>>> {
    let page = PageRequest::new(query.page, query.limit, state.default_page_size());
    let filter = query.filter();

    let recipes = Recipe::list_detailed(&state.db, viewer.user_id(), &filter, page).await?;
    Ok(Json(recipes))
}

/// Gets a single recipe
pub async fn get_recipe(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<i64>,
) -> ApiResult<Json<RecipeDetail>> {
    Ok(Json(detail(&state, id, viewer.user_id()).await?))
}

/// Creates a recipe authored by the caller
pub async fn create_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<RecipeInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RecipeDetail>)> {
    let Json(input) = payload?;
    let validated = composer::validate(&state.db, input).await?;
    let recipe = composer::create(&state.db, &validated, auth.user_id).await?;

    let detail = detail(&state, recipe.id, Some(auth.user_id)).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// Replaces a recipe's fields, tags and ingredient lines
pub async fn update_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    payload: Result<Json<RecipeInput>, JsonRejection>,
) -> ApiResult<Json<RecipeDetail>> {
    let Json(input) = payload?;
    let recipe = Recipe::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("recipe {}", id)))?;
    require_author_or_admin(&auth, recipe.author_id)?;

    let validated = composer::validate(&state.db, input).await?;
    composer::update(&state.db, id, &validated).await?;

    Ok(Json(detail(&state, id, Some(auth.user_id)).await?))
}

/// Deletes a recipe
pub async fn delete_recipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let recipe = Recipe::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("recipe {}", id)))?;
    require_author_or_admin(&auth, recipe.author_id)?;

    composer::delete(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
