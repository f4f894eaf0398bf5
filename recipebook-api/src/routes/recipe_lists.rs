/// Favorite and shopping cart toggles
///
/// ```text
/// POST   /api/recipes/:id/favorite        201 + compact recipe, 409 if present
/// DELETE /api/recipes/:id/favorite        204, 404 if absent
/// POST   /api/recipes/:id/shopping_cart   201 + compact recipe, 409 if present
/// DELETE /api/recipes/:id/shopping_cart   204, 404 if absent
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use recipebook_shared::{
    auth::middleware::AuthContext,
    models::{recipe::RecipeSummary, recipe_list::RecipeList},
};

async fn add(
    state: &AppState,
    list: RecipeList,
    auth: AuthContext,
    recipe_id: i64,
) -> ApiResult<(StatusCode, Json<RecipeSummary>)> {
    let summary = list.add(&state.db, auth.user_id, recipe_id).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

async fn remove(state: &AppState, list: RecipeList, auth: AuthContext, recipe_id: i64) -> ApiResult<StatusCode> {
    list.remove(&state.db, auth.user_id, recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_favorite(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<(StatusCode, Json<RecipeSummary>)> {
    add(&state, RecipeList::Favorites, auth, id).await
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    remove(&state, RecipeList::Favorites, auth, id).await
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<(StatusCode, Json<RecipeSummary>)> {
    add(&state, RecipeList::ShoppingCart, auth, id).await
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    remove(&state, RecipeList::ShoppingCart, auth, id).await
}
