/// Ingredient endpoints (public, read-only)
///
/// ```text
/// GET /api/ingredients?name=<prefix>
/// GET /api/ingredients/:id
/// ```
///
/// `name` is a case-insensitive prefix match, used by ingredient pickers.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use recipebook_shared::models::ingredient::Ingredient;
use serde::Deserialize;

/// Ingredient search parameters
#[derive(Debug, Deserialize)]
pub struct IngredientQuery {
    /// Name prefix
    pub name: Option<String>,
}

/// Lists ingredients, optionally filtered by name prefix
pub async fn list_ingredients(
    State(state): State<AppState>,
    Query(query): Query<IngredientQuery>,
) -> ApiResult<Json<Vec<Ingredient>>> {
    let ingredients = Ingredient::list(&state.db, query.name.as_deref()).await?;
    Ok(Json(ingredients))
}

/// Gets a single ingredient
pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Ingredient>> {
    let ingredient = Ingredient::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("ingredient {}", id)))?;

    Ok(Json(ingredient))
}
