/// Shopping list download
///
/// ```text
/// GET /api/recipes/download_shopping_cart
/// ```
///
/// Returns the aggregated list as a plain-text attachment, one
/// `"<name>: <sum> <unit>"` line per ingredient. An empty cart is a 400.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Extension,
};
use recipebook_shared::{auth::middleware::AuthContext, shopping_list};

pub async fn download_shopping_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Response> {
    let text = shopping_list::export(&state.db, auth.user_id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", shopping_list::FILENAME),
            ),
        ],
        text,
    )
        .into_response())
}
