use axum::extract::State;
use axum::Json;

use recetario_core::Category;

use crate::error::{ApiError, ErrorBody};
use crate::AppState;

/// List every category, ordered by name.
#[utoipa::path(get, path = "/api/categories", tag = "Categories",
    responses(
        (status = 200, description = "All categories", body = [Category]),
        (status = 500, description = "Storage failure", body = ErrorBody),
    ))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.catalogue.categories().await?))
}
