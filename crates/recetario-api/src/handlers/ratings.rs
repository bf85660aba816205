//! Recipe ratings.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use recetario_core::{RatingOutcome, RatingSummary};

use crate::auth::RequireCaller;
use crate::error::{ApiError, ErrorBody};
use crate::AppState;

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct RateRecipeRequest {
    /// Integer score from 1 to 5.
    pub score: i64,
    #[serde(default)]
    pub comment: Option<String>,
}

#[utoipa::path(get, path = "/api/recipes/{id}/ratings", tag = "Ratings",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Ratings, newest first", body = [RatingSummary]),
        (status = 404, description = "No such recipe", body = ErrorBody),
    ))]
pub async fn list_ratings(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<RatingSummary>>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.catalogue.ratings(id).await?))
}

/// Create or replace the caller's rating of a recipe.
///
/// Responds 201 for a first rating and 200 when an existing one is replaced.
#[utoipa::path(post, path = "/api/recipes/{id}/ratings", tag = "Ratings",
    params(("id" = Uuid, Path, description = "Recipe id")),
    request_body = RateRecipeRequest,
    responses(
        (status = 201, description = "Rating created", body = RatingOutcome),
        (status = 200, description = "Rating replaced", body = RatingOutcome),
        (status = 400, description = "Invalid score or comment", body = ErrorBody),
        (status = 401, description = "No caller identity", body = ErrorBody),
        (status = 403, description = "Authors cannot rate their own recipes", body = ErrorBody),
        (status = 404, description = "No such recipe", body = ErrorBody),
    ))]
pub async fn rate_recipe(
    State(state): State<AppState>,
    RequireCaller(caller): RequireCaller,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<RateRecipeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RatingOutcome>), ApiError> {
    let Path(recipe_id) = id?;
    let Json(req) = payload?;

    let rated = state
        .ratings
        .rate(recipe_id, caller, req.score, req.comment)
        .await?;
    let status = if rated.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(rated.outcome)))
}
