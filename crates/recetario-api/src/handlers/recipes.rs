//! Recipe search, lookup and publishing.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use recetario_core::{
    CreateRecipeRequest, PageRequest, Paginated, RawSearchParams, RecipeResultsPage,
    RecipeSummary, SearchFilters,
};

use crate::auth::{Caller, RequireCaller};
use crate::error::{ApiError, ErrorBody};
use crate::AppState;

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreatedRecipe {
    pub id: Uuid,
}

/// Search recipes. Every parameter is optional; malformed values are
/// treated as absent. Categories may repeat (`categorias=a&categorias=b`)
/// or use the bracket form (`categorias[]=a`).
#[utoipa::path(get, path = "/api/recipes/search", tag = "Recipes",
    params(RawSearchParams),
    responses(
        (status = 200, description = "One page of matching recipes, newest first", body = RecipeResultsPage),
        (status = 400, description = "Unreadable query string", body = ErrorBody),
        (status = 500, description = "Storage failure, retryable", body = ErrorBody),
    ))]
pub async fn search_recipes(
    State(state): State<AppState>,
    Caller(caller): Caller,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Paginated<RecipeSummary>>, ApiError> {
    let Query(pairs) = params.map_err(|rejection| {
        debug!(error = %rejection.body_text(), "Unreadable search query string");
        ApiError::BadRequest(rejection.body_text())
    })?;
    let raw = RawSearchParams::from_pairs(pairs);
    let filters = SearchFilters::from_raw(&raw);
    let page = PageRequest::from_raw(raw.page.as_deref(), raw.limit.as_deref());

    let results = state.search.search(&filters, page, caller).await?;
    Ok(Json(results))
}

#[utoipa::path(get, path = "/api/recipes/latest", tag = "Recipes",
    responses(
        (status = 200, description = "The most recent recipes", body = [RecipeSummary]),
        (status = 500, description = "Storage failure, retryable", body = ErrorBody),
    ))]
pub async fn latest_recipes(
    State(state): State<AppState>,
    Caller(caller): Caller,
) -> Result<Json<Vec<RecipeSummary>>, ApiError> {
    Ok(Json(state.catalogue.latest(caller).await?))
}

#[utoipa::path(get, path = "/api/recipes/{id}", tag = "Recipes",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "The recipe", body = RecipeSummary),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "No such recipe", body = ErrorBody),
    ))]
pub async fn get_recipe(
    State(state): State<AppState>,
    Caller(caller): Caller,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<RecipeSummary>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.catalogue.get(id, caller).await?))
}

#[utoipa::path(post, path = "/api/recipes", tag = "Recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe published", body = CreatedRecipe),
        (status = 400, description = "Invalid recipe", body = ErrorBody),
        (status = 401, description = "No caller identity", body = ErrorBody),
    ))]
pub async fn create_recipe(
    State(state): State<AppState>,
    RequireCaller(author): RequireCaller,
    payload: Result<Json<CreateRecipeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedRecipe>), ApiError> {
    let Json(req) = payload?;
    let id = state.catalogue.publish(author, req).await?;
    Ok((StatusCode::CREATED, Json(CreatedRecipe { id })))
}
