//! OpenAPI document for the HTTP surface.

use utoipa::OpenApi;

use recetario_core::{
    Category, CreateRecipeRequest, Ingredient, RatingOutcome, RatingSummary, RecipeResultsPage,
    RecipeSummary, Step, Unit,
};

use crate::error::ErrorBody;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "recetario API",
        description = "Recipe search, publishing and rating.",
    ),
    paths(
        handlers::health_check,
        handlers::recipes::search_recipes,
        handlers::recipes::latest_recipes,
        handlers::recipes::get_recipe,
        handlers::recipes::create_recipe,
        handlers::ratings::list_ratings,
        handlers::ratings::rate_recipe,
        handlers::categories::list_categories,
    ),
    components(schemas(
        Category,
        CreateRecipeRequest,
        Ingredient,
        RatingOutcome,
        RatingSummary,
        RecipeResultsPage,
        RecipeSummary,
        Step,
        Unit,
        ErrorBody,
        handlers::recipes::CreatedRecipe,
        handlers::ratings::RateRecipeRequest,
    )),
    tags(
        (name = "System", description = "Health and metadata"),
        (name = "Recipes", description = "Search, lookup and publishing"),
        (name = "Ratings", description = "Per-user ratings and recipe averages"),
        (name = "Categories", description = "Recipe categories"),
    )
)]
pub struct ApiDoc;
