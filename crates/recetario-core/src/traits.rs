//! Repository and collaborator traits for recetario.
//!
//! Storage backends and external directories are injected as trait objects
//! so every component can be exercised against the in-memory backend.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::filter::RecipeQuery;
use crate::models::{Category, CreateRecipeRequest, Rating, RatingWrite, Recipe};
use crate::pagination::PageRequest;
use crate::rating::RatingSubmission;

// =============================================================================
// RECIPE REPOSITORY
// =============================================================================

/// One consistent page of matching recipes plus the total match count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipePage {
    pub recipes: Vec<Recipe>,
    pub total: i64,
}

/// Repository for recipe storage.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Insert a new recipe authored by `author_id`, returning its ID.
    async fn insert(&self, author_id: Uuid, req: CreateRecipeRequest) -> Result<Uuid>;

    /// Fetch a recipe by ID.
    async fn fetch(&self, id: Uuid) -> Result<Option<Recipe>>;

    /// The `limit` most recently created recipes.
    async fn latest(&self, limit: i64) -> Result<Vec<Recipe>>;

    /// Count all matches and fetch one page against the same snapshot,
    /// newest first.
    async fn search_page(&self, query: &RecipeQuery, page: &PageRequest) -> Result<RecipePage>;
}

// =============================================================================
// RATING REPOSITORY
// =============================================================================

/// Repository for ratings and the denormalized recipe average.
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Create or replace the (recipe, author) rating, then recompute and
    /// persist the recipe average from every current score, atomically.
    ///
    /// Returns `Error::RecipeNotFound` when the recipe does not exist.
    async fn upsert_and_recompute(&self, submission: &RatingSubmission) -> Result<RatingWrite>;

    /// All ratings for a recipe, newest first.
    async fn list_for_recipe(&self, recipe_id: Uuid) -> Result<Vec<Rating>>;
}

// =============================================================================
// EXTERNAL DIRECTORIES
// =============================================================================

/// Read access to users owned by the identity service.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// IDs of every user whose display name contains `fragment`,
    /// case-insensitively.
    async fn find_ids_by_name(&self, fragment: &str) -> Result<Vec<Uuid>>;

    /// Display names for the given IDs. Unknown IDs are omitted.
    async fn display_names(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>>;
}

/// Read access to categories.
#[async_trait]
pub trait CategoryDirectory: Send + Sync {
    /// All categories ordered by name.
    async fn list(&self) -> Result<Vec<Category>>;

    /// Names for the given category IDs. Unknown IDs are omitted.
    async fn names_for(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>>;
}

/// Read access to users' favorite recipes.
#[async_trait]
pub trait FavoritesService: Send + Sync {
    /// The subset of `recipe_ids` that `caller` has marked as favorite.
    async fn favorited_among(&self, caller: Uuid, recipe_ids: &[Uuid]) -> Result<HashSet<Uuid>>;
}

// =============================================================================
// BACKEND BUNDLE
// =============================================================================

/// Every storage dependency, wired once at startup and shared by handle.
#[derive(Clone)]
pub struct Backends {
    pub recipes: Arc<dyn RecipeRepository>,
    pub ratings: Arc<dyn RatingRepository>,
    pub users: Arc<dyn UserDirectory>,
    pub categories: Arc<dyn CategoryDirectory>,
    pub favorites: Arc<dyn FavoritesService>,
}
