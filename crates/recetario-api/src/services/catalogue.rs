//! Recipe catalogue: publishing, lookups, and listings.

use std::collections::HashSet;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use recetario_core::defaults::LATEST_RECIPES_LIMIT;
use recetario_core::{
    Backends, Category, CreateRecipeRequest, Error, RatingSummary, RecipeSummary, Result,
};
use recetario_search::{SearchExecutor, UNKNOWN_AUTHOR};

use super::registered_name;

#[derive(Clone)]
pub struct Catalogue {
    backends: Backends,
    search: SearchExecutor,
}

impl Catalogue {
    pub fn new(backends: Backends, search: SearchExecutor) -> Self {
        Self { backends, search }
    }

    /// Validate and store a new recipe. The author must be a registered user
    /// and every referenced category must exist.
    #[instrument(skip(self, req), fields(subsystem = "catalogue", op = "publish", caller_id = %author_id))]
    pub async fn publish(&self, author_id: Uuid, mut req: CreateRecipeRequest) -> Result<Uuid> {
        req.validate()?;
        registered_name(self.backends.users.as_ref(), author_id).await?;

        let mut seen = HashSet::new();
        req.categories.retain(|id| seen.insert(*id));
        if !req.categories.is_empty() {
            let known = self.backends.categories.names_for(&req.categories).await?;
            if let Some(missing) = req.categories.iter().find(|id| !known.contains_key(id)) {
                return Err(Error::validation(
                    "categories",
                    format!("unknown category {}", missing),
                ));
            }
        }

        let id = self.backends.recipes.insert(author_id, req).await?;
        info!(recipe_id = %id, "Recipe published");
        Ok(id)
    }

    pub async fn get(&self, id: Uuid, caller: Option<Uuid>) -> Result<RecipeSummary> {
        let recipe = self
            .backends
            .recipes
            .fetch(id)
            .await?
            .ok_or(Error::RecipeNotFound(id))?;
        self.search
            .summarize(vec![recipe], caller)
            .await?
            .pop()
            .ok_or_else(|| Error::Internal(format!("recipe {} lost while formatting", id)))
    }

    /// The most recently published recipes.
    pub async fn latest(&self, caller: Option<Uuid>) -> Result<Vec<RecipeSummary>> {
        let recipes = self.backends.recipes.latest(LATEST_RECIPES_LIMIT).await?;
        debug!(result_count = recipes.len(), "Loaded latest recipes");
        self.search.summarize(recipes, caller).await
    }

    /// Ratings of one recipe, newest first.
    pub async fn ratings(&self, recipe_id: Uuid) -> Result<Vec<RatingSummary>> {
        if self.backends.recipes.fetch(recipe_id).await?.is_none() {
            return Err(Error::RecipeNotFound(recipe_id));
        }
        let ratings = self.backends.ratings.list_for_recipe(recipe_id).await?;

        let mut seen = HashSet::new();
        let author_ids: Vec<Uuid> = ratings
            .iter()
            .map(|r| r.author_id)
            .filter(|id| seen.insert(*id))
            .collect();
        let names = self.backends.users.display_names(&author_ids).await?;

        Ok(ratings
            .into_iter()
            .map(|rating| {
                let author = names
                    .get(&rating.author_id)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
                RatingSummary::from_rating(rating, author)
            })
            .collect())
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        self.backends.categories.list().await
    }
}
