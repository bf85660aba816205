//! Search execution: filter composition, paging, and result formatting.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use recetario_core::{
    Backends, PageRequest, Paginated, Recipe, RecipeSummary, Result, SearchFilters,
};

use crate::filter_builder::{FilterBuilder, FilterOutcome};

/// Display name used when an author no longer resolves in the user directory.
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// Runs recipe searches and formats recipes for output.
#[derive(Clone)]
pub struct SearchExecutor {
    backends: Backends,
    filter_builder: FilterBuilder,
}

impl SearchExecutor {
    pub fn new(backends: Backends) -> Self {
        let filter_builder = FilterBuilder::new(backends.users.clone());
        Self {
            backends,
            filter_builder,
        }
    }

    /// One page of recipes matching every provided filter, newest first.
    ///
    /// `favorited` is set on each summary only when `caller` is present.
    #[instrument(skip(self, filters), fields(
        subsystem = "search",
        component = "executor",
        op = "search",
        page = page.page(),
        limit = page.limit(),
        authenticated = caller.is_some(),
    ))]
    pub async fn search(
        &self,
        filters: &SearchFilters,
        page: PageRequest,
        caller: Option<Uuid>,
    ) -> Result<Paginated<RecipeSummary>> {
        let start = Instant::now();

        let query = match self.filter_builder.build(filters).await? {
            FilterOutcome::Query(query) => query,
            FilterOutcome::MatchesNothing { reason } => {
                debug!(reason, "Returning empty page without querying recipes");
                return Ok(Paginated::empty(&page));
            }
        };

        let found = self.backends.recipes.search_page(&query, &page).await?;
        let summaries = self.summarize(found.recipes, caller).await?;

        info!(
            clause_count = query.len(),
            total = found.total,
            result_count = summaries.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Recipe search completed"
        );

        Ok(Paginated::new(summaries, found.total, &page))
    }

    /// Format recipes, resolving author names, category names and favorites
    /// with one batched lookup each.
    pub async fn summarize(
        &self,
        recipes: Vec<Recipe>,
        caller: Option<Uuid>,
    ) -> Result<Vec<RecipeSummary>> {
        if recipes.is_empty() {
            return Ok(Vec::new());
        }

        let author_ids = unique_ids(recipes.iter().map(|r| r.author_id));
        let category_ids = unique_ids(recipes.iter().flat_map(|r| r.category_ids.iter().copied()));
        let recipe_ids: Vec<Uuid> = recipes.iter().map(|r| r.id).collect();

        let authors = self.backends.users.display_names(&author_ids).await?;
        let categories = self.backends.categories.names_for(&category_ids).await?;
        let favorites: Option<HashSet<Uuid>> = match caller {
            Some(caller) => Some(
                self.backends
                    .favorites
                    .favorited_among(caller, &recipe_ids)
                    .await?,
            ),
            None => None,
        };

        Ok(recipes
            .into_iter()
            .map(|recipe| format_recipe(recipe, &authors, &categories, favorites.as_ref()))
            .collect())
    }
}

fn unique_ids(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

fn format_recipe(
    recipe: Recipe,
    authors: &HashMap<Uuid, String>,
    categories: &HashMap<Uuid, String>,
    favorites: Option<&HashSet<Uuid>>,
) -> RecipeSummary {
    let author = authors
        .get(&recipe.author_id)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
    let category_names = recipe
        .category_ids
        .iter()
        .filter_map(|id| categories.get(id).cloned())
        .collect();
    let favorited = favorites.map(|set| set.contains(&recipe.id));
    RecipeSummary::from_recipe(recipe, author, category_names, favorited)
}
