//! In-memory backend for tests and local development.
//!
//! Implements every repository and directory trait over a single
//! mutex-guarded state, so each rating write and its recompute are one
//! atomic unit, mirroring the row lock of the PostgreSQL implementation.
//!
//! ## Usage
//!
//! ```rust
//! use recetario_db::memory::MemoryStore;
//!
//! # async fn demo() {
//! let store = MemoryStore::new();
//! let ana = store.add_user("ana").await;
//! let soups = store.add_category("Soup").await;
//! let backends = store.backends();
//! # let _ = (ana, soups, backends);
//! # }
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use recetario_core::{
    average_of, Backends, Category, CategoryDirectory, CreateRecipeRequest, Error,
    FavoritesService, PageRequest, Rating, RatingRepository, RatingSubmission, RatingWrite, Recipe,
    RecipePage, RecipeQuery, RecipeRepository, Result, UserDirectory,
};

#[derive(Debug, Default)]
struct State {
    users: Vec<(Uuid, String)>,
    categories: Vec<Category>,
    /// Recipes with their insertion sequence, used to break timestamp ties.
    recipes: Vec<(u64, Recipe)>,
    ratings: Vec<Rating>,
    favorites: HashSet<(Uuid, Uuid)>,
    next_seq: u64,
    unavailable: bool,
}

impl State {
    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            Err(Error::Database(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }

    fn category_names(&self, ids: &[Uuid]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.categories.iter().find(|c| c.id == *id))
            .map(|c| c.name.clone())
            .collect()
    }

    /// Mirrors the author foreign keys of the relational schema.
    fn check_user(&self, user_id: Uuid) -> Result<()> {
        if self.users.iter().any(|(id, _)| *id == user_id) {
            Ok(())
        } else {
            Err(Error::validation("authorId", "unknown user"))
        }
    }

    /// Recipes newest first, later insert first on equal timestamps.
    fn recipes_newest_first(&self) -> Vec<&(u64, Recipe)> {
        let mut ordered: Vec<&(u64, Recipe)> = self.recipes.iter().collect();
        ordered.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at.cmp(&a.created_at).then(seq_b.cmp(seq_a))
        });
        ordered
    }
}

/// Shared in-memory store. Clones share state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bundle this store as every backend trait object.
    pub fn backends(&self) -> Backends {
        Backends {
            recipes: Arc::new(self.clone()),
            ratings: Arc::new(self.clone()),
            users: Arc::new(self.clone()),
            categories: Arc::new(self.clone()),
            favorites: Arc::new(self.clone()),
        }
    }

    pub async fn add_user(&self, display_name: &str) -> Uuid {
        let id = Uuid::now_v7();
        self.state
            .lock()
            .await
            .users
            .push((id, display_name.to_string()));
        id
    }

    pub async fn add_category(&self, name: &str) -> Uuid {
        let id = Uuid::now_v7();
        self.state.lock().await.categories.push(Category {
            id,
            name: name.to_string(),
        });
        id
    }

    pub async fn add_favorite(&self, user_id: Uuid, recipe_id: Uuid) {
        self.state
            .lock()
            .await
            .favorites
            .insert((user_id, recipe_id));
    }

    /// Insert a recipe with an explicit creation time.
    pub async fn insert_at(
        &self,
        author_id: Uuid,
        req: CreateRecipeRequest,
        created_at: DateTime<Utc>,
    ) -> Result<Uuid> {
        let mut state = self.state.lock().await;
        state.check_available()?;

        state.check_user(author_id)?;

        let id = Uuid::now_v7();
        let mut category_ids: Vec<Uuid> = Vec::with_capacity(req.categories.len());
        for category_id in req.categories {
            if !state.categories.iter().any(|c| c.id == category_id) {
                return Err(Error::validation(
                    "categories",
                    format!("unknown category {}", category_id),
                ));
            }
            if !category_ids.contains(&category_id) {
                category_ids.push(category_id);
            }
        }

        let recipe = Recipe {
            id,
            name: req.name.trim().to_string(),
            servings: req.servings,
            description: req.description.trim().to_string(),
            ingredients: req.ingredients,
            steps: req.steps,
            category_ids,
            media: req.media,
            author_id,
            created_at,
            prep_time_minutes: req.prep_time_minutes,
            average_rating: 0.0,
        };
        let seq = state.next_seq;
        state.next_seq += 1;
        state.recipes.push((seq, recipe));
        Ok(id)
    }

    /// Make every subsequent operation fail as a transient storage error.
    pub async fn set_unavailable(&self, unavailable: bool) {
        self.state.lock().await.unavailable = unavailable;
    }

    /// Number of stored ratings for a recipe.
    pub async fn rating_count(&self, recipe_id: Uuid) -> usize {
        self.state
            .lock()
            .await
            .ratings
            .iter()
            .filter(|r| r.recipe_id == recipe_id)
            .count()
    }
}

#[async_trait]
impl RecipeRepository for MemoryStore {
    async fn insert(&self, author_id: Uuid, req: CreateRecipeRequest) -> Result<Uuid> {
        self.insert_at(author_id, req, Utc::now()).await
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Recipe>> {
        let state = self.state.lock().await;
        state.check_available()?;
        Ok(state
            .recipes
            .iter()
            .find(|(_, r)| r.id == id)
            .map(|(_, r)| r.clone()))
    }

    async fn latest(&self, limit: i64) -> Result<Vec<Recipe>> {
        let state = self.state.lock().await;
        state.check_available()?;
        let take = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(state
            .recipes_newest_first()
            .into_iter()
            .take(take)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn search_page(&self, query: &RecipeQuery, page: &PageRequest) -> Result<RecipePage> {
        let state = self.state.lock().await;
        state.check_available()?;

        let matching: Vec<&Recipe> = state
            .recipes_newest_first()
            .into_iter()
            .map(|(_, r)| r)
            .filter(|r| query.matches(r, &state.category_names(&r.category_ids)))
            .collect();

        let total = matching.len() as i64;
        let skip = usize::try_from(page.skip()).unwrap_or(usize::MAX);
        let take = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        let recipes = matching
            .into_iter()
            .skip(skip)
            .take(take)
            .cloned()
            .collect();

        Ok(RecipePage { recipes, total })
    }
}

#[async_trait]
impl RatingRepository for MemoryStore {
    async fn upsert_and_recompute(&self, submission: &RatingSubmission) -> Result<RatingWrite> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        state.check_available()?;

        let owner = state
            .recipes
            .iter()
            .find(|(_, r)| r.id == submission.recipe_id)
            .map(|(_, r)| r.author_id)
            .ok_or(Error::RecipeNotFound(submission.recipe_id))?;
        if owner == submission.author_id {
            return Err(Error::Forbidden("cannot rate your own recipe".to_string()));
        }
        state.check_user(submission.author_id)?;

        let now = Utc::now();
        let existing = state.ratings.iter_mut().find(|r| {
            r.recipe_id == submission.recipe_id && r.author_id == submission.author_id
        });
        let (rating, created) = match existing {
            Some(rating) => {
                rating.score = submission.score;
                rating.comment = submission.comment.clone();
                rating.created_at = now;
                (rating.clone(), false)
            }
            None => {
                let rating = Rating {
                    id: Uuid::now_v7(),
                    recipe_id: submission.recipe_id,
                    author_id: submission.author_id,
                    score: submission.score,
                    comment: submission.comment.clone(),
                    created_at: now,
                };
                state.ratings.push(rating.clone());
                (rating, true)
            }
        };

        let scores: Vec<i16> = state
            .ratings
            .iter()
            .filter(|r| r.recipe_id == submission.recipe_id)
            .map(|r| r.score)
            .collect();
        let average = average_of(&scores);

        if let Some((_, recipe)) = state
            .recipes
            .iter_mut()
            .find(|(_, r)| r.id == submission.recipe_id)
        {
            recipe.average_rating = average;
        }

        Ok(RatingWrite {
            rating,
            created,
            average,
            total_ratings: scores.len() as i64,
        })
    }

    async fn list_for_recipe(&self, recipe_id: Uuid) -> Result<Vec<Rating>> {
        let state = self.state.lock().await;
        state.check_available()?;
        let mut ratings: Vec<Rating> = state
            .ratings
            .iter()
            .filter(|r| r.recipe_id == recipe_id)
            .cloned()
            .collect();
        ratings.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(ratings)
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_ids_by_name(&self, fragment: &str) -> Result<Vec<Uuid>> {
        let state = self.state.lock().await;
        state.check_available()?;
        let needle = fragment.to_lowercase();
        Ok(state
            .users
            .iter()
            .filter(|(_, name)| name.to_lowercase().contains(&needle))
            .map(|(id, _)| *id)
            .collect())
    }

    async fn display_names(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>> {
        let state = self.state.lock().await;
        state.check_available()?;
        Ok(state
            .users
            .iter()
            .filter(|(id, _)| ids.contains(id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CategoryDirectory for MemoryStore {
    async fn list(&self) -> Result<Vec<Category>> {
        let state = self.state.lock().await;
        state.check_available()?;
        let mut categories = state.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(categories)
    }

    async fn names_for(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>> {
        let state = self.state.lock().await;
        state.check_available()?;
        Ok(state
            .categories
            .iter()
            .filter(|c| ids.contains(&c.id))
            .map(|c| (c.id, c.name.clone()))
            .collect())
    }
}

#[async_trait]
impl FavoritesService for MemoryStore {
    async fn favorited_among(&self, caller: Uuid, recipe_ids: &[Uuid]) -> Result<HashSet<Uuid>> {
        let state = self.state.lock().await;
        state.check_available()?;
        Ok(recipe_ids
            .iter()
            .filter(|id| state.favorites.contains(&(caller, **id)))
            .copied()
            .collect())
    }
}
