//! Favorite lookups backed by `user_favorite`.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use recetario_core::{Error, FavoritesService, Result};

/// PostgreSQL implementation of FavoritesService.
#[derive(Clone)]
pub struct PgFavoritesService {
    pool: Pool<Postgres>,
}

impl PgFavoritesService {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Mark a recipe as favorite for a user. Repeating is a no-op.
    pub async fn add(&self, user_id: Uuid, recipe_id: Uuid) -> Result<()> {
        sqlx::query(
            "INSERT INTO user_favorite (user_id, recipe_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(())
    }
}

#[async_trait]
impl FavoritesService for PgFavoritesService {
    async fn favorited_among(&self, caller: Uuid, recipe_ids: &[Uuid]) -> Result<HashSet<Uuid>> {
        if recipe_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT recipe_id FROM user_favorite WHERE user_id = $1 AND recipe_id = ANY($2::uuid[])",
        )
        .bind(caller)
        .bind(recipe_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(ids.into_iter().collect())
    }
}
