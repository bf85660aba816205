//! Category lookups.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use recetario_core::{Category, CategoryDirectory, Error, Result};

/// PostgreSQL implementation of CategoryDirectory.
#[derive(Clone)]
pub struct PgCategoryDirectory {
    pool: Pool<Postgres>,
}

impl PgCategoryDirectory {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Create a category, or return the existing one with the same name.
    pub async fn ensure(&self, name: &str) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("name", "must not be empty"));
        }
        let (id, name): (Uuid, String) = sqlx::query_as(
            "INSERT INTO category (id, name) VALUES ($1, $2)
             ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
             RETURNING id, name",
        )
        .bind(Uuid::now_v7())
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(Category { id, name })
    }
}

#[async_trait]
impl CategoryDirectory for PgCategoryDirectory {
    async fn list(&self) -> Result<Vec<Category>> {
        let rows: Vec<(Uuid, String)> =
            sqlx::query_as("SELECT id, name FROM category ORDER BY name, id")
                .fetch_all(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| Category { id, name })
            .collect())
    }

    async fn names_for(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(Uuid, String)> =
            sqlx::query_as("SELECT id, name FROM category WHERE id = ANY($1::uuid[])")
                .bind(ids)
                .fetch_all(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(rows.into_iter().collect())
    }
}
