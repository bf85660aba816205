//! User directory backed by the `app_user` table.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use recetario_core::{Error, Result, UserDirectory};

use crate::escape_like;

/// PostgreSQL implementation of UserDirectory.
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: Pool<Postgres>,
}

impl PgUserDirectory {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Mirror a user from the identity service, returning its ID.
    ///
    /// Re-registering an existing display name returns the existing ID.
    pub async fn register(&self, display_name: &str) -> Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO app_user (id, display_name) VALUES ($1, $2)
             ON CONFLICT (display_name) DO UPDATE SET display_name = EXCLUDED.display_name
             RETURNING id",
        )
        .bind(Uuid::now_v7())
        .bind(display_name.trim())
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(id)
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_ids_by_name(&self, fragment: &str) -> Result<Vec<Uuid>> {
        let pattern = format!("%{}%", escape_like(fragment));
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM app_user WHERE display_name ILIKE $1 ESCAPE '\\' ORDER BY id",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(ids)
    }

    async fn display_names(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows: Vec<(Uuid, String)> =
            sqlx::query_as("SELECT id, display_name FROM app_user WHERE id = ANY($1::uuid[])")
                .bind(ids)
                .fetch_all(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(rows.into_iter().collect())
    }
}
