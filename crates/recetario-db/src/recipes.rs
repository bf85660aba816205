//! Recipe repository implementation.

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row, Transaction};
use tracing::{debug, info};
use uuid::Uuid;

use recetario_core::{
    CreateRecipeRequest, Error, Ingredient, PageRequest, Recipe, RecipePage, RecipeQuery,
    RecipeRepository, Result, Step,
};

use crate::recipe_filter::{bind_params, RecipeFilterQueryBuilder};
use crate::reference_error;

/// Columns selected for a full [`Recipe`], over the `recipe r` alias.
pub(crate) const RECIPE_COLUMNS: &str = "r.id, r.name, r.servings, r.description, r.ingredients, r.steps, r.media, \
     r.author_id, r.created_at, r.prep_time_minutes, r.average_rating, \
     ARRAY(SELECT rc.category_id FROM recipe_category rc WHERE rc.recipe_id = r.id ORDER BY rc.position) AS category_ids";

/// PostgreSQL implementation of RecipeRepository.
#[derive(Clone)]
pub struct PgRecipeRepository {
    pool: Pool<Postgres>,
}

impl PgRecipeRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert a recipe and its category links within an existing transaction.
    pub async fn insert_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        author_id: Uuid,
        req: CreateRecipeRequest,
    ) -> Result<Uuid> {
        let recipe_id = Uuid::now_v7();

        sqlx::query(
            "INSERT INTO recipe (id, name, servings, description, ingredients, steps, media, author_id, created_at, prep_time_minutes, average_rating)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 0)",
        )
        .bind(recipe_id)
        .bind(req.name.trim())
        .bind(req.servings)
        .bind(req.description.trim())
        .bind(Json(&req.ingredients))
        .bind(Json(&req.steps))
        .bind(&req.media)
        .bind(author_id)
        .bind(Utc::now())
        .bind(req.prep_time_minutes)
        .execute(&mut **tx)
        .await
        .map_err(reference_error("authorId"))?;

        let categories = dedup_preserving_order(&req.categories);
        if !categories.is_empty() {
            sqlx::query(
                "INSERT INTO recipe_category (recipe_id, category_id, position)
                 SELECT $1, t.category_id, (t.ord - 1)::int
                 FROM unnest($2::uuid[]) WITH ORDINALITY AS t(category_id, ord)",
            )
            .bind(recipe_id)
            .bind(&categories)
            .execute(&mut **tx)
            .await
            .map_err(reference_error("categories"))?;
        }

        Ok(recipe_id)
    }
}

fn dedup_preserving_order(ids: &[Uuid]) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

/// Map a row selected with [`RECIPE_COLUMNS`].
pub(crate) fn recipe_from_row(row: &PgRow) -> Result<Recipe> {
    let ingredients: Json<Vec<Ingredient>> = row.try_get("ingredients")?;
    let steps: Json<Vec<Step>> = row.try_get("steps")?;
    Ok(Recipe {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        servings: row.try_get("servings")?,
        description: row.try_get("description")?,
        ingredients: ingredients.0,
        steps: steps.0,
        category_ids: row.try_get("category_ids")?,
        media: row.try_get("media")?,
        author_id: row.try_get("author_id")?,
        created_at: row.try_get("created_at")?,
        prep_time_minutes: row.try_get("prep_time_minutes")?,
        average_rating: row.try_get("average_rating")?,
    })
}

#[async_trait]
impl RecipeRepository for PgRecipeRepository {
    async fn insert(&self, author_id: Uuid, req: CreateRecipeRequest) -> Result<Uuid> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let id = self.insert_tx(&mut tx, author_id, req).await?;
        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "database",
            component = "recipes",
            op = "insert",
            recipe_id = %id,
            "Recipe inserted"
        );
        Ok(id)
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Recipe>> {
        let sql = format!("SELECT {} FROM recipe r WHERE r.id = $1", RECIPE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        row.as_ref().map(recipe_from_row).transpose()
    }

    async fn latest(&self, limit: i64) -> Result<Vec<Recipe>> {
        let sql = format!(
            "SELECT {} FROM recipe r ORDER BY r.created_at DESC, r.id DESC LIMIT $1",
            RECIPE_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(limit.max(0))
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        rows.iter().map(recipe_from_row).collect()
    }

    async fn search_page(&self, query: &RecipeQuery, page: &PageRequest) -> Result<RecipePage> {
        let start = Instant::now();
        let (where_clause, params) = RecipeFilterQueryBuilder::new(query, 0).build();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        // Count and page must observe the same snapshot.
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let count_sql = format!("SELECT COUNT(*) AS count FROM recipe r WHERE {}", where_clause);
        let total: i64 = bind_params(sqlx::query(&count_sql), &params)
            .fetch_one(&mut *tx)
            .await
            .map_err(Error::Database)?
            .try_get("count")?;

        let limit_param = params.len() + 1;
        let offset_param = params.len() + 2;
        let page_sql = format!(
            "SELECT {} FROM recipe r WHERE {} ORDER BY r.created_at DESC, r.id DESC LIMIT ${} OFFSET ${}",
            RECIPE_COLUMNS, where_clause, limit_param, offset_param
        );
        let rows = bind_params(sqlx::query(&page_sql), &params)
            .bind(page.limit())
            .bind(page.skip())
            .fetch_all(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        let recipes = rows
            .iter()
            .map(recipe_from_row)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            subsystem = "database",
            component = "recipes",
            op = "search_page",
            clause_count = query.len(),
            total,
            result_count = recipes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Recipe page fetched"
        );

        Ok(RecipePage { recipes, total })
    }
}
