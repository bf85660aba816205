//! Rating repository implementation.
//!
//! A rating write and the recompute of its recipe's average run as one
//! transaction holding the recipe row lock, so concurrent raters of the same
//! recipe are serialized and none of their scores is left out of the average.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row, Transaction};
use tracing::info;
use uuid::Uuid;

use recetario_core::{
    average_from_totals, Error, Rating, RatingRepository, RatingSubmission, RatingWrite, Result,
};

use crate::reference_error;

/// PostgreSQL implementation of RatingRepository.
#[derive(Clone)]
pub struct PgRatingRepository {
    pool: Pool<Postgres>,
}

impl PgRatingRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Recompute the average from every current score and write it onto the
    /// recipe. The caller must already hold the recipe row lock.
    pub async fn recompute_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        recipe_id: Uuid,
    ) -> Result<(f64, i64)> {
        let (sum, count): (i64, i64) = sqlx::query_as(
            "SELECT COALESCE(SUM(score), 0)::bigint, COUNT(*) FROM rating WHERE recipe_id = $1",
        )
        .bind(recipe_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(Error::Database)?;

        let average = average_from_totals(sum, count);

        sqlx::query("UPDATE recipe SET average_rating = $2 WHERE id = $1")
            .bind(recipe_id)
            .bind(average)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        Ok((average, count))
    }
}

fn rating_from_row(row: &PgRow) -> Result<Rating> {
    Ok(Rating {
        id: row.try_get("id")?,
        recipe_id: row.try_get("recipe_id")?,
        author_id: row.try_get("author_id")?,
        score: row.try_get("score")?,
        comment: row.try_get("comment")?,
        created_at: row.try_get("rated_at")?,
    })
}

#[async_trait]
impl RatingRepository for PgRatingRepository {
    async fn upsert_and_recompute(&self, submission: &RatingSubmission) -> Result<RatingWrite> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let owner: Option<Uuid> =
            sqlx::query_scalar("SELECT author_id FROM recipe WHERE id = $1 FOR UPDATE")
                .bind(submission.recipe_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(Error::Database)?;

        let Some(owner) = owner else {
            return Err(Error::RecipeNotFound(submission.recipe_id));
        };
        if owner == submission.author_id {
            return Err(Error::Forbidden("cannot rate your own recipe".to_string()));
        }

        let row = sqlx::query(
            "INSERT INTO rating (id, recipe_id, author_id, score, comment, rated_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (recipe_id, author_id) DO UPDATE
                 SET score = EXCLUDED.score,
                     comment = EXCLUDED.comment,
                     rated_at = EXCLUDED.rated_at
             RETURNING id, recipe_id, author_id, score, comment, rated_at, (xmax = 0) AS created",
        )
        .bind(Uuid::now_v7())
        .bind(submission.recipe_id)
        .bind(submission.author_id)
        .bind(submission.score)
        .bind(submission.comment.as_deref())
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(reference_error("authorId"))?;

        let rating = rating_from_row(&row)?;
        let created: bool = row.try_get("created")?;

        let (average, total_ratings) = self.recompute_tx(&mut tx, submission.recipe_id).await?;

        tx.commit().await.map_err(Error::Database)?;

        let op = if created { "insert" } else { "update" };
        info!(
            subsystem = "database",
            component = "ratings",
            op,
            recipe_id = %submission.recipe_id,
            rating_id = %rating.id,
            average,
            total = total_ratings,
            "Rating stored and average recomputed"
        );

        Ok(RatingWrite {
            rating,
            created,
            average,
            total_ratings,
        })
    }

    async fn list_for_recipe(&self, recipe_id: Uuid) -> Result<Vec<Rating>> {
        let rows = sqlx::query(
            "SELECT id, recipe_id, author_id, score, comment, rated_at
             FROM rating
             WHERE recipe_id = $1
             ORDER BY rated_at DESC, id DESC",
        )
        .bind(recipe_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter().map(rating_from_row).collect()
    }
}
