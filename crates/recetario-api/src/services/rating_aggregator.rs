//! Rating submission and average maintenance.

use std::time::Instant;

use tracing::{info, instrument};
use uuid::Uuid;

use recetario_core::{
    Backends, Error, RatingOutcome, RatingSubmission, RatingSummary, Result,
};

use super::registered_name;

/// Outcome of [`RatingAggregator::rate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Rated {
    pub outcome: RatingOutcome,
    /// False when an existing rating by the same author was replaced.
    pub created: bool,
}

/// Upserts one user's rating of a recipe and keeps the recipe's average
/// equal to the rounded mean of every current score.
///
/// Rejections happen before any write: invalid input, unknown recipe, an
/// author rating their own recipe, and a caller with no user account. The storage backend performs the
/// upsert and the full recompute as one unit per recipe.
#[derive(Clone)]
pub struct RatingAggregator {
    backends: Backends,
}

impl RatingAggregator {
    pub fn new(backends: Backends) -> Self {
        Self { backends }
    }

    #[instrument(skip(self, comment), fields(
        subsystem = "ratings",
        component = "aggregator",
        op = "rate",
        recipe_id = %recipe_id,
        caller_id = %author_id,
    ))]
    pub async fn rate(
        &self,
        recipe_id: Uuid,
        author_id: Uuid,
        score: i64,
        comment: Option<String>,
    ) -> Result<Rated> {
        let start = Instant::now();
        let submission = RatingSubmission::new(recipe_id, author_id, score, comment)?;

        let recipe = self
            .backends
            .recipes
            .fetch(recipe_id)
            .await?
            .ok_or(Error::RecipeNotFound(recipe_id))?;
        if recipe.author_id == author_id {
            return Err(Error::Forbidden(
                "Authors cannot rate their own recipes".to_string(),
            ));
        }

        let author = registered_name(self.backends.users.as_ref(), author_id).await?;

        let write = self
            .backends
            .ratings
            .upsert_and_recompute(&submission)
            .await?;

        info!(
            rating_id = %write.rating.id,
            created = write.created,
            average = write.average,
            total = write.total_ratings,
            duration_ms = start.elapsed().as_millis() as u64,
            "Rating stored"
        );

        Ok(Rated {
            outcome: RatingOutcome {
                rating: RatingSummary::from_rating(write.rating, author),
                average: write.average,
                total_ratings: write.total_ratings,
            },
            created: write.created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recetario_db::test_fixtures::sample_recipe;
    use recetario_db::MemoryStore;
    use recetario_core::RecipeRepository;

    struct Fixture {
        store: MemoryStore,
        aggregator: RatingAggregator,
        author: Uuid,
        recipe: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = MemoryStore::new();
        let author = store.add_user("Chef").await;
        let recipe = store
            .insert(author, sample_recipe("Toast", &["bread"], 5))
            .await
            .unwrap();
        Fixture {
            aggregator: RatingAggregator::new(store.backends()),
            store,
            author,
            recipe,
        }
    }

    #[tokio::test]
    async fn test_worked_example_sequence() {
        let f = fixture().await;
        let a = f.store.add_user("A").await;
        let b = f.store.add_user("B").await;
        let c = f.store.add_user("C").await;

        f.aggregator.rate(f.recipe, a, 3, None).await.unwrap();
        let rated = f.aggregator.rate(f.recipe, b, 5, None).await.unwrap();
        assert_eq!(rated.outcome.average, 4.0);

        let rated = f.aggregator.rate(f.recipe, c, 4, None).await.unwrap();
        assert!(rated.created);
        assert_eq!(rated.outcome.average, 4.0);
        assert_eq!(rated.outcome.total_ratings, 3);
        let first_id = rated.outcome.rating.id;

        let rated = f
            .aggregator
            .rate(f.recipe, c, 2, Some("  drier than I hoped ".into()))
            .await
            .unwrap();
        assert!(!rated.created);
        assert_eq!(rated.outcome.rating.id, first_id);
        assert_eq!(rated.outcome.rating.author_display_name, "C");
        assert_eq!(
            rated.outcome.rating.comment.as_deref(),
            Some("drier than I hoped")
        );
        assert_eq!(rated.outcome.average, 3.3);
        assert_eq!(rated.outcome.total_ratings, 3);

        let stored = f.store.fetch(f.recipe).await.unwrap().unwrap();
        assert_eq!(stored.average_rating, 3.3);
    }

    #[tokio::test]
    async fn test_resubmission_is_idempotent() {
        let f = fixture().await;
        let rater = f.store.add_user("Rater").await;

        let first = f.aggregator.rate(f.recipe, rater, 4, None).await.unwrap();
        let second = f.aggregator.rate(f.recipe, rater, 4, None).await.unwrap();

        assert_eq!(first.outcome.rating.id, second.outcome.rating.id);
        assert_eq!(second.outcome.average, 4.0);
        assert_eq!(second.outcome.total_ratings, 1);
        assert_eq!(f.store.rating_count(f.recipe).await, 1);
    }

    #[tokio::test]
    async fn test_self_rating_rejected_without_write() {
        let f = fixture().await;

        let err = f.aggregator.rate(f.recipe, f.author, 5, None).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
        assert_eq!(f.store.rating_count(f.recipe).await, 0);
    }

    #[tokio::test]
    async fn test_out_of_range_scores_rejected() {
        let f = fixture().await;
        let rater = f.store.add_user("Rater").await;

        for score in [0, 6, -1, 100] {
            let err = f.aggregator.rate(f.recipe, rater, score, None).await.unwrap_err();
            assert!(matches!(err, Error::Validation { ref field, .. } if field == "score"));
        }
        assert_eq!(f.store.rating_count(f.recipe).await, 0);
    }

    #[tokio::test]
    async fn test_unknown_recipe_is_not_found() {
        let f = fixture().await;
        let rater = f.store.add_user("Rater").await;
        let missing = Uuid::new_v4();

        let err = f.aggregator.rate(missing, rater, 3, None).await.unwrap_err();
        assert!(matches!(err, Error::RecipeNotFound(id) if id == missing));
    }

    #[tokio::test]
    async fn test_unregistered_caller_rejected_without_write() {
        let f = fixture().await;
        let stranger = Uuid::new_v4();

        let err = f.aggregator.rate(f.recipe, stranger, 4, None).await.unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "authorId"));
        assert_eq!(f.store.rating_count(f.recipe).await, 0);
        let stored = f.store.fetch(f.recipe).await.unwrap().unwrap();
        assert_eq!(stored.average_rating, 0.0);
    }

    #[tokio::test]
    async fn test_concurrent_raters_all_counted() {
        let f = fixture().await;
        let mut handles = Vec::new();
        for n in 0..10i64 {
            let rater = f.store.add_user(&format!("rater {}", n)).await;
            let aggregator = f.aggregator.clone();
            let recipe = f.recipe;
            handles.push(tokio::spawn(async move {
                aggregator.rate(recipe, rater, n % 5 + 1, None).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Scores 1..=5 twice: mean 3.0.
        let stored = f.store.fetch(f.recipe).await.unwrap().unwrap();
        assert_eq!(stored.average_rating, 3.0);
        assert_eq!(f.store.rating_count(f.recipe).await, 10);
    }
}
