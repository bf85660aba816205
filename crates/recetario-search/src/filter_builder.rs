//! Composition of search filters into a recipe query.

use std::sync::Arc;

use tracing::{debug, trace};

use recetario_core::{RecipeClause, RecipeQuery, Result, SearchFilters, UserDirectory};

/// Result of composing search filters.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    /// Run this query against the store.
    Query(RecipeQuery),
    /// No recipe can match; skip the store and return an empty page.
    MatchesNothing { reason: &'static str },
}

/// Builds the AND of one clause per provided filter field.
///
/// The only lookup is the author fragment, which is resolved to user IDs.
/// When no user matches, the outcome is [`FilterOutcome::MatchesNothing`]:
/// an empty author set never widens to "any author".
#[derive(Clone)]
pub struct FilterBuilder {
    users: Arc<dyn UserDirectory>,
}

impl FilterBuilder {
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self { users }
    }

    pub async fn build(&self, filters: &SearchFilters) -> Result<FilterOutcome> {
        let mut query = RecipeQuery::new();

        if let Some(author) = filters.author.as_deref() {
            let ids = self.users.find_ids_by_name(author).await?;
            if ids.is_empty() {
                debug!(
                    subsystem = "search",
                    component = "filter_builder",
                    op = "build",
                    "No author matches fragment; search short-circuits"
                );
                return Ok(FilterOutcome::MatchesNothing {
                    reason: "no author matches",
                });
            }
            query.push(RecipeClause::AuthorIn(ids));
        }

        for clause in filters.static_clauses() {
            trace!(clause = clause.kind(), "Adding filter clause");
            query.push(clause);
        }

        debug!(
            subsystem = "search",
            component = "filter_builder",
            op = "build",
            clause_count = query.len(),
            "Filter composed"
        );
        Ok(FilterOutcome::Query(query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recetario_db::MemoryStore;

    fn builder(store: &MemoryStore) -> FilterBuilder {
        FilterBuilder::new(Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn test_no_filters_yield_empty_query() {
        let store = MemoryStore::new();
        let outcome = builder(&store).build(&SearchFilters::new()).await.unwrap();
        assert_eq!(outcome, FilterOutcome::Query(RecipeQuery::new()));
    }

    #[tokio::test]
    async fn test_unmatched_author_matches_nothing() {
        let store = MemoryStore::new();
        store.add_user("ana").await;
        let outcome = builder(&store)
            .build(&SearchFilters::new().with_author("zoe"))
            .await
            .unwrap();
        assert!(matches!(outcome, FilterOutcome::MatchesNothing { .. }));
    }

    #[tokio::test]
    async fn test_author_fragment_resolves_every_match() {
        let store = MemoryStore::new();
        let ana = store.add_user("Ana").await;
        let mariana = store.add_user("Mariana").await;
        store.add_user("Bo").await;

        let outcome = builder(&store)
            .build(&SearchFilters::new().with_author("ANA"))
            .await
            .unwrap();
        let FilterOutcome::Query(query) = outcome else {
            panic!("expected a query");
        };
        match &query.clauses()[0] {
            RecipeClause::AuthorIn(ids) => {
                assert_eq!(ids.len(), 2);
                assert!(ids.contains(&ana));
                assert!(ids.contains(&mariana));
            }
            other => panic!("expected author clause, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_one_clause_per_field() {
        let store = MemoryStore::new();
        let filters = SearchFilters::new()
            .with_text("soup")
            .with_categories(["Dinner"])
            .with_ingredient("leek", false)
            .with_max_prep_time(30)
            .with_min_rating(4.0);

        let FilterOutcome::Query(query) = builder(&store).build(&filters).await.unwrap() else {
            panic!("expected a query");
        };
        let kinds: Vec<&str> = query.clauses().iter().map(|c| c.kind()).collect();
        assert_eq!(
            kinds,
            vec!["text", "category", "ingredient", "prep_time", "rating"]
        );
    }

    #[tokio::test]
    async fn test_directory_failure_propagates() {
        let store = MemoryStore::new();
        store.set_unavailable(true).await;
        let err = builder(&store)
            .build(&SearchFilters::new().with_author("ana"))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
