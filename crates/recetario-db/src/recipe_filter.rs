//! SQL rendering of recipe search clauses.
//!
//! Each [`RecipeClause`] renders to one parameterized WHERE fragment over the
//! `recipe r` alias. Fragments are joined with AND; an empty query renders
//! as `TRUE`.

use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;
use uuid::Uuid;

use recetario_core::{RecipeClause, RecipeQuery};

use crate::escape_like;

/// Type-safe parameter binding for SQL queries.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryParam {
    /// Array of UUIDs (for ANY operations).
    UuidArray(Vec<Uuid>),
    Int(i32),
    Float(f64),
    /// String parameter, already escaped when used with ILIKE.
    String(String),
    /// Array of strings (for ANY operations).
    StringArray(Vec<String>),
}

/// Bind every parameter, in order, onto a query.
pub fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [QueryParam],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            QueryParam::UuidArray(ids) => query.bind(ids),
            QueryParam::Int(val) => query.bind(val),
            QueryParam::Float(val) => query.bind(val),
            QueryParam::String(s) => query.bind(s),
            QueryParam::StringArray(arr) => query.bind(arr),
        };
    }
    query
}

/// Generates the WHERE clause for a recipe search.
///
/// # Example
///
/// ```rust,ignore
/// use recetario_db::recipe_filter::RecipeFilterQueryBuilder;
/// use recetario_core::{RecipeClause, RecipeQuery};
///
/// let query = RecipeQuery::from_clauses(vec![RecipeClause::MaxPrepTime(20)]);
/// let (sql, params) = RecipeFilterQueryBuilder::new(&query, 0).build();
/// // sql: "r.prep_time_minutes <= $1"
/// ```
pub struct RecipeFilterQueryBuilder<'a> {
    query: &'a RecipeQuery,
    param_offset: usize,
}

impl<'a> RecipeFilterQueryBuilder<'a> {
    /// `param_offset` is the number of parameters already bound before the
    /// WHERE clause.
    pub fn new(query: &'a RecipeQuery, param_offset: usize) -> Self {
        Self {
            query,
            param_offset,
        }
    }

    pub fn build(&self) -> (String, Vec<QueryParam>) {
        let mut fragments = Vec::with_capacity(self.query.len());
        let mut params = Vec::new();
        let mut idx = self.param_offset;

        for clause in self.query.clauses() {
            let fragment = match clause {
                RecipeClause::Text(text) => {
                    idx += 1;
                    params.push(QueryParam::String(contains_pattern(text)));
                    format!(
                        "(r.name ILIKE ${idx} ESCAPE '\\' OR r.description ILIKE ${idx} ESCAPE '\\')"
                    )
                }
                RecipeClause::AuthorIn(ids) if ids.is_empty() => "FALSE".to_string(),
                RecipeClause::AuthorIn(ids) => {
                    idx += 1;
                    params.push(QueryParam::UuidArray(ids.clone()));
                    format!("r.author_id = ANY(${idx}::uuid[])")
                }
                RecipeClause::CategoryIn(names) => {
                    idx += 1;
                    params.push(QueryParam::StringArray(names.clone()));
                    format!(
                        "EXISTS (SELECT 1 FROM recipe_category rc JOIN category c ON c.id = rc.category_id WHERE rc.recipe_id = r.id AND c.name = ANY(${idx}::text[]))"
                    )
                }
                RecipeClause::Ingredient { fragment, include } => {
                    idx += 1;
                    params.push(QueryParam::String(contains_pattern(fragment)));
                    let negation = if *include { "" } else { "NOT " };
                    format!(
                        "{negation}EXISTS (SELECT 1 FROM jsonb_array_elements(r.ingredients) AS ing WHERE ing->>'name' ILIKE ${idx} ESCAPE '\\')"
                    )
                }
                RecipeClause::MaxPrepTime(max) => {
                    idx += 1;
                    params.push(QueryParam::Int(*max));
                    format!("r.prep_time_minutes <= ${idx}")
                }
                RecipeClause::MinRating(min) => {
                    idx += 1;
                    params.push(QueryParam::Float(*min));
                    format!("r.average_rating >= ${idx}")
                }
            };
            fragments.push(fragment);
        }

        let sql = if fragments.is_empty() {
            "TRUE".to_string()
        } else {
            fragments.join(" AND ")
        };
        (sql, params)
    }
}

fn contains_pattern(fragment: &str) -> String {
    format!("%{}%", escape_like(fragment))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(clauses: Vec<RecipeClause>) -> (String, Vec<QueryParam>) {
        let query = RecipeQuery::from_clauses(clauses);
        RecipeFilterQueryBuilder::new(&query, 0).build()
    }

    #[test]
    fn test_empty_query_returns_true() {
        let (sql, params) = build(vec![]);
        assert_eq!(sql, "TRUE");
        assert!(params.is_empty());
    }

    #[test]
    fn test_text_clause_reuses_one_parameter() {
        let (sql, params) = build(vec![RecipeClause::Text("soup".into())]);
        assert_eq!(
            sql,
            "(r.name ILIKE $1 ESCAPE '\\' OR r.description ILIKE $1 ESCAPE '\\')"
        );
        assert_eq!(params, vec![QueryParam::String("%soup%".into())]);
    }

    #[test]
    fn test_text_wildcards_escaped() {
        let (_, params) = build(vec![RecipeClause::Text("100%_pure".into())]);
        assert_eq!(params, vec![QueryParam::String("%100\\%\\_pure%".into())]);
    }

    #[test]
    fn test_empty_author_set_renders_false() {
        let (sql, params) = build(vec![RecipeClause::AuthorIn(vec![])]);
        assert_eq!(sql, "FALSE");
        assert!(params.is_empty());
    }

    #[test]
    fn test_author_set_uses_any() {
        let id = Uuid::new_v4();
        let (sql, params) = build(vec![RecipeClause::AuthorIn(vec![id])]);
        assert_eq!(sql, "r.author_id = ANY($1::uuid[])");
        assert_eq!(params, vec![QueryParam::UuidArray(vec![id])]);
    }

    #[test]
    fn test_category_clause_matches_by_name() {
        let (sql, params) = build(vec![RecipeClause::CategoryIn(vec!["Soup".into()])]);
        assert!(sql.starts_with("EXISTS (SELECT 1 FROM recipe_category rc JOIN category c"));
        assert!(sql.contains("c.name = ANY($1::text[])"));
        assert_eq!(params, vec![QueryParam::StringArray(vec!["Soup".into()])]);
    }

    #[test]
    fn test_ingredient_inclusion_and_exclusion() {
        let (sql, _) = build(vec![RecipeClause::Ingredient {
            fragment: "egg".into(),
            include: true,
        }]);
        assert!(sql.starts_with("EXISTS (SELECT 1 FROM jsonb_array_elements(r.ingredients)"));

        let (sql, params) = build(vec![RecipeClause::Ingredient {
            fragment: "egg".into(),
            include: false,
        }]);
        assert!(sql.starts_with("NOT EXISTS ("));
        assert_eq!(params, vec![QueryParam::String("%egg%".into())]);
    }

    #[test]
    fn test_numeric_bounds() {
        let (sql, params) = build(vec![
            RecipeClause::MaxPrepTime(20),
            RecipeClause::MinRating(3.5),
        ]);
        assert_eq!(
            sql,
            "r.prep_time_minutes <= $1 AND r.average_rating >= $2"
        );
        assert_eq!(params, vec![QueryParam::Int(20), QueryParam::Float(3.5)]);
    }

    #[test]
    fn test_param_offset_respected() {
        let query = RecipeQuery::from_clauses(vec![
            RecipeClause::MaxPrepTime(10),
            RecipeClause::AuthorIn(vec![]),
            RecipeClause::MinRating(1.0),
        ]);
        let (sql, params) = RecipeFilterQueryBuilder::new(&query, 2).build();
        assert_eq!(
            sql,
            "r.prep_time_minutes <= $3 AND FALSE AND r.average_rating >= $4"
        );
        assert_eq!(params.len(), 2);
    }
}
