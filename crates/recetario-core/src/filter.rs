//! Recipe search filters and the clauses they compile to.
//!
//! A search request carries a sparse set of optional fields. Each field
//! contributes at most one [`RecipeClause`]; a [`RecipeQuery`] is the AND of
//! its clauses and matches every recipe when it has none.
//!
//! # Example
//!
//! ```
//! use recetario_core::filter::{RawSearchParams, SearchFilters};
//!
//! let raw = RawSearchParams {
//!     ingredient: Some("tomato".into()),
//!     max_prep_time: Some("20".into()),
//!     ..Default::default()
//! };
//! let filters = SearchFilters::from_raw(&raw);
//! assert_eq!(filters.static_clauses().len(), 2);
//! ```

use serde::Deserialize;
use uuid::Uuid;

use crate::defaults::MAX_CATEGORY_FILTERS;
use crate::models::Recipe;

// =============================================================================
// RAW REQUEST PARAMETERS
// =============================================================================

/// Search parameters exactly as they arrive on the query string.
///
/// Every field is kept as text so one malformed value never rejects the
/// whole request. Categories may arrive comma-separated, as repeated
/// `categorias` keys, or as `categorias[]` keys; all forms accumulate.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RawSearchParams {
    /// Free text matched against name and description.
    #[serde(rename = "texto")]
    pub text: Option<String>,
    /// Author display-name fragment.
    #[serde(rename = "autor")]
    pub author: Option<String>,
    /// Category names, each value possibly comma-separated.
    #[serde(rename = "categorias", alias = "categorias[]", default)]
    pub categories: Vec<String>,
    /// Ingredient name fragment.
    #[serde(rename = "ingrediente")]
    pub ingredient: Option<String>,
    /// `false` turns the ingredient filter into an exclusion.
    #[serde(rename = "incluirIngrediente")]
    pub include_ingredient: Option<String>,
    /// Maximum preparation time in minutes.
    #[serde(rename = "tiempoPreparacion")]
    pub max_prep_time: Option<String>,
    /// Minimum average rating.
    #[serde(rename = "valoracion")]
    pub min_rating: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl RawSearchParams {
    /// Collect parameters from decoded query-string pairs.
    ///
    /// Category values accumulate across repeated keys. For every other key
    /// the first non-blank value wins, so a trailing empty duplicate cannot
    /// clear a filter. Unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut raw = Self::default();
        for (key, value) in pairs {
            let value = value.into();
            let slot = match key.as_ref() {
                "categorias" | "categorias[]" => {
                    raw.categories.push(value);
                    continue;
                }
                "texto" => &mut raw.text,
                "autor" => &mut raw.author,
                "ingrediente" => &mut raw.ingredient,
                "incluirIngrediente" => &mut raw.include_ingredient,
                "tiempoPreparacion" => &mut raw.max_prep_time,
                "valoracion" => &mut raw.min_rating,
                "page" => &mut raw.page,
                "limit" => &mut raw.limit,
                _ => continue,
            };
            if slot.as_deref().map_or(true, |s| s.trim().is_empty()) {
                *slot = Some(value);
            }
        }
        raw
    }
}

// =============================================================================
// TYPED FILTERS
// =============================================================================

/// Parsed, typed search filters. `None` or empty means no constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilters {
    pub text: Option<String>,
    pub author: Option<String>,
    pub categories: Vec<String>,
    pub ingredient: Option<String>,
    pub include_ingredient: bool,
    pub max_prep_time: Option<i32>,
    pub min_rating: Option<f64>,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            text: None,
            author: None,
            categories: Vec::new(),
            ingredient: None,
            include_ingredient: true,
            max_prep_time: None,
            min_rating: None,
        }
    }
}

impl SearchFilters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse raw parameters leniently. Malformed fields count as absent.
    pub fn from_raw(raw: &RawSearchParams) -> Self {
        Self {
            text: non_blank(raw.text.as_deref()),
            author: non_blank(raw.author.as_deref()),
            categories: split_categories(raw.categories.iter().map(String::as_str)),
            ingredient: non_blank(raw.ingredient.as_deref()),
            include_ingredient: raw
                .include_ingredient
                .as_deref()
                .and_then(parse_flag)
                .unwrap_or(true),
            max_prep_time: raw
                .max_prep_time
                .as_deref()
                .and_then(|s| s.trim().parse::<i32>().ok()),
            min_rating: raw
                .min_rating
                .as_deref()
                .and_then(|s| s.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite()),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_categories<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ingredient(mut self, fragment: impl Into<String>, include: bool) -> Self {
        self.ingredient = Some(fragment.into());
        self.include_ingredient = include;
        self
    }

    pub fn with_max_prep_time(mut self, minutes: i32) -> Self {
        self.max_prep_time = Some(minutes);
        self
    }

    pub fn with_min_rating(mut self, rating: f64) -> Self {
        self.min_rating = Some(rating);
        self
    }

    pub fn text_clause(&self) -> Option<RecipeClause> {
        self.text.clone().map(RecipeClause::Text)
    }

    pub fn category_clause(&self) -> Option<RecipeClause> {
        if self.categories.is_empty() {
            None
        } else {
            Some(RecipeClause::CategoryIn(self.categories.clone()))
        }
    }

    pub fn ingredient_clause(&self) -> Option<RecipeClause> {
        self.ingredient.clone().map(|fragment| RecipeClause::Ingredient {
            fragment,
            include: self.include_ingredient,
        })
    }

    pub fn prep_time_clause(&self) -> Option<RecipeClause> {
        self.max_prep_time.map(RecipeClause::MaxPrepTime)
    }

    pub fn rating_clause(&self) -> Option<RecipeClause> {
        self.min_rating.map(RecipeClause::MinRating)
    }

    /// Every clause that needs no lookup. The author clause is resolved
    /// separately because it depends on the user directory.
    pub fn static_clauses(&self) -> Vec<RecipeClause> {
        [
            self.text_clause(),
            self.category_clause(),
            self.ingredient_clause(),
            self.prep_time_clause(),
            self.rating_clause(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn split_categories<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let split = values.flat_map(|v| v.split(',')).map(str::trim);
    for name in split.filter(|s| !s.is_empty()) {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
        if names.len() == MAX_CATEGORY_FILTERS {
            break;
        }
    }
    names
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

// =============================================================================
// CLAUSES
// =============================================================================

/// One independent constraint on recipes.
#[derive(Debug, Clone, PartialEq)]
pub enum RecipeClause {
    /// Case-insensitive substring of name or description.
    Text(String),
    /// Author is one of these users. An empty set matches nothing.
    AuthorIn(Vec<Uuid>),
    /// At least one category whose name is in this set.
    CategoryIn(Vec<String>),
    /// Some ingredient name contains the fragment (or none does).
    Ingredient { fragment: String, include: bool },
    /// Prep time at most this many minutes.
    MaxPrepTime(i32),
    /// Average rating at least this value.
    MinRating(f64),
}

impl RecipeClause {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RecipeClause::Text(_) => "text",
            RecipeClause::AuthorIn(_) => "author",
            RecipeClause::CategoryIn(_) => "category",
            RecipeClause::Ingredient { .. } => "ingredient",
            RecipeClause::MaxPrepTime(_) => "prep_time",
            RecipeClause::MinRating(_) => "rating",
        }
    }

    /// Evaluate against a recipe whose category names are already resolved.
    pub fn matches(&self, recipe: &Recipe, category_names: &[String]) -> bool {
        match self {
            RecipeClause::Text(text) => {
                contains_ci(&recipe.name, text) || contains_ci(&recipe.description, text)
            }
            RecipeClause::AuthorIn(ids) => ids.contains(&recipe.author_id),
            RecipeClause::CategoryIn(names) => category_names.iter().any(|c| names.contains(c)),
            RecipeClause::Ingredient { fragment, include } => {
                let present = recipe
                    .ingredients
                    .iter()
                    .any(|i| contains_ci(&i.name, fragment));
                present == *include
            }
            RecipeClause::MaxPrepTime(max) => recipe.prep_time_minutes <= *max,
            RecipeClause::MinRating(min) => recipe.average_rating >= *min,
        }
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Conjunction of clauses. Empty matches every recipe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeQuery {
    clauses: Vec<RecipeClause>,
}

impl RecipeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_clauses(clauses: Vec<RecipeClause>) -> Self {
        Self { clauses }
    }

    pub fn push(&mut self, clause: RecipeClause) {
        self.clauses.push(clause);
    }

    pub fn clauses(&self) -> &[RecipeClause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn matches(&self, recipe: &Recipe, category_names: &[String]) -> bool {
        self.clauses
            .iter()
            .all(|c| c.matches(recipe, category_names))
    }
}
