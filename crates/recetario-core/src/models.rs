//! Core data models for recetario.
//!
//! These types are shared across all recetario crates and represent
//! the core domain entities plus their public (serialized) shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

// =============================================================================
// RECIPE TYPES
// =============================================================================

/// Measurement unit of an ingredient quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Gram,
    Kilogram,
    Unit,
    Tablespoon,
    Teaspoon,
}

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Ingredient {
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
}

/// One preparation step of a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Step {
    pub order: i32,
    pub description: String,
    #[serde(default)]
    pub media: Vec<String>,
}

/// A published recipe as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    pub servings: i32,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<Step>,
    pub category_ids: Vec<Uuid>,
    pub media: Vec<String>,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub prep_time_minutes: i32,
    /// Denormalized mean of all rating scores, one decimal; 0 when unrated.
    pub average_rating: f64,
}

/// Request for publishing a new recipe.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipeRequest {
    pub name: String,
    #[serde(default = "default_servings")]
    pub servings: i32,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub categories: Vec<Uuid>,
    #[serde(default)]
    pub media: Vec<String>,
    #[serde(default)]
    pub prep_time_minutes: i32,
}

fn default_servings() -> i32 {
    1
}

impl CreateRecipeRequest {
    /// Check every field constraint, naming the first one violated.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("name", "must not be empty"));
        }
        if self.description.trim().is_empty() {
            return Err(Error::validation("description", "must not be empty"));
        }
        if self.servings < 1 {
            return Err(Error::validation("servings", "must be at least 1"));
        }
        if self.prep_time_minutes < 0 {
            return Err(Error::validation("prepTimeMinutes", "must not be negative"));
        }
        if self.ingredients.is_empty() {
            return Err(Error::validation("ingredients", "at least one is required"));
        }
        for (idx, ingredient) in self.ingredients.iter().enumerate() {
            if ingredient.name.trim().is_empty() {
                return Err(Error::validation(
                    format!("ingredients[{}].name", idx),
                    "must not be empty",
                ));
            }
            if !(ingredient.quantity.is_finite() && ingredient.quantity > 0.0) {
                return Err(Error::validation(
                    format!("ingredients[{}].quantity", idx),
                    "must be greater than 0",
                ));
            }
        }
        if self.steps.is_empty() {
            return Err(Error::validation("steps", "at least one is required"));
        }
        Ok(())
    }
}

// =============================================================================
// CATEGORY TYPES
// =============================================================================

/// A recipe category. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

// =============================================================================
// RATING TYPES
// =============================================================================

/// One user's score and comment for one recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub author_id: Uuid,
    pub score: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Result of persisting a rating and recomputing its recipe's average.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingWrite {
    pub rating: Rating,
    /// True when the (recipe, author) pair had no rating before this write.
    pub created: bool,
    pub average: f64,
    pub total_ratings: i64,
}

// =============================================================================
// PUBLIC SHAPES
// =============================================================================

/// Public recipe shape returned by search and lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    pub id: Uuid,
    pub name: String,
    pub servings: i32,
    pub description: String,
    pub ingredients: Vec<Ingredient>,
    pub steps: Vec<Step>,
    pub media: Vec<String>,
    pub categories: Vec<String>,
    pub author_display_name: String,
    pub created_at: DateTime<Utc>,
    pub prep_time_minutes: i32,
    pub average_rating: f64,
    /// Present only when the request carried a caller identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorited: Option<bool>,
}

impl RecipeSummary {
    /// Format a stored recipe with its resolved display data.
    pub fn from_recipe(
        recipe: Recipe,
        author_display_name: String,
        categories: Vec<String>,
        favorited: Option<bool>,
    ) -> Self {
        Self {
            id: recipe.id,
            name: recipe.name,
            servings: recipe.servings.max(1),
            description: recipe.description,
            ingredients: recipe.ingredients,
            steps: recipe.steps,
            media: recipe.media,
            categories,
            author_display_name,
            created_at: recipe.created_at,
            prep_time_minutes: recipe.prep_time_minutes,
            average_rating: recipe.average_rating,
            favorited,
        }
    }
}

/// Public rating shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub author_display_name: String,
    pub score: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RatingSummary {
    pub fn from_rating(rating: Rating, author_display_name: String) -> Self {
        Self {
            id: rating.id,
            recipe_id: rating.recipe_id,
            author_display_name,
            score: rating.score,
            comment: rating.comment,
            created_at: rating.created_at,
        }
    }
}

/// Response of a rating submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingOutcome {
    pub rating: RatingSummary,
    pub average: f64,
    pub total_ratings: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateRecipeRequest {
        CreateRecipeRequest {
            name: "Tomato soup".to_string(),
            servings: 2,
            description: "Warm and simple".to_string(),
            ingredients: vec![Ingredient {
                name: "Tomato".to_string(),
                quantity: 500.0,
                unit: Unit::Gram,
            }],
            steps: vec![Step {
                order: 1,
                description: "Simmer".to_string(),
                media: vec![],
            }],
            categories: vec![],
            media: vec![],
            prep_time_minutes: 20,
        }
    }

    #[test]
    fn test_unit_rejects_unknown() {
        assert!(serde_json::from_str::<Unit>("\"cup\"").is_err());
        assert!(serde_json::from_str::<Unit>("\"Gram\"").is_err());
    }

    #[test]
    fn test_unit_serializes_lowercase() {
        let json = serde_json::to_string(&Unit::Kilogram).unwrap();
        assert_eq!(json, "\"kilogram\"");
    }

    #[test]
    fn test_create_request_valid() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_zero_servings() {
        let mut req = valid_request();
        req.servings = 0;
        let err = req.validate().unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "servings"));
    }

    #[test]
    fn test_create_request_rejects_non_positive_quantity() {
        let mut req = valid_request();
        req.ingredients[0].quantity = 0.0;
        let err = req.validate().unwrap_err();
        assert_eq!(err.to_string(), "Invalid ingredients[0].quantity: must be greater than 0");
    }

    #[test]
    fn test_create_request_rejects_negative_prep_time() {
        let mut req = valid_request();
        req.prep_time_minutes = -5;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_request_defaults_from_json() {
        let req: CreateRecipeRequest = serde_json::from_str(
            r#"{
                "name": "Toast",
                "description": "Bread, heated",
                "ingredients": [{"name": "bread", "quantity": 1, "unit": "unit"}],
                "steps": [{"order": 1, "description": "Toast it"}]
            }"#,
        )
        .unwrap();
        assert_eq!(req.servings, 1);
        assert_eq!(req.prep_time_minutes, 0);
        assert!(req.steps[0].media.is_empty());
    }

    #[test]
    fn test_summary_omits_favorited_for_anonymous() {
        let summary = RecipeSummary {
            id: Uuid::nil(),
            name: "Toast".into(),
            servings: 1,
            description: String::new(),
            ingredients: vec![],
            steps: vec![],
            media: vec![],
            categories: vec![],
            author_display_name: "ana".into(),
            created_at: Utc::now(),
            prep_time_minutes: 0,
            average_rating: 0.0,
            favorited: None,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert!(json.get("favorited").is_none());
        assert_eq!(json["authorDisplayName"], "ana");
        assert!(json.get("prepTimeMinutes").is_some());
    }
}
