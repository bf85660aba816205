//! Rating validation and average computation.

use uuid::Uuid;

use crate::defaults::{MAX_COMMENT_CHARS, MAX_SCORE, MIN_SCORE};
use crate::error::{Error, Result};

/// A validated request to create or replace one user's rating of one recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingSubmission {
    pub recipe_id: Uuid,
    pub author_id: Uuid,
    pub score: i16,
    pub comment: Option<String>,
}

impl RatingSubmission {
    /// Validate raw submission inputs.
    ///
    /// Checks run in order: score, recipe id, author id, comment.
    pub fn new(
        recipe_id: Uuid,
        author_id: Uuid,
        score: i64,
        comment: Option<String>,
    ) -> Result<Self> {
        let score = validate_score(score)?;
        if recipe_id.is_nil() {
            return Err(Error::validation("recipeId", "must be a valid identifier"));
        }
        if author_id.is_nil() {
            return Err(Error::validation("authorId", "must be a valid identifier"));
        }
        let comment = normalize_comment(comment)?;
        Ok(Self {
            recipe_id,
            author_id,
            score,
            comment,
        })
    }
}

/// Accept integer scores in 1..=5.
pub fn validate_score(score: i64) -> Result<i16> {
    if !(i64::from(MIN_SCORE)..=i64::from(MAX_SCORE)).contains(&score) {
        return Err(Error::validation(
            "score",
            format!("must be between {} and {}", MIN_SCORE, MAX_SCORE),
        ));
    }
    Ok(score as i16)
}

/// Trim a comment, drop it when blank, reject it when too long.
pub fn normalize_comment(comment: Option<String>) -> Result<Option<String>> {
    let Some(raw) = comment else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_COMMENT_CHARS {
        return Err(Error::validation(
            "comment",
            format!("must be at most {} characters", MAX_COMMENT_CHARS),
        ));
    }
    Ok(Some(trimmed.to_string()))
}

/// Arithmetic mean rounded half-up to one decimal; 0 when `count` is 0.
///
/// Works on integer tenths so results never drift with float representation.
pub fn average_from_totals(sum: i64, count: i64) -> f64 {
    if count <= 0 {
        return 0.0;
    }
    let tenths = (sum * 20 + count) / (2 * count);
    tenths as f64 / 10.0
}

/// Convenience over [`average_from_totals`] for an in-memory score list.
pub fn average_of(scores: &[i16]) -> f64 {
    let sum: i64 = scores.iter().map(|s| i64::from(*s)).sum();
    average_from_totals(sum, scores.len() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bounds() {
        assert_eq!(validate_score(1).unwrap(), 1);
        assert_eq!(validate_score(5).unwrap(), 5);
        assert!(validate_score(0).is_err());
        assert!(validate_score(6).is_err());
        assert!(validate_score(-1).is_err());
        assert!(validate_score(i64::MAX).is_err());
    }

    #[test]
    fn test_score_error_names_field() {
        let err = validate_score(7).unwrap_err();
        assert_eq!(err.to_string(), "Invalid score: must be between 1 and 5");
    }

    #[test]
    fn test_comment_trimmed_and_blank_dropped() {
        assert_eq!(normalize_comment(None).unwrap(), None);
        assert_eq!(normalize_comment(Some("   ".into())).unwrap(), None);
        assert_eq!(
            normalize_comment(Some("  tasty  ".into())).unwrap(),
            Some("tasty".to_string())
        );
    }

    #[test]
    fn test_comment_length_counts_characters() {
        let exactly = "ñ".repeat(MAX_COMMENT_CHARS);
        assert!(normalize_comment(Some(exactly)).is_ok());

        let over = "a".repeat(MAX_COMMENT_CHARS + 1);
        let err = normalize_comment(Some(over)).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "comment"));
    }

    #[test]
    fn test_submission_checks_score_first() {
        let err = RatingSubmission::new(Uuid::nil(), Uuid::nil(), 9, None).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "score"));
    }

    #[test]
    fn test_submission_rejects_nil_ids() {
        let err = RatingSubmission::new(Uuid::nil(), Uuid::new_v4(), 3, None).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "recipeId"));

        let err = RatingSubmission::new(Uuid::new_v4(), Uuid::nil(), 3, None).unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "authorId"));
    }

    #[test]
    fn test_average_empty_is_zero() {
        assert_eq!(average_from_totals(0, 0), 0.0);
        assert_eq!(average_of(&[]), 0.0);
    }

    #[test]
    fn test_average_sequence_of_ratings() {
        // First rating 4, then 4 and 4, then 4, 4 and 2.
        assert_eq!(average_of(&[4]), 4.0);
        assert_eq!(average_of(&[4, 4]), 4.0);
        assert_eq!(average_of(&[4, 4, 2]), 3.3);
    }

    #[test]
    fn test_average_after_update_replaces_score() {
        // Scores {3, 5, 2}: 10 / 3 = 3.33...
        assert_eq!(average_of(&[3, 5, 2]), 3.3);
    }

    #[test]
    fn test_average_rounds_half_up() {
        assert_eq!(average_from_totals(9, 2), 4.5);
        assert_eq!(average_from_totals(11, 3), 3.7);
        assert_eq!(average_from_totals(1, 4), 0.3);
        assert_eq!(average_from_totals(5, 4), 1.3);
    }

    #[test]
    fn test_average_stays_in_score_range() {
        assert_eq!(average_of(&[1, 1, 1]), 1.0);
        assert_eq!(average_of(&[5, 5, 5, 5]), 5.0);
    }
}
