//! Default values and hard limits shared across crates.

/// Page number used when the request omits it or sends garbage.
pub const DEFAULT_PAGE: i64 = 1;

/// Page size used when the request omits it or sends garbage.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Smallest accepted page size.
pub const MIN_PAGE_SIZE: i64 = 1;

/// Largest accepted page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Number of recipes returned by the "latest recipes" listing.
pub const LATEST_RECIPES_LIMIT: i64 = 10;

/// Lowest valid rating score.
pub const MIN_SCORE: i16 = 1;

/// Highest valid rating score.
pub const MAX_SCORE: i16 = 5;

/// Maximum rating comment length, in characters.
pub const MAX_COMMENT_CHARS: usize = 500;

/// Maximum number of category names accepted in one search.
pub const MAX_CATEGORY_FILTERS: usize = 50;
