//! # recetario-core
//!
//! Core types, traits, and abstractions for recetario.
//!
//! This crate provides the domain models, the error type, the pure search
//! and rating logic, and the trait definitions that the storage and serving
//! crates depend on.
//!
//! ## Log fields
//!
//! Every crate logs with the same structured field names so aggregation can
//! query across subsystems: `subsystem` (one of `search`, `ratings`,
//! `catalogue`, `database`), `component`, `op`, `recipe_id`, `rating_id`,
//! `caller_id`, `duration_ms`, `result_count`, `total`, `clause_count`,
//! `average`, `pool_size` and `pool_idle`.
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), writes |
//! | DEBUG | Decision points, filter composition, page bounds |

pub mod defaults;
pub mod error;
pub mod filter;
pub mod models;
pub mod pagination;
pub mod rating;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use filter::{RawSearchParams, RecipeClause, RecipeQuery, SearchFilters};
pub use models::*;
pub use pagination::{total_pages, PageRequest, Paginated, RecipeResultsPage};
pub use rating::{average_from_totals, average_of, RatingSubmission};
pub use traits::*;
