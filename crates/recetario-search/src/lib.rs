//! # recetario-search
//!
//! Recipe search for recetario.
//!
//! This crate provides:
//! - [`FilterBuilder`]: turns sparse search filters into a clause conjunction,
//!   resolving author name fragments through the user directory
//! - [`SearchExecutor`]: counts and fetches one page of matches, then
//!   resolves display names and favorites in batch
//!
//! ## Example
//!
//! ```ignore
//! use recetario_search::SearchExecutor;
//! use recetario_core::{PageRequest, SearchFilters};
//!
//! let executor = SearchExecutor::new(db.backends());
//! let page = executor
//!     .search(
//!         &SearchFilters::new().with_ingredient("tomato", true).with_max_prep_time(20),
//!         PageRequest::default(),
//!         None,
//!     )
//!     .await?;
//! ```

pub mod executor;
pub mod filter_builder;

// Re-export core types
pub use recetario_core::*;

pub use executor::{SearchExecutor, UNKNOWN_AUTHOR};
pub use filter_builder::{FilterBuilder, FilterOutcome};
