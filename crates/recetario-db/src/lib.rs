//! # recetario-db
//!
//! PostgreSQL database layer for recetario.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for recipes and ratings
//! - User, category, and favorite lookups
//! - SQL rendering of recipe search clauses
//! - An in-memory backend implementing the same traits
//!
//! ## Example
//!
//! ```rust,ignore
//! use recetario_db::{Database, RecipeRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/recetario").await?;
//!     let latest = db.recipes.latest(10).await?;
//!     println!("{} recipes", latest.len());
//!     Ok(())
//! }
//! ```
pub mod categories;
pub mod favorites;
pub mod memory;
pub mod pool;
pub mod ratings;
pub mod recipe_filter;
pub mod recipes;
pub mod users;

// Always compiled so integration tests and downstream crates can use it.
pub mod test_fixtures;

use std::sync::Arc;

// Re-export core types
pub use recetario_core::*;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Map a write error, turning a foreign-key violation into a validation
/// error on `field`. Anything else stays a (retryable) database error.
pub(crate) fn reference_error(field: &'static str) -> impl FnOnce(sqlx::Error) -> Error {
    move |err| match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            Error::validation(field, "references an unknown record")
        }
        _ => Error::Database(err),
    }
}

pub use categories::PgCategoryDirectory;
pub use favorites::PgFavoritesService;
pub use memory::MemoryStore;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use ratings::PgRatingRepository;
pub use recipe_filter::{QueryParam, RecipeFilterQueryBuilder};
pub use recipes::PgRecipeRepository;
pub use users::PgUserDirectory;

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    pub recipes: PgRecipeRepository,
    pub ratings: PgRatingRepository,
    pub users: PgUserDirectory,
    pub categories: PgCategoryDirectory,
    pub favorites: PgFavoritesService,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            recipes: PgRecipeRepository::new(pool.clone()),
            ratings: PgRatingRepository::new(pool.clone()),
            users: PgUserDirectory::new(pool.clone()),
            categories: PgCategoryDirectory::new(pool.clone()),
            favorites: PgFavoritesService::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Expose every repository as the trait objects the services consume.
    pub fn backends(&self) -> Backends {
        Backends {
            recipes: Arc::new(self.recipes.clone()),
            ratings: Arc::new(self.ratings.clone()),
            users: Arc::new(self.users.clone()),
            categories: Arc::new(self.categories.clone()),
            favorites: Arc::new(self.favorites.clone()),
        }
    }
}
