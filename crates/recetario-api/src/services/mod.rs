//! Service layer for business logic.

pub mod catalogue;
pub mod rating_aggregator;

pub use catalogue::Catalogue;
pub use rating_aggregator::{Rated, RatingAggregator};

use uuid::Uuid;

use recetario_core::{Error, Result, UserDirectory};

/// Display name of a caller who is about to write. A caller id that names
/// no registered user is a client error on `authorId`.
pub(crate) async fn registered_name(
    users: &dyn UserDirectory,
    caller_id: Uuid,
) -> Result<String> {
    users
        .display_names(&[caller_id])
        .await?
        .remove(&caller_id)
        .ok_or_else(|| Error::validation("authorId", "unknown user"))
}
