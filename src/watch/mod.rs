use crate::error::Result;
use crate::listing::{Listing, ListingId};
use crate::user::UserId;
use async_trait::async_trait;

/// Set of `(user, listing)` watch pairs.
#[async_trait]
pub trait WatchRegistry {
    async fn is_watching(&self, user: UserId, listing_id: ListingId) -> Result<bool>;

    /// Flips membership and returns the new state. Fails with `NotFound` if
    /// the listing does not exist.
    async fn toggle_watch(&self, user: UserId, listing_id: ListingId) -> Result<bool>;

    async fn list_watched(&self, user: UserId) -> Result<Vec<Listing>>;
}
