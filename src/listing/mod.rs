pub mod model;

// region:    --- Imports
use crate::error::Result;
use crate::user::UserId;
use async_trait::async_trait;
pub use model::{Listing, ListingId, NewListing};
// endregion: --- Imports

/// Persisted auction listings and their open/closed lifecycle.
#[async_trait]
pub trait ListingStore {
    /// Stores an already validated listing; `active` starts `true`.
    async fn create_listing(&self, owner: UserId, listing: NewListing) -> Result<Listing>;

    async fn get_listing(&self, id: ListingId) -> Result<Listing>;

    /// `Open -> Closed`. Fails with `Forbidden` for anyone but the owner and
    /// with `AlreadyClosed` once closed.
    async fn close_listing(&self, id: ListingId, requester: UserId) -> Result<Listing>;

    /// All listings in insertion order.
    async fn list_listings(&self) -> Result<Vec<Listing>>;

    async fn list_by_category(&self, category: &str) -> Result<Vec<Listing>>;
}

/// Splits listings into `(active, closed)`, keeping their order.
pub fn partition_listings(listings: Vec<Listing>) -> (Vec<Listing>, Vec<Listing>) {
    listings.into_iter().partition(|listing| listing.active)
}

/// Distinct non-empty categories, sorted.
pub fn categories_of(listings: &[Listing]) -> Vec<String> {
    let mut categories: Vec<String> = listings
        .iter()
        .filter_map(|listing| listing.category.clone())
        .collect();
    categories.sort();
    categories.dedup();
    categories
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn listing(id: ListingId, active: bool, category: Option<&str>) -> Listing {
        Listing {
            id,
            owner_id: 1,
            title: format!("item {}", id),
            description: "desc".to_string(),
            starting_price: 10,
            category: category.map(str::to_string),
            image_url: None,
            active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn partition_keeps_insertion_order() {
        let (active, closed) = partition_listings(vec![
            listing(1, true, None),
            listing(2, false, None),
            listing(3, true, None),
        ]);
        assert_eq!(active.iter().map(|l| l.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(closed.iter().map(|l| l.id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn categories_are_distinct_and_sorted() {
        let listings = vec![
            listing(1, true, Some("toys")),
            listing(2, true, Some("books")),
            listing(3, false, Some("toys")),
            listing(4, true, None),
        ];
        assert_eq!(categories_of(&listings), vec!["books", "toys"]);
    }
}
