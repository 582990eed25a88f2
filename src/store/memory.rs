//! In-process store. All tables sit behind one lock; every mutating call
//! holds the write guard across its check and its write.

// region:    --- Imports
use crate::bidding::ledger::{self, BidLedger};
use crate::bidding::Bid;
use crate::comment::{Comment, CommentLog};
use crate::error::{AuctionError, Result};
use crate::listing::{Listing, ListingId, ListingStore, NewListing};
use crate::user::{User, UserDirectory, UserId};
use crate::watch::WatchRegistry;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use tokio::sync::RwLock;
// endregion: --- Imports

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    listings: Vec<Listing>,
    bids: Vec<Bid>,
    comments: Vec<Comment>,
    watches: HashSet<(UserId, ListingId)>,
}

impl Tables {
    fn listing(&self, id: ListingId) -> Result<&Listing> {
        self.listings
            .iter()
            .find(|listing| listing.id == id)
            .ok_or_else(|| AuctionError::not_found("listing", id))
    }

    fn listing_mut(&mut self, id: ListingId) -> Result<&mut Listing> {
        self.listings
            .iter_mut()
            .find(|listing| listing.id == id)
            .ok_or_else(|| AuctionError::not_found("listing", id))
    }

    fn bids_for(&self, listing_id: ListingId) -> impl Iterator<Item = &Bid> {
        self.bids
            .iter()
            .filter(move |bid| bid.listing_id == listing_id)
    }

    fn minimum(&self, listing: &Listing) -> i64 {
        ledger::minimum_from(
            listing.starting_price,
            ledger::leading_bid(self.bids_for(listing.id)),
        )
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// region:    --- Users
#[async_trait]
impl UserDirectory for MemoryStore {
    async fn register_user(&self, name: &str) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|user| user.name == name) {
            return Err(AuctionError::validation("name", "already taken"));
        }
        let user = User {
            id: tables.users.len() as UserId + 1,
            name: name.to_string(),
            joined_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: UserId) -> Result<User> {
        self.tables
            .read()
            .await
            .users
            .iter()
            .find(|user| user.id == id)
            .cloned()
            .ok_or_else(|| AuctionError::not_found("user", id))
    }
}
// endregion: --- Users

// region:    --- Listings
#[async_trait]
impl ListingStore for MemoryStore {
    async fn create_listing(&self, owner: UserId, listing: NewListing) -> Result<Listing> {
        let mut tables = self.tables.write().await;
        let listing = Listing {
            id: tables.listings.len() as ListingId + 1,
            owner_id: owner,
            title: listing.title,
            description: listing.description,
            starting_price: listing.starting_price,
            category: listing.category,
            image_url: listing.image_url,
            active: true,
            created_at: Utc::now(),
        };
        tables.listings.push(listing.clone());
        Ok(listing)
    }

    async fn get_listing(&self, id: ListingId) -> Result<Listing> {
        self.tables.read().await.listing(id).cloned()
    }

    async fn close_listing(&self, id: ListingId, requester: UserId) -> Result<Listing> {
        let mut tables = self.tables.write().await;
        let listing = tables.listing_mut(id)?;
        if !listing.is_owned_by(requester) {
            return Err(AuctionError::Forbidden(format!(
                "only the owner may close listing {}",
                id
            )));
        }
        if !listing.active {
            return Err(AuctionError::AlreadyClosed(id));
        }
        listing.active = false;
        Ok(listing.clone())
    }

    async fn list_listings(&self) -> Result<Vec<Listing>> {
        Ok(self.tables.read().await.listings.clone())
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Listing>> {
        Ok(self
            .tables
            .read()
            .await
            .listings
            .iter()
            .filter(|listing| listing.category.as_deref() == Some(category))
            .cloned()
            .collect())
    }
}
// endregion: --- Listings

// region:    --- Bids
#[async_trait]
impl BidLedger for MemoryStore {
    async fn record_bid(&self, listing_id: ListingId, bidder: UserId, amount: i64) -> Result<Bid> {
        let mut tables = self.tables.write().await;
        let listing = tables.listing(listing_id)?;
        let minimum = tables.minimum(listing);
        ledger::check_bid(listing, minimum, amount)?;

        let bid = Bid {
            id: tables.bids.len() as i64 + 1,
            listing_id,
            bidder_id: bidder,
            amount,
            placed_at: Utc::now(),
        };
        tables.bids.push(bid.clone());
        Ok(bid)
    }

    async fn list_bids(&self, listing_id: ListingId) -> Result<Vec<Bid>> {
        let tables = self.tables.read().await;
        tables.listing(listing_id)?;
        Ok(tables.bids_for(listing_id).cloned().collect())
    }

    async fn highest_bid(&self, listing_id: ListingId) -> Result<Option<Bid>> {
        let tables = self.tables.read().await;
        tables.listing(listing_id)?;
        Ok(ledger::leading_bid(tables.bids_for(listing_id)).cloned())
    }

    async fn current_minimum(&self, listing_id: ListingId) -> Result<i64> {
        let tables = self.tables.read().await;
        let listing = tables.listing(listing_id)?;
        Ok(tables.minimum(listing))
    }
}
// endregion: --- Bids

// region:    --- Comments
#[async_trait]
impl CommentLog for MemoryStore {
    async fn add_comment(
        &self,
        listing_id: ListingId,
        author: UserId,
        content: &str,
    ) -> Result<Comment> {
        let mut tables = self.tables.write().await;
        tables.listing(listing_id)?;
        let comment = Comment {
            id: tables.comments.len() as i64 + 1,
            listing_id,
            author_id: author,
            content: content.to_string(),
            posted_at: Utc::now(),
        };
        tables.comments.push(comment.clone());
        Ok(comment)
    }

    async fn list_comments(&self, listing_id: ListingId) -> Result<Vec<Comment>> {
        let tables = self.tables.read().await;
        tables.listing(listing_id)?;
        Ok(tables
            .comments
            .iter()
            .filter(|comment| comment.listing_id == listing_id)
            .cloned()
            .collect())
    }
}
// endregion: --- Comments

// region:    --- Watches
#[async_trait]
impl WatchRegistry for MemoryStore {
    async fn is_watching(&self, user: UserId, listing_id: ListingId) -> Result<bool> {
        Ok(self
            .tables
            .read()
            .await
            .watches
            .contains(&(user, listing_id)))
    }

    async fn toggle_watch(&self, user: UserId, listing_id: ListingId) -> Result<bool> {
        let mut tables = self.tables.write().await;
        tables.listing(listing_id)?;
        let key = (user, listing_id);
        if tables.watches.remove(&key) {
            Ok(false)
        } else {
            tables.watches.insert(key);
            Ok(true)
        }
    }

    async fn list_watched(&self, user: UserId) -> Result<Vec<Listing>> {
        let tables = self.tables.read().await;
        Ok(tables
            .listings
            .iter()
            .filter(|listing| tables.watches.contains(&(user, listing.id)))
            .cloned()
            .collect())
    }
}
// endregion: --- Watches

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (MemoryStore, User, Listing) {
        let store = MemoryStore::new();
        let owner = store.register_user("owner").await.unwrap();
        let listing = store
            .create_listing(
                owner.id,
                NewListing {
                    title: "Clock".to_string(),
                    description: "Grandfather clock".to_string(),
                    starting_price: 100,
                    category: Some("antiques".to_string()),
                    image_url: None,
                },
            )
            .await
            .unwrap();
        (store, owner, listing)
    }

    #[tokio::test]
    async fn duplicate_user_names_are_rejected() {
        let (store, _, _) = seeded().await;
        let err = store.register_user("owner").await.unwrap_err();
        assert!(matches!(err, AuctionError::Validation { field: "name", .. }));
    }

    #[tokio::test]
    async fn rejected_bid_leaves_ledger_untouched() {
        let (store, owner, listing) = seeded().await;
        assert!(store.record_bid(listing.id, owner.id, 100).await.is_err());
        assert!(store.list_bids(listing.id).await.unwrap().is_empty());
        assert_eq!(store.current_minimum(listing.id).await.unwrap(), 100);
    }

    #[tokio::test]
    async fn ledger_queries_fail_for_unknown_listing() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.current_minimum(42).await,
            Err(AuctionError::NotFound { id: 42, .. })
        ));
        assert!(matches!(
            store.highest_bid(42).await,
            Err(AuctionError::NotFound { .. })
        ));
        assert!(matches!(
            store.toggle_watch(1, 42).await,
            Err(AuctionError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn category_filter_matches_exactly() {
        let (store, _, listing) = seeded().await;
        let found = store.list_by_category("antiques").await.unwrap();
        assert_eq!(found, vec![listing]);
        assert!(store.list_by_category("Antiques").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_bids_cannot_both_beat_the_same_minimum() {
        let (store, _, listing) = seeded().await;
        let store = std::sync::Arc::new(store);
        let listing_id = listing.id;

        let mut handles = vec![];
        for bidder in 1..=20 {
            let store = std::sync::Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.record_bid(listing_id, bidder, 150).await.is_ok()
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);
        assert_eq!(store.list_bids(listing_id).await.unwrap().len(), 1);
    }
}
