//! Postgres-backed store.
//!
//! Mutations that read-then-write (`record_bid`, `close_listing`,
//! `toggle_watch`) lock the listing row with `FOR UPDATE` inside their
//! transaction, so concurrent bids and closes on one listing serialize while
//! other listings proceed independently.

// region:    --- Imports
use super::queries;
use crate::bidding::ledger::{self, BidLedger};
use crate::bidding::Bid;
use crate::comment::{Comment, CommentLog};
use crate::database::DatabaseManager;
use crate::error::{AuctionError, Result};
use crate::listing::{Listing, ListingId, ListingStore, NewListing};
use crate::user::{User, UserDirectory, UserId};
use crate::watch::WatchRegistry;
use async_trait::async_trait;
use sqlx::Row;
use std::sync::Arc;
use tracing::{debug, info};
// endregion: --- Imports

pub struct PostgresStore {
    db: Arc<DatabaseManager>,
}

impl PostgresStore {
    pub fn new(db: Arc<DatabaseManager>) -> Self {
        Self { db }
    }

    async fn fetch_listing(&self, id: ListingId) -> Result<Listing> {
        sqlx::query_as::<_, Listing>(queries::GET_LISTING)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| AuctionError::not_found("listing", id))
    }

    async fn ensure_listing(&self, id: ListingId) -> Result<()> {
        let exists: bool = sqlx::query_scalar(queries::LISTING_EXISTS)
            .bind(id)
            .fetch_one(self.db.pool())
            .await?;
        if exists {
            Ok(())
        } else {
            Err(AuctionError::not_found("listing", id))
        }
    }
}

// region:    --- Users
#[async_trait]
impl UserDirectory for PostgresStore {
    async fn register_user(&self, name: &str) -> Result<User> {
        self.db
            .with_retry("register_user", || async move {
                sqlx::query_as::<_, User>(queries::INSERT_USER)
                    .bind(name)
                    .fetch_optional(self.db.pool())
                    .await?
                    .ok_or_else(|| AuctionError::validation("name", "already taken"))
            })
            .await
    }

    async fn get_user(&self, id: UserId) -> Result<User> {
        self.db
            .with_retry("get_user", || async move {
                sqlx::query_as::<_, User>(queries::GET_USER)
                    .bind(id)
                    .fetch_optional(self.db.pool())
                    .await?
                    .ok_or_else(|| AuctionError::not_found("user", id))
            })
            .await
    }
}
// endregion: --- Users

// region:    --- Listings
#[async_trait]
impl ListingStore for PostgresStore {
    async fn create_listing(&self, owner: UserId, listing: NewListing) -> Result<Listing> {
        let listing = &listing;
        let created = self
            .db
            .with_retry("create_listing", || async move {
                let created = sqlx::query_as::<_, Listing>(queries::INSERT_LISTING)
                    .bind(owner)
                    .bind(&listing.title)
                    .bind(&listing.description)
                    .bind(listing.starting_price)
                    .bind(&listing.category)
                    .bind(&listing.image_url)
                    .fetch_one(self.db.pool())
                    .await?;
                Ok(created)
            })
            .await?;
        debug!("{:<12} --> listing row {} inserted", "Postgres", created.id);
        Ok(created)
    }

    async fn get_listing(&self, id: ListingId) -> Result<Listing> {
        self.db
            .with_retry("get_listing", || self.fetch_listing(id))
            .await
    }

    async fn close_listing(&self, id: ListingId, requester: UserId) -> Result<Listing> {
        self.db
            .with_retry("close_listing", || {
                self.db.transaction(move |tx| {
                    Box::pin(async move {
                        let listing = sqlx::query_as::<_, Listing>(queries::LOCK_LISTING)
                            .bind(id)
                            .fetch_optional(&mut **tx)
                            .await?
                            .ok_or_else(|| AuctionError::not_found("listing", id))?;

                        if !listing.is_owned_by(requester) {
                            return Err(AuctionError::Forbidden(format!(
                                "only the owner may close listing {}",
                                id
                            )));
                        }

                        sqlx::query_as::<_, Listing>(queries::CLOSE_LISTING)
                            .bind(id)
                            .fetch_optional(&mut **tx)
                            .await?
                            .ok_or(AuctionError::AlreadyClosed(id))
                    })
                })
            })
            .await
    }

    async fn list_listings(&self) -> Result<Vec<Listing>> {
        self.db
            .with_retry("list_listings", || async move {
                Ok(sqlx::query_as::<_, Listing>(queries::GET_ALL_LISTINGS)
                    .fetch_all(self.db.pool())
                    .await?)
            })
            .await
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Listing>> {
        self.db
            .with_retry("list_by_category", || async move {
                Ok(sqlx::query_as::<_, Listing>(queries::GET_LISTINGS_BY_CATEGORY)
                    .bind(category)
                    .fetch_all(self.db.pool())
                    .await?)
            })
            .await
    }
}
// endregion: --- Listings

// region:    --- Bids
#[async_trait]
impl BidLedger for PostgresStore {
    async fn record_bid(&self, listing_id: ListingId, bidder: UserId, amount: i64) -> Result<Bid> {
        let bid = self
            .db
            .with_retry("record_bid", || {
                self.db.transaction(move |tx| {
                    Box::pin(async move {
                        let listing = sqlx::query_as::<_, Listing>(queries::LOCK_LISTING)
                            .bind(listing_id)
                            .fetch_optional(&mut **tx)
                            .await?
                            .ok_or_else(|| AuctionError::not_found("listing", listing_id))?;

                        let minimum: i64 = sqlx::query(queries::GET_CURRENT_MINIMUM)
                            .bind(listing_id)
                            .fetch_one(&mut **tx)
                            .await?
                            .get("minimum");

                        ledger::check_bid(&listing, minimum, amount)?;

                        Ok(sqlx::query_as::<_, Bid>(queries::INSERT_BID)
                            .bind(listing_id)
                            .bind(bidder)
                            .bind(amount)
                            .fetch_one(&mut **tx)
                            .await?)
                    })
                })
            })
            .await?;
        info!(
            "{:<12} --> bid {} committed on listing {}",
            "Postgres", bid.id, listing_id
        );
        Ok(bid)
    }

    async fn list_bids(&self, listing_id: ListingId) -> Result<Vec<Bid>> {
        self.db
            .with_retry("list_bids", || async move {
                self.ensure_listing(listing_id).await?;
                Ok(sqlx::query_as::<_, Bid>(queries::GET_BIDS)
                    .bind(listing_id)
                    .fetch_all(self.db.pool())
                    .await?)
            })
            .await
    }

    async fn highest_bid(&self, listing_id: ListingId) -> Result<Option<Bid>> {
        self.db
            .with_retry("highest_bid", || async move {
                self.ensure_listing(listing_id).await?;
                Ok(sqlx::query_as::<_, Bid>(queries::GET_HIGHEST_BID)
                    .bind(listing_id)
                    .fetch_optional(self.db.pool())
                    .await?)
            })
            .await
    }

    async fn current_minimum(&self, listing_id: ListingId) -> Result<i64> {
        self.db
            .with_retry("current_minimum", || async move {
                let row = sqlx::query(queries::GET_CURRENT_MINIMUM)
                    .bind(listing_id)
                    .fetch_optional(self.db.pool())
                    .await?
                    .ok_or_else(|| AuctionError::not_found("listing", listing_id))?;
                Ok(row.get("minimum"))
            })
            .await
    }
}
// endregion: --- Bids

// region:    --- Comments
#[async_trait]
impl CommentLog for PostgresStore {
    async fn add_comment(
        &self,
        listing_id: ListingId,
        author: UserId,
        content: &str,
    ) -> Result<Comment> {
        self.db
            .with_retry("add_comment", || async move {
                self.ensure_listing(listing_id).await?;
                Ok(sqlx::query_as::<_, Comment>(queries::INSERT_COMMENT)
                    .bind(listing_id)
                    .bind(author)
                    .bind(content)
                    .fetch_one(self.db.pool())
                    .await?)
            })
            .await
    }

    async fn list_comments(&self, listing_id: ListingId) -> Result<Vec<Comment>> {
        self.db
            .with_retry("list_comments", || async move {
                self.ensure_listing(listing_id).await?;
                Ok(sqlx::query_as::<_, Comment>(queries::GET_COMMENTS)
                    .bind(listing_id)
                    .fetch_all(self.db.pool())
                    .await?)
            })
            .await
    }
}
// endregion: --- Comments

// region:    --- Watches
#[async_trait]
impl WatchRegistry for PostgresStore {
    async fn is_watching(&self, user: UserId, listing_id: ListingId) -> Result<bool> {
        self.db
            .with_retry("is_watching", || async move {
                Ok(sqlx::query_scalar::<_, bool>(queries::IS_WATCHING)
                    .bind(user)
                    .bind(listing_id)
                    .fetch_one(self.db.pool())
                    .await?)
            })
            .await
    }

    async fn toggle_watch(&self, user: UserId, listing_id: ListingId) -> Result<bool> {
        self.db
            .with_retry("toggle_watch", || {
                self.db.transaction(move |tx| {
                    Box::pin(async move {
                        sqlx::query(queries::LOCK_LISTING)
                            .bind(listing_id)
                            .fetch_optional(&mut **tx)
                            .await?
                            .ok_or_else(|| AuctionError::not_found("listing", listing_id))?;

                        let removed = sqlx::query(queries::DELETE_WATCH)
                            .bind(user)
                            .bind(listing_id)
                            .execute(&mut **tx)
                            .await?
                            .rows_affected();
                        if removed > 0 {
                            return Ok(false);
                        }

                        sqlx::query(queries::INSERT_WATCH)
                            .bind(user)
                            .bind(listing_id)
                            .execute(&mut **tx)
                            .await?;
                        Ok(true)
                    })
                })
            })
            .await
    }

    async fn list_watched(&self, user: UserId) -> Result<Vec<Listing>> {
        self.db
            .with_retry("list_watched", || async move {
                Ok(sqlx::query_as::<_, Listing>(queries::GET_WATCHED_LISTINGS)
                    .bind(user)
                    .fetch_all(self.db.pool())
                    .await?)
            })
            .await
    }
}
// endregion: --- Watches
