//! Auction engine: the operations the web layer calls.
//! Every operation takes its acting user explicitly.
// region:    --- Imports
use super::outcome::{ListingDetail, Outcome};
use crate::bidding::{ledger, Bid};
use crate::comment::{self, Comment};
use crate::error::{AuctionError, Result};
use crate::listing::{self, Listing, ListingId, NewListing};
use crate::store::MarketStore;
use crate::user::{self, User, UserId};
use std::sync::Arc;
use tracing::{info, warn};
// endregion: --- Imports

#[derive(Clone)]
pub struct AuctionEngine {
    store: Arc<dyn MarketStore>,
}

impl AuctionEngine {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        Self { store }
    }

    // region:    --- Users
    pub async fn register_user(&self, name: &str) -> Result<User> {
        let name = user::normalize_name(name)?;
        let user = self.store.register_user(&name).await?;
        info!("{:<12} --> user registered: {} ({})", "Engine", user.name, user.id);
        Ok(user)
    }

    pub async fn get_user(&self, id: UserId) -> Result<User> {
        self.store.get_user(id).await
    }
    // endregion: --- Users

    // region:    --- Listings
    pub async fn create_listing(&self, owner: UserId, input: NewListing) -> Result<Listing> {
        self.store.get_user(owner).await?;
        let input = input.validated()?;
        let listing = self.store.create_listing(owner, input).await?;
        info!(
            "{:<12} --> listing {} created by user {} (start {})",
            "Engine", listing.id, owner, listing.starting_price
        );
        Ok(listing)
    }

    pub async fn get_listing(&self, id: ListingId) -> Result<Listing> {
        self.store.get_listing(id).await
    }

    pub async fn list_listings(&self) -> Result<Vec<Listing>> {
        self.store.list_listings().await
    }

    /// `(active, closed)` in insertion order.
    pub async fn list_partitioned(&self) -> Result<(Vec<Listing>, Vec<Listing>)> {
        Ok(listing::partition_listings(self.store.list_listings().await?))
    }

    pub async fn list_by_category(&self, category: &str) -> Result<Vec<Listing>> {
        self.store.list_by_category(category.trim()).await
    }

    pub async fn categories(&self) -> Result<Vec<String>> {
        Ok(listing::categories_of(&self.store.list_listings().await?))
    }

    /// Owner-only, one-way `Open -> Closed`.
    pub async fn close_listing(&self, id: ListingId, requester: UserId) -> Result<Listing> {
        self.store.get_user(requester).await?;
        match self.store.close_listing(id, requester).await {
            Ok(listing) => {
                info!("{:<12} --> listing {} closed by owner", "Engine", id);
                Ok(listing)
            }
            Err(e) => {
                warn!(
                    "{:<12} --> close of listing {} by user {} rejected: {}",
                    "Engine", id, requester, e
                );
                Err(e)
            }
        }
    }
    // endregion: --- Listings

    // region:    --- Bidding
    /// Rejects bids on a closed listing up front, then lets the ledger
    /// re-check state and minimum atomically while appending.
    pub async fn place_bid(
        &self,
        listing_id: ListingId,
        bidder: UserId,
        amount: i64,
    ) -> Result<Bid> {
        self.store.get_user(bidder).await?;
        let listing = self.store.get_listing(listing_id).await?;
        if !listing.active {
            warn!(
                "{:<12} --> bid on closed listing {} by user {}",
                "Engine", listing_id, bidder
            );
            return Err(AuctionError::ListingClosed(listing_id));
        }

        match self.store.record_bid(listing_id, bidder, amount).await {
            Ok(bid) => {
                info!(
                    "{:<12} --> bid {} accepted: listing {}, user {}, amount {}",
                    "Engine", bid.id, listing_id, bidder, amount
                );
                Ok(bid)
            }
            Err(e) => {
                warn!(
                    "{:<12} --> bid of {} on listing {} rejected: {}",
                    "Engine", amount, listing_id, e
                );
                Err(e)
            }
        }
    }

    pub async fn current_minimum(&self, listing_id: ListingId) -> Result<i64> {
        self.store.current_minimum(listing_id).await
    }

    pub async fn highest_bid(&self, listing_id: ListingId) -> Result<Option<Bid>> {
        self.store.highest_bid(listing_id).await
    }

    pub async fn winner(&self, listing_id: ListingId) -> Result<Option<UserId>> {
        self.store.winner(listing_id).await
    }

    pub async fn list_bids(&self, listing_id: ListingId) -> Result<Vec<Bid>> {
        self.store.list_bids(listing_id).await
    }

    pub async fn determine_outcome(&self, listing_id: ListingId) -> Result<Outcome> {
        let listing = self.store.get_listing(listing_id).await?;
        let highest = self.store.highest_bid(listing_id).await?;
        Ok(Outcome::from_parts(&listing, highest.as_ref()))
    }
    // endregion: --- Bidding

    // region:    --- Watchlist
    pub async fn toggle_watch(&self, user: UserId, listing_id: ListingId) -> Result<bool> {
        self.store.get_user(user).await?;
        let watching = self.store.toggle_watch(user, listing_id).await?;
        info!(
            "{:<12} --> user {} {} listing {}",
            "Engine",
            user,
            if watching { "watches" } else { "unwatched" },
            listing_id
        );
        Ok(watching)
    }

    pub async fn is_watching(&self, user: UserId, listing_id: ListingId) -> Result<bool> {
        self.store.is_watching(user, listing_id).await
    }

    pub async fn list_watched(&self, user: UserId) -> Result<Vec<Listing>> {
        self.store.get_user(user).await?;
        self.store.list_watched(user).await
    }
    // endregion: --- Watchlist

    // region:    --- Comments
    pub async fn add_comment(
        &self,
        listing_id: ListingId,
        author: UserId,
        content: &str,
    ) -> Result<Comment> {
        self.store.get_user(author).await?;
        let content = comment::normalize_content(content)?;
        let comment = self.store.add_comment(listing_id, author, &content).await?;
        info!(
            "{:<12} --> comment {} on listing {} by user {}",
            "Engine", comment.id, listing_id, author
        );
        Ok(comment)
    }

    pub async fn list_comments(&self, listing_id: ListingId) -> Result<Vec<Comment>> {
        self.store.list_comments(listing_id).await
    }
    // endregion: --- Comments

    /// Listing page composite. Outcome and minimum are derived from the same
    /// bid list so they always agree.
    pub async fn listing_detail(
        &self,
        listing_id: ListingId,
        viewer: Option<UserId>,
    ) -> Result<ListingDetail> {
        let listing = self.store.get_listing(listing_id).await?;
        let bids = self.store.list_bids(listing_id).await?;
        let comments = self.store.list_comments(listing_id).await?;

        let highest = ledger::leading_bid(&bids);
        let outcome = Outcome::from_parts(&listing, highest);
        let minimum_bid = ledger::minimum_from(listing.starting_price, highest);

        let (is_owner, watching) = match viewer {
            Some(user) => (
                listing.is_owned_by(user),
                self.store.is_watching(user, listing_id).await?,
            ),
            None => (false, false),
        };

        Ok(ListingDetail {
            listing,
            bids,
            comments,
            outcome,
            minimum_bid,
            is_owner,
            watching,
        })
    }
}
