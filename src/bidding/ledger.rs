//! Bid acceptance rules and the derived price queries.
//!
//! The current minimum is always derived from the recorded bids; nothing here
//! caches it. Store implementations call [`check_bid`] while holding whatever
//! lock makes their read-then-append atomic.

// region:    --- Imports
use super::model::Bid;
use crate::config::MAX_PRICE;
use crate::error::{AuctionError, Result};
use crate::listing::{Listing, ListingId};
use crate::user::UserId;
use async_trait::async_trait;
use std::cmp::Ordering;
// endregion: --- Imports

// region:    --- Bid Ledger Trait
/// Append-only record of bids per listing.
#[async_trait]
pub trait BidLedger {
    /// Appends a bid. Fails with `NotFound`, `ListingClosed`, `Validation`
    /// (amount above the price cap) or `BidTooLow`, in that order.
    async fn record_bid(&self, listing_id: ListingId, bidder: UserId, amount: i64) -> Result<Bid>;

    /// Bids for a listing in the order they were placed.
    async fn list_bids(&self, listing_id: ListingId) -> Result<Vec<Bid>>;

    async fn highest_bid(&self, listing_id: ListingId) -> Result<Option<Bid>>;

    /// Highest recorded amount, or the starting price when there are no bids.
    async fn current_minimum(&self, listing_id: ListingId) -> Result<i64>;

    async fn winner(&self, listing_id: ListingId) -> Result<Option<UserId>> {
        Ok(self.highest_bid(listing_id).await?.map(|bid| bid.bidder_id))
    }
}
// endregion: --- Bid Ledger Trait

// region:    --- Rules
/// Ordering used to pick the leading bid: larger amount wins, then the
/// earlier timestamp, then the lower id.
pub fn outranks(a: &Bid, b: &Bid) -> bool {
    let order = a
        .amount
        .cmp(&b.amount)
        .then_with(|| b.placed_at.cmp(&a.placed_at))
        .then_with(|| b.id.cmp(&a.id));
    order == Ordering::Greater
}

pub fn leading_bid<'a, I>(bids: I) -> Option<&'a Bid>
where
    I: IntoIterator<Item = &'a Bid>,
{
    bids.into_iter().fold(None, |best, bid| match best {
        Some(current) if !outranks(bid, current) => Some(current),
        _ => Some(bid),
    })
}

pub fn minimum_from(starting_price: i64, highest: Option<&Bid>) -> i64 {
    highest.map_or(starting_price, |bid| bid.amount)
}

/// Decides whether `amount` may be appended to `listing`'s ledger, given the
/// minimum observed under the same lock.
pub fn check_bid(listing: &Listing, minimum: i64, amount: i64) -> Result<()> {
    if !listing.active {
        return Err(AuctionError::ListingClosed(listing.id));
    }
    if amount > MAX_PRICE {
        return Err(AuctionError::validation(
            "amount",
            format!("must be at most {}", MAX_PRICE),
        ));
    }
    if amount <= minimum {
        return Err(AuctionError::BidTooLow { amount, minimum });
    }
    Ok(())
}
// endregion: --- Rules

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bid(id: i64, amount: i64, offset_secs: i64) -> Bid {
        Bid {
            id,
            listing_id: 1,
            bidder_id: id * 10,
            amount,
            placed_at: Utc.with_ymd_and_hms(2020, 8, 9, 19, 42, 0).unwrap()
                + Duration::seconds(offset_secs),
        }
    }

    fn listing(active: bool) -> Listing {
        Listing {
            id: 7,
            owner_id: 1,
            title: "Lamp".to_string(),
            description: "Brass".to_string(),
            starting_price: 100,
            category: None,
            image_url: None,
            active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn minimum_falls_back_to_starting_price() {
        assert_eq!(minimum_from(100, None), 100);
        let b = bid(1, 150, 0);
        assert_eq!(minimum_from(100, Some(&b)), 150);
    }

    #[test]
    fn leading_bid_prefers_amount_then_earliest_then_lowest_id() {
        let bids = vec![bid(1, 150, 0), bid(2, 200, 5), bid(3, 200, 1), bid(4, 120, 9)];
        assert_eq!(leading_bid(&bids).map(|b| b.id), Some(3));

        let same_instant = vec![bid(9, 300, 0), bid(8, 300, 0)];
        assert_eq!(leading_bid(&same_instant).map(|b| b.id), Some(8));

        assert!(leading_bid(&Vec::<Bid>::new()).is_none());
    }

    #[test]
    fn bids_must_be_strictly_higher() {
        let open = listing(true);
        assert!(matches!(
            check_bid(&open, 100, 100),
            Err(AuctionError::BidTooLow {
                amount: 100,
                minimum: 100
            })
        ));
        assert!(check_bid(&open, 100, 101).is_ok());
    }

    #[test]
    fn closed_listing_rejects_before_amount_checks() {
        let closed = listing(false);
        assert!(matches!(
            check_bid(&closed, 100, 5),
            Err(AuctionError::ListingClosed(7))
        ));
    }

    #[test]
    fn amount_above_cap_is_invalid() {
        assert!(matches!(
            check_bid(&listing(true), 100, MAX_PRICE + 1),
            Err(AuctionError::Validation {
                field: "amount",
                ..
            })
        ));
    }
}
