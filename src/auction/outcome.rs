use crate::bidding::{ledger, Bid};
use crate::comment::Comment;
use crate::listing::{Listing, ListingId};
use crate::user::UserId;
use serde::{Deserialize, Serialize};

/// Read-only view of where an auction stands: the live leading bid while
/// open, the final result once closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub listing_id: ListingId,
    pub active: bool,
    /// `None` when nobody has bid.
    pub winner: Option<UserId>,
    pub current_price: i64,
}

impl Outcome {
    pub fn from_parts(listing: &Listing, highest: Option<&Bid>) -> Self {
        Self {
            listing_id: listing.id,
            active: listing.active,
            winner: highest.map(|bid| bid.bidder_id),
            current_price: ledger::minimum_from(listing.starting_price, highest),
        }
    }
}

/// Everything the listing page shows, from one viewer's perspective.
#[derive(Debug, Clone, Serialize)]
pub struct ListingDetail {
    pub listing: Listing,
    pub bids: Vec<Bid>,
    pub comments: Vec<Comment>,
    pub outcome: Outcome,
    /// A new bid must exceed this.
    pub minimum_bid: i64,
    pub is_owner: bool,
    pub watching: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn listing(active: bool) -> Listing {
        Listing {
            id: 3,
            owner_id: 1,
            title: "Globe".to_string(),
            description: "Desk globe".to_string(),
            starting_price: 40,
            category: None,
            image_url: None,
            active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn price_follows_the_minimum_bid() {
        let listing = listing(false);
        let bid = Bid {
            id: 9,
            listing_id: 3,
            bidder_id: 2,
            amount: 55,
            placed_at: Utc::now(),
        };

        let open = Outcome::from_parts(&listing, None);
        assert_eq!(open.current_price, ledger::minimum_from(40, None));
        assert_eq!(open.winner, None);

        let won = Outcome::from_parts(&listing, Some(&bid));
        assert_eq!(won.current_price, ledger::minimum_from(40, Some(&bid)));
        assert_eq!(won.winner, Some(2));
        assert!(!won.active);
    }
}
