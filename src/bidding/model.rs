use crate::listing::ListingId;
use crate::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type BidId = i64;

// Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: BidId,
    pub listing_id: ListingId,
    pub bidder_id: UserId,
    pub amount: i64,
    pub placed_at: DateTime<Utc>,
}
