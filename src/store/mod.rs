pub mod memory;
pub mod postgres;
pub mod queries;

// region:    --- Imports
use crate::bidding::BidLedger;
use crate::comment::CommentLog;
use crate::listing::ListingStore;
use crate::user::UserDirectory;
use crate::watch::WatchRegistry;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
// endregion: --- Imports

/// Every persistence seam the auction engine needs, behind one object.
pub trait MarketStore:
    UserDirectory + ListingStore + BidLedger + WatchRegistry + CommentLog + Send + Sync
{
}

impl<T> MarketStore for T where
    T: UserDirectory + ListingStore + BidLedger + WatchRegistry + CommentLog + Send + Sync
{
}
