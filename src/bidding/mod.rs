pub mod ledger;
pub mod model;

pub use ledger::BidLedger;
pub use model::{Bid, BidId};
