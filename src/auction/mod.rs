pub mod engine;
pub mod outcome;

pub use engine::AuctionEngine;
pub use outcome::{ListingDetail, Outcome};
