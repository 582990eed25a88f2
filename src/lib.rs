pub mod auction;
pub mod bidding;
pub mod comment;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod store;
pub mod user;
pub mod watch;

pub use auction::{AuctionEngine, ListingDetail, Outcome};
pub use error::{AuctionError, Result};
