use super::entities;

mod add_auction;
mod add_bid;
mod end_expired_auctions;
mod get_active_auctions;
mod get_auction;
mod get_bid_by_bidder;
mod get_bids;
#[cfg(test)]
mod in_memory_db;
mod models;
mod update_auction_status;

#[cfg(test)]
pub use in_memory_db::InMemoryDatabase;
pub use models::*;

/// Upper bound for a single page of the active auctions listing.
pub const AUCTION_PAGE_SIZE_CAP: usize = 100;

#[derive(Debug)]
pub struct Repository {
    pub db: Box<dyn Database>,
}

impl Repository {
    pub fn new(db: impl Database) -> Self {
        Self { db: Box::new(db) }
    }
}
