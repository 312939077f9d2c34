use {
    super::Database,
    crate::{
        api::RestError,
        auction::entities,
        kernel::{
            clock::{
                Clock,
                ManualClock,
            },
            entities::ActorId,
        },
    },
    axum::async_trait,
    dashmap::{
        mapref::entry::Entry,
        DashMap,
    },
    time::OffsetDateTime,
};

/// Database with the same admission and transition rules as the Postgres one, for tests that
/// exercise the service end to end.
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    auctions:      DashMap<entities::AuctionId, entities::Auction>,
    bids:          DashMap<(entities::AuctionId, ActorId), entities::Bid>,
    /// Time of the storage itself, checked on admission next to the bid's own timestamp.
    storage_clock: Option<ManualClock>,
}

impl InMemoryDatabase {
    pub fn with_storage_clock(clock: ManualClock) -> Self {
        Self {
            storage_clock: Some(clock),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Database for InMemoryDatabase {
    async fn add_auction(&self, auction: &entities::Auction) -> anyhow::Result<()> {
        match self.auctions.entry(auction.id) {
            Entry::Occupied(_) => Err(anyhow::anyhow!("Auction {} already exists", auction.id)),
            Entry::Vacant(entry) => {
                entry.insert(auction.clone());
                Ok(())
            }
        }
    }

    async fn get_auction(
        &self,
        auction_id: entities::AuctionId,
    ) -> Result<entities::Auction, RestError> {
        self.auctions
            .get(&auction_id)
            .map(|auction| auction.value().clone())
            .ok_or(RestError::AuctionNotFound)
    }

    async fn get_active_auctions(
        &self,
        now: OffsetDateTime,
        after: Option<entities::AuctionCursor>,
        limit: usize,
    ) -> Result<Vec<entities::Auction>, RestError> {
        let mut auctions: Vec<entities::Auction> = self
            .auctions
            .iter()
            .filter(|auction| {
                auction.status == entities::AuctionStatus::Active && !auction.has_ended(now)
            })
            .filter(|auction| {
                after.map_or(true, |after| {
                    (auction.end_time, auction.id) > (after.end_time, after.id)
                })
            })
            .map(|auction| auction.value().clone())
            .collect();
        auctions.sort_by(|a, b| a.end_time.cmp(&b.end_time).then(a.id.cmp(&b.id)));
        auctions.truncate(limit);
        Ok(auctions)
    }

    async fn update_auction_status(
        &self,
        auction_id: entities::AuctionId,
        new_status: entities::AuctionStatus,
        now: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        let Some(mut auction) = self.auctions.get_mut(&auction_id) else {
            return Ok(false);
        };
        let allowed = match new_status {
            entities::AuctionStatus::Draft => {
                return Err(anyhow::anyhow!("Cannot update auction status to draft"))
            }
            entities::AuctionStatus::Active => {
                auction.status == entities::AuctionStatus::Draft && !auction.has_ended(now)
            }
            entities::AuctionStatus::Cancelled => {
                !auction.status.is_terminal() && !auction.has_ended(now)
            }
            entities::AuctionStatus::Ended => {
                auction.status == entities::AuctionStatus::Active && auction.has_ended(now)
            }
        };
        if allowed {
            auction.status = new_status;
        }
        Ok(allowed)
    }

    async fn end_expired_auctions(
        &self,
        now: OffsetDateTime,
    ) -> anyhow::Result<Vec<entities::AuctionId>> {
        let mut ended = vec![];
        for mut auction in self.auctions.iter_mut() {
            if auction.status == entities::AuctionStatus::Active && auction.has_ended(now) {
                auction.status = entities::AuctionStatus::Ended;
                ended.push(auction.id);
            }
        }
        Ok(ended)
    }

    async fn add_bid(&self, bid: &entities::Bid) -> Result<(), RestError> {
        // The auction guard is held until the bid is stored so a status change cannot slip in
        // between the check and the insert.
        let auction = self
            .auctions
            .get(&bid.auction_id)
            .ok_or(RestError::AuctionNotActive)?;
        let ended_in_storage = self
            .storage_clock
            .as_ref()
            .is_some_and(|clock| auction.has_ended(clock.now()));
        if auction.status != entities::AuctionStatus::Active
            || auction.has_ended(bid.created_at)
            || ended_in_storage
        {
            return Err(RestError::AuctionNotActive);
        }
        match self.bids.entry((bid.auction_id, bid.bidder.clone())) {
            Entry::Occupied(_) => Err(RestError::DuplicateBid),
            Entry::Vacant(entry) => {
                entry.insert(bid.clone());
                Ok(())
            }
        }
    }

    async fn get_bid_by_bidder(
        &self,
        auction_id: entities::AuctionId,
        bidder: &ActorId,
    ) -> Result<Option<entities::Bid>, RestError> {
        Ok(self
            .bids
            .get(&(auction_id, bidder.clone()))
            .map(|bid| bid.value().clone()))
    }

    async fn get_bids(
        &self,
        auction_id: entities::AuctionId,
    ) -> Result<Vec<entities::Bid>, RestError> {
        let mut bids: Vec<entities::Bid> = self
            .bids
            .iter()
            .filter(|bid| bid.auction_id == auction_id)
            .map(|bid| bid.value().clone())
            .collect();
        bids.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(bids)
    }
}
