use {
    super::Repository,
    crate::{
        api::RestError,
        auction::entities,
        kernel::entities::ActorId,
    },
};

impl Repository {
    pub async fn get_bid_by_bidder(
        &self,
        auction_id: entities::AuctionId,
        bidder: &ActorId,
    ) -> Result<Option<entities::Bid>, RestError> {
        self.db.get_bid_by_bidder(auction_id, bidder).await
    }
}
