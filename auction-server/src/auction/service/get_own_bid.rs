use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
        kernel::entities::ActorId,
    },
};

#[derive(Debug, Clone)]
pub struct GetOwnBidInput {
    pub auction_id: entities::AuctionId,
    pub bidder:     ActorId,
}

impl Service {
    /// Returns the bid of `bidder` on the auction. There is no way to read anyone else's bid.
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE), fields(auction_id = %input.auction_id, bidder = %input.bidder))]
    pub async fn get_own_bid(
        &self,
        input: GetOwnBidInput,
    ) -> Result<Option<entities::Bid>, RestError> {
        let auction = self.repo.get_auction(input.auction_id).await?;
        self.repo.get_bid_by_bidder(auction.id, &input.bidder).await
    }
}
