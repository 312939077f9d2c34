use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
    },
};

#[derive(Debug, Clone)]
pub struct GetAuctionStatusInput {
    pub auction_id: entities::AuctionId,
}

impl Service {
    /// Settles the auction status against the clock and tells whether the settled status is
    /// stored. It is not stored only when flagging an expired auction as ended failed.
    pub(super) async fn settle_auction_status(
        &self,
        auction_id: entities::AuctionId,
    ) -> Result<(entities::Auction, bool), RestError> {
        let auction = self.repo.get_auction(auction_id).await?;
        let now = self.now();
        let status = auction.status_at(now);
        if status == auction.status {
            return Ok((auction, true));
        }

        match self
            .repo
            .update_auction_status(auction.id, status, now)
            .await
        {
            Ok(true) => {
                tracing::info!(auction_id = %auction.id, "Auction ended");
                Ok((entities::Auction { status, ..auction }, true))
            }
            // Someone else moved the auction first. The stored status is the truth.
            Ok(false) => Ok((self.repo.get_auction(auction_id).await?, true)),
            Err(e) => {
                tracing::warn!(error = ?e, auction_id = %auction.id, "Failed to persist ended status");
                Ok((entities::Auction { status, ..auction }, false))
            }
        }
    }

    /// Reads the auction and settles its status against the clock.
    ///
    /// An auction still stored as active after its end time is flagged ended here, so this is the
    /// one place that answers whether an auction is over. The returned auction carries the settled
    /// status, even when storing it failed.
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE), fields(auction_id = %input.auction_id))]
    pub async fn get_auction_with_status(
        &self,
        input: GetAuctionStatusInput,
    ) -> Result<entities::Auction, RestError> {
        Ok(self.settle_auction_status(input.auction_id).await?.0)
    }

    pub async fn get_auction_status(
        &self,
        input: GetAuctionStatusInput,
    ) -> Result<entities::AuctionStatus, RestError> {
        Ok(self.get_auction_with_status(input).await?.status)
    }
}
