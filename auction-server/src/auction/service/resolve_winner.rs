use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
        server_metrics,
    },
};

#[derive(Debug, Clone)]
pub struct ResolveWinnerInput {
    pub auction_id: entities::AuctionId,
}

impl Service {
    /// Picks the winner of an ended auction: the highest bid, the earliest one among equal amounts,
    /// the smallest id among equal timestamps.
    ///
    /// The outcome is derived from the stored bids on every call. No bid can be admitted once the
    /// ended status is stored, so every call returns the same outcome.
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE), fields(auction_id = %input.auction_id))]
    pub async fn resolve_winner(
        &self,
        input: ResolveWinnerInput,
    ) -> Result<entities::AuctionOutcome, RestError> {
        let (auction, stored) = self.settle_auction_status(input.auction_id).await?;
        if auction.status != entities::AuctionStatus::Ended {
            return Err(RestError::InvalidAuctionState(format!(
                "Auction is {:?}, the winner is only known once it has ended",
                auction.status
            )));
        }
        // Storing the ended status waits for admissions still in flight. Until it is stored the
        // bid set may not be final.
        if !stored {
            return Err(RestError::TemporarilyUnavailable);
        }

        let bids = self.repo.get_bids(input.auction_id).await?;
        let outcome = entities::AuctionOutcome::from_bids(&bids);
        tracing::debug!(bids = bids.len(), outcome = ?outcome, "Auction resolved");
        server_metrics::record_resolution(&outcome, bids.len());
        Ok(outcome)
    }
}
