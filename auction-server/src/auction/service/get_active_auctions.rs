use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
    },
};

#[derive(Debug, Clone, Default)]
pub struct GetActiveAuctionsInput {
    pub after: Option<entities::AuctionCursor>,
}

impl Service {
    /// Active auctions that have not reached their end time, soonest to close first.
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE), fields(after = ?input.after))]
    pub async fn get_active_auctions(
        &self,
        input: GetActiveAuctionsInput,
    ) -> Result<entities::ActiveAuctions, RestError> {
        self.repo.get_active_auctions(self.now(), input.after).await
    }
}
