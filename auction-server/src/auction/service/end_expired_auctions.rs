use {
    super::Service,
    crate::{
        auction::entities,
        server_metrics,
    },
};

impl Service {
    /// Flags every active auction past its end time as ended.
    ///
    /// Status reads settle expired auctions on their own, this only keeps the stored status close to
    /// the truth for auctions nobody is looking at.
    #[tracing::instrument(skip_all)]
    pub async fn end_expired_auctions(&self) -> Vec<entities::AuctionId> {
        match self.repo.end_expired_auctions(self.now()).await {
            Ok(ended) => {
                if !ended.is_empty() {
                    tracing::info!(count = ended.len(), auction_ids = ?ended, "Ended expired auctions");
                    server_metrics::record_auctions_ended(ended.len());
                }
                ended
            }
            Err(e) => {
                tracing::error!(error = ?e, "Failed to end expired auctions");
                vec![]
            }
        }
    }
}
