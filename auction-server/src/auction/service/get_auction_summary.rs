use {
    super::{
        get_auction_status::GetAuctionStatusInput,
        resolve_winner::ResolveWinnerInput,
        Service,
    },
    crate::{
        api::RestError,
        auction::entities,
        kernel::entities::ActorId,
    },
};

#[derive(Debug, Clone)]
pub struct GetAuctionSummaryInput {
    pub auction_id: entities::AuctionId,
    pub actor:      Option<ActorId>,
}

impl Service {
    /// The auction as `actor` may see it. Only the actor's own bid and, after the end, the winning
    /// bid are ever included.
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE), fields(auction_id = %input.auction_id))]
    pub async fn get_auction_summary(
        &self,
        input: GetAuctionSummaryInput,
    ) -> Result<entities::AuctionSummary, RestError> {
        let auction = self
            .get_auction_with_status(GetAuctionStatusInput {
                auction_id: input.auction_id,
            })
            .await?;

        let own_bid = match &input.actor {
            Some(actor) => self.repo.get_bid_by_bidder(auction.id, actor).await?,
            None => None,
        };
        let outcome = match auction.status {
            entities::AuctionStatus::Ended => Some(
                self.resolve_winner(ResolveWinnerInput {
                    auction_id: auction.id,
                })
                .await?,
            ),
            _ => None,
        };

        Ok(entities::AuctionSummary {
            auction,
            own_bid,
            outcome,
        })
    }
}
