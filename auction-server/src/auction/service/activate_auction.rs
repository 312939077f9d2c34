use {
    super::{
        get_auction_status::GetAuctionStatusInput,
        Service,
    },
    crate::{
        api::RestError,
        auction::entities,
        kernel::entities::ActorId,
    },
};

#[derive(Debug, Clone)]
pub struct ActivateAuctionInput {
    pub auction_id: entities::AuctionId,
    pub actor:      ActorId,
}

impl Service {
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE), fields(auction_id = %input.auction_id, actor = %input.actor))]
    pub async fn activate_auction(&self, input: ActivateAuctionInput) -> Result<(), RestError> {
        let auction = self
            .get_auction_with_status(GetAuctionStatusInput {
                auction_id: input.auction_id,
            })
            .await?;
        if auction.seller != input.actor {
            return Err(RestError::Unauthorized);
        }
        if auction.status != entities::AuctionStatus::Draft {
            return Err(RestError::InvalidAuctionState(format!(
                "Auction is {:?}, only draft auctions can be activated",
                auction.status
            )));
        }
        let now = self.now();
        if auction.has_ended(now) {
            return Err(RestError::InvalidAuctionState(
                "Auction end time has already passed".to_string(),
            ));
        }

        let updated = self
            .repo
            .update_auction_status(auction.id, entities::AuctionStatus::Active, now)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, "Failed to activate auction");
                RestError::TemporarilyUnavailable
            })?;
        if !updated {
            let status = self
                .get_auction_status(GetAuctionStatusInput {
                    auction_id: auction.id,
                })
                .await?;
            return Err(RestError::InvalidAuctionState(format!(
                "Auction is {:?}, only draft auctions can be activated",
                status
            )));
        }
        tracing::info!(auction_id = %auction.id, "Auction activated");
        Ok(())
    }
}
