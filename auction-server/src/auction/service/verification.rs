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
pub struct VerifyBidInput {
    pub auction_id: entities::AuctionId,
    pub bidder:     ActorId,
    pub amount:     entities::BidAmount,
}

impl Service {
    fn verify_bid_amount(
        auction: &entities::Auction,
        amount: entities::BidAmount,
    ) -> Result<(), RestError> {
        if amount <= auction.start_price {
            return Err(RestError::BidAmountTooLow {
                start_price: auction.start_price,
            });
        }
        if amount > entities::BID_AMOUNT_MAX {
            return Err(RestError::BadParameters(format!(
                "Bid amount must not exceed {}",
                entities::BID_AMOUNT_MAX
            )));
        }
        Ok(())
    }

    /// Checks the admission preconditions in order: the auction exists, it is active, the amount
    /// beats the start price and the bidder has not bid yet.
    ///
    /// The duplicate check here only shapes the error. The insert itself is what guarantees a
    /// single bid per bidder.
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE))]
    pub async fn verify_bid(&self, input: &VerifyBidInput) -> Result<entities::Auction, RestError> {
        let auction = self
            .get_auction_with_status(GetAuctionStatusInput {
                auction_id: input.auction_id,
            })
            .await?;
        if auction.status != entities::AuctionStatus::Active {
            return Err(RestError::AuctionNotActive);
        }
        Self::verify_bid_amount(&auction, input.amount)?;
        if self
            .repo
            .get_bid_by_bidder(input.auction_id, &input.bidder)
            .await?
            .is_some()
        {
            return Err(RestError::DuplicateBid);
        }
        Ok(auction)
    }
}
