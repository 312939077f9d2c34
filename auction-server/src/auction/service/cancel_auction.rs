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
pub struct CancelAuctionInput {
    pub auction_id: entities::AuctionId,
    pub actor:      ActorId,
}

fn not_cancellable(status: entities::AuctionStatus) -> RestError {
    RestError::InvalidAuctionState(format!("Auction is {:?} and can no longer be cancelled", status))
}

impl Service {
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE), fields(auction_id = %input.auction_id, actor = %input.actor))]
    pub async fn cancel_auction(&self, input: CancelAuctionInput) -> Result<(), RestError> {
        let auction = self
            .get_auction_with_status(GetAuctionStatusInput {
                auction_id: input.auction_id,
            })
            .await?;
        if auction.seller != input.actor {
            return Err(RestError::Unauthorized);
        }
        let now = self.now();
        if auction.status.is_terminal() || auction.has_ended(now) {
            return Err(not_cancellable(auction.status_at(now)));
        }

        let updated = self
            .repo
            .update_auction_status(auction.id, entities::AuctionStatus::Cancelled, now)
            .await
            .map_err(|e| {
                tracing::error!(error = ?e, "Failed to cancel auction");
                RestError::TemporarilyUnavailable
            })?;
        if !updated {
            let status = self
                .get_auction_status(GetAuctionStatusInput {
                    auction_id: auction.id,
                })
                .await?;
            return Err(not_cancellable(status));
        }
        tracing::info!(auction_id = %auction.id, "Auction cancelled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::CancelAuctionInput,
        crate::{
            api::RestError,
            auction::{
                entities,
                service::{
                    create_auction::CreateAuctionInput,
                    get_auction_status::GetAuctionStatusInput,
                    submit_bid::SubmitBidInput,
                    tests::{
                        create_active_auction,
                        get_service,
                        T0,
                    },
                },
            },
            kernel::entities::test_utils::actor,
        },
        time::Duration,
    };

    #[tokio::test]
    async fn test_cancel_draft_and_active() {
        let (service, _) = get_service();
        let draft = service
            .create_auction(CreateAuctionInput {
                seller:      actor("seller-1"),
                product_ref: "product-1".to_string(),
                start_price: 100,
                end_time:    T0 + Duration::hours(1),
            })
            .await
            .unwrap();
        let active = create_active_auction(&service, 100).await;

        for auction_id in [draft.id, active.id] {
            service
                .cancel_auction(CancelAuctionInput {
                    auction_id,
                    actor: actor("seller-1"),
                })
                .await
                .unwrap();
            assert_eq!(
                service
                    .get_auction_status(GetAuctionStatusInput { auction_id })
                    .await,
                Ok(entities::AuctionStatus::Cancelled)
            );
        }
    }

    #[tokio::test]
    async fn test_cancelled_auction_rejects_bids() {
        let (service, _) = get_service();
        let auction = create_active_auction(&service, 100).await;
        service
            .cancel_auction(CancelAuctionInput {
                auction_id: auction.id,
                actor:      actor("seller-1"),
            })
            .await
            .unwrap();
        assert_eq!(
            service
                .submit_bid(SubmitBidInput {
                    auction_id: auction.id,
                    bidder:     actor("bidder-x"),
                    amount:     150,
                })
                .await,
            Err(RestError::AuctionNotActive)
        );
    }

    #[tokio::test]
    async fn test_cancel_after_end_fails() {
        let (service, clock) = get_service();
        let auction = create_active_auction(&service, 100).await;
        clock.set(auction.end_time);
        assert_eq!(
            service
                .cancel_auction(CancelAuctionInput {
                    auction_id: auction.id,
                    actor:      actor("seller-1"),
                })
                .await,
            Err(RestError::InvalidAuctionState(
                "Auction is Ended and can no longer be cancelled".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_cancel_twice_fails() {
        let (service, _) = get_service();
        let auction = create_active_auction(&service, 100).await;
        let input = CancelAuctionInput {
            auction_id: auction.id,
            actor:      actor("seller-1"),
        };
        service.cancel_auction(input.clone()).await.unwrap();
        assert!(matches!(
            service.cancel_auction(input).await,
            Err(RestError::InvalidAuctionState(_))
        ));
    }

    #[tokio::test]
    async fn test_cancel_by_non_seller_is_unauthorized() {
        let (service, _) = get_service();
        let auction = create_active_auction(&service, 100).await;
        assert_eq!(
            service
                .cancel_auction(CancelAuctionInput {
                    auction_id: auction.id,
                    actor:      actor("bidder-x"),
                })
                .await,
            Err(RestError::Unauthorized)
        );
    }
}
