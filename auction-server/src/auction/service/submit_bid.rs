use {
    super::{
        verification::VerifyBidInput,
        Service,
    },
    crate::{
        api::RestError,
        auction::entities,
        kernel::entities::ActorId,
        server_metrics,
    },
};

#[derive(Debug, Clone)]
pub struct SubmitBidInput {
    pub auction_id: entities::AuctionId,
    pub bidder:     ActorId,
    pub amount:     entities::BidAmount,
}

impl Service {
    /// Admits a sealed bid. A bidder gets exactly one bid per auction and it can never be changed.
    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE), fields(auction_id = %input.auction_id, bidder = %input.bidder, bid_id))]
    pub async fn submit_bid(&self, input: SubmitBidInput) -> Result<entities::Bid, RestError> {
        let result = self.admit_bid(input).await;
        server_metrics::record_admission(&result);
        result
    }

    async fn admit_bid(&self, input: SubmitBidInput) -> Result<entities::Bid, RestError> {
        self.verify_bid(&VerifyBidInput {
            auction_id: input.auction_id,
            bidder:     input.bidder.clone(),
            amount:     input.amount,
        })
        .await?;

        let bid = entities::Bid::new(input.auction_id, input.bidder, input.amount, self.now());
        tracing::Span::current().record("bid_id", tracing::field::display(bid.id));
        let bid = self.repo.add_bid(bid).await?;
        tracing::info!(bid_id = %bid.id, auction_id = %bid.auction_id, "Bid admitted");
        Ok(bid)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::SubmitBidInput,
        crate::{
            api::RestError,
            auction::{
                entities,
                repository::{
                    InMemoryDatabase,
                    MockDatabase,
                },
                service::{
                    create_auction::CreateAuctionInput,
                    get_auction_status::GetAuctionStatusInput,
                    tests::{
                        create_active_auction,
                        get_service,
                        get_service_with_db,
                        T0,
                    },
                },
            },
            kernel::{
                clock::ManualClock,
                entities::test_utils::actor,
            },
        },
        futures::future::join_all,
        time::Duration,
    };

    fn input(auction_id: entities::AuctionId, bidder: &str, amount: u64) -> SubmitBidInput {
        SubmitBidInput {
            auction_id,
            bidder: actor(bidder),
            amount,
        }
    }

    #[tokio::test]
    async fn test_second_bid_of_same_bidder_is_rejected() {
        let (service, clock) = get_service();
        let auction = create_active_auction(&service, 100).await;

        clock.set(T0 + Duration::minutes(10));
        let bid = service
            .submit_bid(input(auction.id, "bidder-x", 150))
            .await
            .unwrap();
        assert_eq!(bid.amount, 150);
        assert_eq!(bid.created_at, T0 + Duration::minutes(10));

        for amount in [150, 300, 101] {
            assert_eq!(
                service.submit_bid(input(auction.id, "bidder-x", amount)).await,
                Err(RestError::DuplicateBid)
            );
        }
        assert_eq!(service.repo.get_bids(auction.id).await.unwrap(), vec![bid]);
    }

    #[tokio::test]
    async fn test_bid_not_above_start_price_is_rejected() {
        let (service, _) = get_service();
        let auction = create_active_auction(&service, 100).await;
        assert_eq!(
            service.submit_bid(input(auction.id, "bidder-y", 80)).await,
            Err(RestError::BidAmountTooLow { start_price: 100 })
        );
        assert_eq!(
            service.submit_bid(input(auction.id, "bidder-y", 100)).await,
            Err(RestError::BidAmountTooLow { start_price: 100 })
        );
    }

    #[tokio::test]
    async fn test_bid_on_draft_is_rejected() {
        let (service, _) = get_service();
        let auction = service
            .create_auction(CreateAuctionInput {
                seller:      actor("seller-1"),
                product_ref: "product-1".to_string(),
                start_price: 100,
                end_time:    T0 + Duration::hours(1),
            })
            .await
            .unwrap();
        assert_eq!(
            service.submit_bid(input(auction.id, "bidder-x", 150)).await,
            Err(RestError::AuctionNotActive)
        );
    }

    #[tokio::test]
    async fn test_bid_at_end_time_is_rejected_before_status_is_flagged() {
        let (service, clock) = get_service();
        let auction = create_active_auction(&service, 100).await;
        assert_eq!(
            service.repo.get_auction(auction.id).await.unwrap().status,
            entities::AuctionStatus::Active
        );

        clock.set(auction.end_time);
        assert_eq!(
            service.submit_bid(input(auction.id, "bidder-x", 150)).await,
            Err(RestError::AuctionNotActive)
        );
        assert_eq!(
            service
                .get_auction_status(GetAuctionStatusInput {
                    auction_id: auction.id,
                })
                .await,
            Ok(entities::AuctionStatus::Ended)
        );
    }

    #[tokio::test]
    async fn test_bid_reaching_storage_after_end_is_rejected() {
        let storage_clock = ManualClock::new(T0);
        let (service, clock) =
            get_service_with_db(InMemoryDatabase::with_storage_clock(storage_clock.clone()));
        let auction = create_active_auction(&service, 100).await;

        clock.set(auction.end_time - Duration::milliseconds(1));
        storage_clock.set(auction.end_time);
        assert_eq!(
            service.submit_bid(input(auction.id, "bidder-x", 150)).await,
            Err(RestError::AuctionNotActive)
        );
        assert!(service.repo.get_bids(auction.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bid_on_unknown_auction() {
        let (service, _) = get_service();
        assert_eq!(
            service
                .submit_bid(input(entities::AuctionId::new_v4(), "bidder-x", 150))
                .await,
            Err(RestError::AuctionNotFound)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_identical_bids_admit_exactly_one() {
        let (service, _) = get_service();
        let auction_id = create_active_auction(&service, 100).await.id;

        let handles = (0..16).map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.submit_bid(input(auction_id, "bidder-x", 150)).await })
        });
        let results: Vec<_> = join_all(handles)
            .await
            .into_iter()
            .map(|result| result.unwrap())
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| matches!(r, Err(RestError::DuplicateBid))));
        assert_eq!(service.repo.get_bids(auction_id).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_bidders_are_all_admitted() {
        let (service, _) = get_service();
        let auction_id = create_active_auction(&service, 100).await.id;

        let handles = (0..16u64).map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .submit_bid(input(auction_id, &format!("bidder-{}", i), 101 + i))
                    .await
            })
        });
        for result in join_all(handles).await {
            assert!(result.unwrap().is_ok());
        }
        assert_eq!(service.repo.get_bids(auction_id).await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_unique_violation_at_insert_is_duplicate() {
        let auction = entities::Auction {
            status: entities::AuctionStatus::Active,
            ..entities::Auction::new(
                actor("seller-1"),
                "product-1".to_string(),
                100,
                T0 + Duration::hours(1),
                T0 - Duration::hours(1),
            )
        };
        let mut db = MockDatabase::default();
        db.expect_get_auction().returning({
            let auction = auction.clone();
            move |_| Ok(auction.clone())
        });
        db.expect_get_bid_by_bidder().returning(|_, _| Ok(None));
        db.expect_add_bid()
            .times(1)
            .returning(|_| Err(RestError::DuplicateBid));
        let (service, _) = get_service_with_db(db);

        assert_eq!(
            service.submit_bid(input(auction.id, "bidder-x", 150)).await,
            Err(RestError::DuplicateBid)
        );
    }

    #[tokio::test]
    async fn test_storage_failure_at_insert_is_transient() {
        let auction = entities::Auction {
            status: entities::AuctionStatus::Active,
            ..entities::Auction::new(
                actor("seller-1"),
                "product-1".to_string(),
                100,
                T0 + Duration::hours(1),
                T0 - Duration::hours(1),
            )
        };
        let mut db = MockDatabase::default();
        db.expect_get_auction().returning({
            let auction = auction.clone();
            move |_| Ok(auction.clone())
        });
        db.expect_get_bid_by_bidder().returning(|_, _| Ok(None));
        db.expect_add_bid()
            .withf(|bid| bid.amount == 150 && bid.created_at == T0)
            .returning(|_| Err(RestError::TemporarilyUnavailable));
        let (service, _) = get_service_with_db(db);

        assert_eq!(
            service.submit_bid(input(auction.id, "bidder-x", 150)).await,
            Err(RestError::TemporarilyUnavailable)
        );
    }
}
