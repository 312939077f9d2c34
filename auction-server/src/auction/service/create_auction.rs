use {
    super::Service,
    crate::{
        api::RestError,
        auction::entities,
        kernel::entities::ActorId,
    },
    time::OffsetDateTime,
};

#[derive(Debug, Clone)]
pub struct CreateAuctionInput {
    pub seller:      ActorId,
    pub product_ref: entities::ProductRef,
    pub start_price: entities::BidAmount,
    pub end_time:    OffsetDateTime,
}

impl Service {
    fn verify_create_auction(
        &self,
        input: &CreateAuctionInput,
        now: OffsetDateTime,
    ) -> Result<(), RestError> {
        if input.product_ref.trim().is_empty() {
            return Err(RestError::BadParameters(
                "Product reference must not be empty".to_string(),
            ));
        }
        if input.start_price == 0 {
            return Err(RestError::BadParameters(
                "Start price must be greater than zero".to_string(),
            ));
        }
        if input.start_price > entities::BID_AMOUNT_MAX {
            return Err(RestError::BadParameters(format!(
                "Start price must not exceed {}",
                entities::BID_AMOUNT_MAX
            )));
        }
        if input.end_time <= now {
            return Err(RestError::BadParameters(
                "End time must be in the future".to_string(),
            ));
        }
        Ok(())
    }

    #[tracing::instrument(skip_all, err(level = tracing::Level::TRACE), fields(seller = %input.seller, auction_id))]
    pub async fn create_auction(
        &self,
        input: CreateAuctionInput,
    ) -> Result<entities::Auction, RestError> {
        let now = self.now();
        self.verify_create_auction(&input, now)?;

        let auction = entities::Auction::new(
            input.seller,
            input.product_ref,
            input.start_price,
            input.end_time,
            now,
        );
        tracing::Span::current().record("auction_id", tracing::field::display(auction.id));
        let auction = self.repo.add_auction(auction).await.map_err(|e| {
            tracing::error!(error = ?e, "Failed to add auction");
            RestError::TemporarilyUnavailable
        })?;
        tracing::info!(auction_id = %auction.id, end_time = %auction.end_time, "Auction created");
        Ok(auction)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::CreateAuctionInput,
        crate::{
            api::RestError,
            auction::{
                entities,
                repository::MockDatabase,
                service::tests::{
                    get_service,
                    get_service_with_db,
                    T0,
                },
            },
            kernel::entities::test_utils::actor,
        },
        time::Duration,
    };

    fn input() -> CreateAuctionInput {
        CreateAuctionInput {
            seller:      actor("seller-1"),
            product_ref: "product-1".to_string(),
            start_price: 100,
            end_time:    T0 + Duration::hours(1),
        }
    }

    #[tokio::test]
    async fn test_create_auction_starts_as_draft() {
        let (service, _) = get_service();
        let auction = service.create_auction(input()).await.unwrap();
        assert_eq!(auction.status, entities::AuctionStatus::Draft);
        assert_eq!(auction.seller, actor("seller-1"));
        assert_eq!(auction.created_at, T0);
        assert_eq!(
            service.repo.get_auction(auction.id).await.unwrap(),
            auction
        );
    }

    #[tokio::test]
    async fn test_create_auction_rejects_invalid_input() {
        let (service, _) = get_service();
        let cases = [
            CreateAuctionInput {
                start_price: 0,
                ..input()
            },
            CreateAuctionInput {
                start_price: entities::BID_AMOUNT_MAX + 1,
                ..input()
            },
            CreateAuctionInput {
                product_ref: " ".to_string(),
                ..input()
            },
            CreateAuctionInput {
                end_time: T0,
                ..input()
            },
        ];
        for case in cases {
            assert!(matches!(
                service.create_auction(case).await,
                Err(RestError::BadParameters(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_create_auction_db_failure_is_transient() {
        let mut db = MockDatabase::default();
        db.expect_add_auction()
            .returning(|_| Err(anyhow::anyhow!("connection reset")));
        let (service, _) = get_service_with_db(db);
        assert_eq!(
            service.create_auction(input()).await,
            Err(RestError::TemporarilyUnavailable)
        );
    }
}
