#[cfg(test)]
use mockall::automock;
use {
    crate::{
        api::RestError,
        auction::entities,
        kernel::{
            db::{
                from_primitive,
                to_primitive,
                DB,
            },
            entities::ActorId,
        },
    },
    axum::async_trait,
    sqlx::{
        postgres::PgArguments,
        query::Query,
        FromRow,
        Postgres,
        QueryBuilder,
    },
    std::fmt::Debug,
    time::{
        OffsetDateTime,
        PrimitiveDateTime,
    },
    tracing::instrument,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "auction_status", rename_all = "lowercase")]
pub enum AuctionStatus {
    Draft,
    Active,
    Ended,
    Cancelled,
}

impl From<AuctionStatus> for entities::AuctionStatus {
    fn from(status: AuctionStatus) -> Self {
        match status {
            AuctionStatus::Draft => entities::AuctionStatus::Draft,
            AuctionStatus::Active => entities::AuctionStatus::Active,
            AuctionStatus::Ended => entities::AuctionStatus::Ended,
            AuctionStatus::Cancelled => entities::AuctionStatus::Cancelled,
        }
    }
}

impl From<entities::AuctionStatus> for AuctionStatus {
    fn from(status: entities::AuctionStatus) -> Self {
        match status {
            entities::AuctionStatus::Draft => AuctionStatus::Draft,
            entities::AuctionStatus::Active => AuctionStatus::Active,
            entities::AuctionStatus::Ended => AuctionStatus::Ended,
            entities::AuctionStatus::Cancelled => AuctionStatus::Cancelled,
        }
    }
}

fn amount_to_db(amount: entities::BidAmount) -> anyhow::Result<i64> {
    i64::try_from(amount).map_err(|e| anyhow::anyhow!("Amount {} is not storable: {:?}", amount, e))
}

fn amount_from_db(amount: i64) -> anyhow::Result<entities::BidAmount> {
    entities::BidAmount::try_from(amount)
        .map_err(|e| anyhow::anyhow!("Stored amount {} is negative: {:?}", amount, e))
}

fn actor_from_db(actor: String) -> anyhow::Result<ActorId> {
    ActorId::try_from(actor).map_err(|e| anyhow::anyhow!("Stored actor id is invalid: {}", e))
}

#[derive(Clone, FromRow, Debug)]
pub struct Auction {
    pub id:                 entities::AuctionId,
    pub product_ref:        String,
    pub seller:             String,
    pub start_price:        i64,
    pub end_time:           PrimitiveDateTime,
    pub status:             AuctionStatus,
    pub created_at:         PrimitiveDateTime,
    #[allow(dead_code)]
    pub status_update_time: Option<PrimitiveDateTime>,
}

impl TryFrom<Auction> for entities::Auction {
    type Error = anyhow::Error;

    fn try_from(auction: Auction) -> Result<Self, Self::Error> {
        Ok(entities::Auction {
            id:          auction.id,
            product_ref: auction.product_ref,
            seller:      actor_from_db(auction.seller)?,
            start_price: amount_from_db(auction.start_price)?,
            end_time:    from_primitive(auction.end_time),
            status:      auction.status.into(),
            created_at:  from_primitive(auction.created_at),
        })
    }
}

#[derive(Clone, FromRow, Debug)]
pub struct Bid {
    pub id:         entities::BidId,
    pub auction_id: entities::AuctionId,
    pub bidder:     String,
    pub amount:     i64,
    pub created_at: PrimitiveDateTime,
}

impl TryFrom<Bid> for entities::Bid {
    type Error = anyhow::Error;

    fn try_from(bid: Bid) -> Result<Self, Self::Error> {
        Ok(entities::Bid {
            id:         bid.id,
            auction_id: bid.auction_id,
            bidder:     actor_from_db(bid.bidder)?,
            amount:     amount_from_db(bid.amount)?,
            created_at: from_primitive(bid.created_at),
        })
    }
}

/// Every status change is a conditional update on the expected current status, so concurrent
/// transitions can never overwrite each other.
fn get_update_auction_status_query(
    auction_id: entities::AuctionId,
    new_status: entities::AuctionStatus,
    now: OffsetDateTime,
) -> anyhow::Result<Query<'static, Postgres, PgArguments>> {
    let now = to_primitive(now);
    match new_status {
        entities::AuctionStatus::Draft => {
            Err(anyhow::anyhow!("Cannot update auction status to draft"))
        }
        entities::AuctionStatus::Active => Ok(sqlx::query(
            "UPDATE auction SET status = $1, status_update_time = $2 WHERE id = $3 AND status = $4 AND end_time > $2",
        )
        .bind(AuctionStatus::Active)
        .bind(now)
        .bind(auction_id)
        .bind(AuctionStatus::Draft)),
        entities::AuctionStatus::Cancelled => Ok(sqlx::query(
            "UPDATE auction SET status = $1, status_update_time = $2 WHERE id = $3 AND status IN ($4, $5) AND end_time > $2",
        )
        .bind(AuctionStatus::Cancelled)
        .bind(now)
        .bind(auction_id)
        .bind(AuctionStatus::Draft)
        .bind(AuctionStatus::Active)),
        entities::AuctionStatus::Ended => Ok(sqlx::query(
            "UPDATE auction SET status = $1, status_update_time = $2 WHERE id = $3 AND status = $4 AND end_time <= $2",
        )
        .bind(AuctionStatus::Ended)
        .bind(now)
        .bind(auction_id)
        .bind(AuctionStatus::Active)),
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Database: Debug + Send + Sync + 'static {
    async fn add_auction(&self, auction: &entities::Auction) -> anyhow::Result<()>;
    async fn get_auction(
        &self,
        auction_id: entities::AuctionId,
    ) -> Result<entities::Auction, RestError>;
    /// Active auctions open at `now` ordered by (end_time, id), starting strictly after `after`.
    async fn get_active_auctions(
        &self,
        now: OffsetDateTime,
        after: Option<entities::AuctionCursor>,
        limit: usize,
    ) -> Result<Vec<entities::Auction>, RestError>;
    /// Returns false when the auction was not in a state allowing the transition at `now`.
    async fn update_auction_status(
        &self,
        auction_id: entities::AuctionId,
        new_status: entities::AuctionStatus,
        now: OffsetDateTime,
    ) -> anyhow::Result<bool>;
    async fn end_expired_auctions(
        &self,
        now: OffsetDateTime,
    ) -> anyhow::Result<Vec<entities::AuctionId>>;
    /// Inserts the bid only if its auction is active and not past its end time at `bid.created_at`.
    /// A second bid for the same (auction, bidder) fails with `RestError::DuplicateBid`.
    async fn add_bid(&self, bid: &entities::Bid) -> Result<(), RestError>;
    async fn get_bid_by_bidder(
        &self,
        auction_id: entities::AuctionId,
        bidder: &ActorId,
    ) -> Result<Option<entities::Bid>, RestError>;
    /// All bids of the auction, oldest first.
    async fn get_bids(&self, auction_id: entities::AuctionId)
        -> Result<Vec<entities::Bid>, RestError>;
}

#[async_trait]
impl Database for DB {
    #[instrument(
        target = "metrics",
        name = "db_add_auction",
        fields(
            category = "db_queries",
            result = "success",
            name = "add_auction",
            tracing_enabled
        ),
        skip_all
    )]
    async fn add_auction(&self, auction: &entities::Auction) -> anyhow::Result<()> {
        sqlx::query("INSERT INTO auction (id, product_ref, seller, start_price, end_time, status, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)")
            .bind(auction.id)
            .bind(&auction.product_ref)
            .bind(auction.seller.as_str())
            .bind(amount_to_db(auction.start_price)?)
            .bind(to_primitive(auction.end_time))
            .bind(AuctionStatus::from(auction.status))
            .bind(to_primitive(auction.created_at))
            .execute(self)
            .await
            .inspect_err(|_| {
                tracing::Span::current().record("result", "error");
            })?;
        Ok(())
    }

    #[instrument(
        target = "metrics",
        name = "db_get_auction",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_auction",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_auction(
        &self,
        auction_id: entities::AuctionId,
    ) -> Result<entities::Auction, RestError> {
        let auction: Auction = sqlx::query_as("SELECT * FROM auction WHERE id = $1")
            .bind(auction_id)
            .fetch_one(self)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => RestError::AuctionNotFound,
                _ => {
                    tracing::Span::current().record("result", "error");
                    tracing::error!(
                        error = e.to_string(),
                        auction_id = auction_id.to_string(),
                        "Failed to get auction from db"
                    );
                    RestError::TemporarilyUnavailable
                }
            })?;
        entities::Auction::try_from(auction.clone()).map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!(error = e.to_string(), auction = ?auction, "Failed to convert auction to entity");
            RestError::TemporarilyUnavailable
        })
    }

    #[instrument(
        target = "metrics",
        name = "db_get_active_auctions",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_active_auctions",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_active_auctions(
        &self,
        now: OffsetDateTime,
        after: Option<entities::AuctionCursor>,
        limit: usize,
    ) -> Result<Vec<entities::Auction>, RestError> {
        let mut query = QueryBuilder::new("SELECT * FROM auction WHERE status = ");
        query.push_bind(AuctionStatus::Active);
        query.push(" AND end_time > ");
        query.push_bind(to_primitive(now));
        if let Some(after) = after {
            query.push(" AND (end_time, id) > (");
            query.push_bind(to_primitive(after.end_time));
            query.push(", ");
            query.push_bind(after.id);
            query.push(")");
        }
        query.push(" ORDER BY end_time ASC, id ASC LIMIT ");
        query.push_bind(limit as i64);
        let auctions: Vec<Auction> = query.build_query_as().fetch_all(self).await.map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!(
                "DB: Failed to fetch active auctions: {} - after: {:?}",
                e,
                after
            );
            RestError::TemporarilyUnavailable
        })?;

        auctions
            .into_iter()
            .map(|auction| {
                entities::Auction::try_from(auction.clone()).map_err(|e| {
                    tracing::error!(error = e.to_string(), auction = ?auction, "Failed to convert auction to entity");
                    RestError::TemporarilyUnavailable
                })
            })
            .collect()
    }

    #[instrument(
        target = "metrics",
        name = "db_update_auction_status",
        fields(
            category = "db_queries",
            result = "success",
            name = "update_auction_status",
            tracing_enabled
        ),
        skip_all
    )]
    async fn update_auction_status(
        &self,
        auction_id: entities::AuctionId,
        new_status: entities::AuctionStatus,
        now: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        let query = get_update_auction_status_query(auction_id, new_status, now)?;
        let result = query.execute(self).await.inspect_err(|_| {
            tracing::Span::current().record("result", "error");
        })?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(
        target = "metrics",
        name = "db_end_expired_auctions",
        fields(
            category = "db_queries",
            result = "success",
            name = "end_expired_auctions",
            tracing_enabled
        ),
        skip_all
    )]
    async fn end_expired_auctions(
        &self,
        now: OffsetDateTime,
    ) -> anyhow::Result<Vec<entities::AuctionId>> {
        let ids: Vec<(entities::AuctionId,)> = sqlx::query_as(
            "UPDATE auction SET status = $1, status_update_time = $2 WHERE status = $3 AND end_time <= $2 RETURNING id",
        )
        .bind(AuctionStatus::Ended)
        .bind(to_primitive(now))
        .bind(AuctionStatus::Active)
        .fetch_all(self)
        .await
        .inspect_err(|_| {
            tracing::Span::current().record("result", "error");
        })?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    #[instrument(
        target = "metrics",
        name = "db_add_bid",
        fields(
            category = "db_queries",
            result = "success",
            name = "add_bid",
            tracing_enabled
        ),
        skip_all
    )]
    async fn add_bid(&self, bid: &entities::Bid) -> Result<(), RestError> {
        let amount = amount_to_db(bid.amount).map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!(error = e.to_string(), bid = ?bid, "Failed to convert bid amount");
            RestError::TemporarilyUnavailable
        })?;
        // The liveness check and the insert are one statement. The share lock on the auction row
        // makes a concurrent status change wait for this insert, or this insert see its result.
        // The end time is checked against both the admission time and the database clock at
        // execution, so a statement delayed past the end can not commit.
        let result = sqlx::query(
            "INSERT INTO bid (id, auction_id, bidder, amount, created_at) \
             SELECT $1, auction.id, $3, $4, $5 FROM auction \
             WHERE auction.id = $2 AND auction.status = $6 AND auction.end_time > $5 \
             AND auction.end_time > (clock_timestamp() AT TIME ZONE 'UTC') \
             FOR SHARE",
        )
        .bind(bid.id)
        .bind(bid.auction_id)
        .bind(bid.bidder.as_str())
        .bind(amount)
        .bind(to_primitive(bid.created_at))
        .bind(AuctionStatus::Active)
        .execute(self)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_error) if db_error.is_unique_violation() => {
                RestError::DuplicateBid
            }
            _ => {
                tracing::Span::current().record("result", "error");
                tracing::error!(error = e.to_string(), bid = ?bid, "DB: Failed to insert bid");
                RestError::TemporarilyUnavailable
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(RestError::AuctionNotActive);
        }
        Ok(())
    }

    #[instrument(
        target = "metrics",
        name = "db_get_bid_by_bidder",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_bid_by_bidder",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_bid_by_bidder(
        &self,
        auction_id: entities::AuctionId,
        bidder: &ActorId,
    ) -> Result<Option<entities::Bid>, RestError> {
        let bid: Option<Bid> =
            sqlx::query_as("SELECT * FROM bid WHERE auction_id = $1 AND bidder = $2")
                .bind(auction_id)
                .bind(bidder.as_str())
                .fetch_optional(self)
                .await
                .map_err(|e| {
                    tracing::Span::current().record("result", "error");
                    tracing::error!(
                        error = e.to_string(),
                        auction_id = auction_id.to_string(),
                        "Failed to get bid of bidder from db"
                    );
                    RestError::TemporarilyUnavailable
                })?;

        bid.map(|bid| {
            entities::Bid::try_from(bid.clone()).map_err(|e| {
                tracing::error!(error = e.to_string(), bid = ?bid, "Failed to convert bid to entity");
                RestError::TemporarilyUnavailable
            })
        })
        .transpose()
    }

    #[instrument(
        target = "metrics",
        name = "db_get_bids",
        fields(
            category = "db_queries",
            result = "success",
            name = "get_bids",
            tracing_enabled
        ),
        skip_all
    )]
    async fn get_bids(
        &self,
        auction_id: entities::AuctionId,
    ) -> Result<Vec<entities::Bid>, RestError> {
        let bids: Vec<Bid> = sqlx::query_as(
            "SELECT * FROM bid WHERE auction_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(auction_id)
        .fetch_all(self)
        .await
        .map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!("DB: Failed to fetch bids: {}", e);
            RestError::TemporarilyUnavailable
        })?;

        bids.into_iter()
            .map(|bid| {
                entities::Bid::try_from(bid.clone()).map_err(|e| {
                    tracing::error!(error = e.to_string(), bid = ?bid, "Failed to convert bid to entity");
                    RestError::TemporarilyUnavailable
                })
            })
            .collect()
    }
}
