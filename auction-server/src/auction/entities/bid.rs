use {
    super::auction::{
        Auction,
        AuctionId,
        AuctionStatus,
    },
    crate::kernel::entities::ActorId,
    sealed_bid_api_types::{
        auction as auction_api,
        bid as api,
    },
    std::cmp::Ordering,
    time::OffsetDateTime,
    uuid::Uuid,
};

pub type BidId = Uuid;
pub type BidAmount = api::BidAmount;

// Amounts are stored as BIGINT.
pub const BID_AMOUNT_MAX: BidAmount = i64::MAX as BidAmount;

/// An admitted bid. There is no way to change or remove it afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Bid {
    pub id:         BidId,
    pub auction_id: AuctionId,
    pub bidder:     ActorId,
    pub amount:     BidAmount,
    pub created_at: OffsetDateTime,
}

impl Bid {
    pub fn new(
        auction_id: AuctionId,
        bidder: ActorId,
        amount: BidAmount,
        now: OffsetDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            auction_id,
            bidder,
            amount,
            created_at: now,
        }
    }

    /// Total order used to pick the winner: higher amount first, then the earlier bid, then the
    /// smaller id.
    pub fn rank(&self, other: &Self) -> Ordering {
        other
            .amount
            .cmp(&self.amount)
            .then(self.created_at.cmp(&other.created_at))
            .then(self.id.cmp(&other.id))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum AuctionOutcome {
    Winner(Bid),
    NoWinner,
}

impl AuctionOutcome {
    pub fn from_bids(bids: &[Bid]) -> Self {
        bids.iter()
            .min_by(|a, b| a.rank(b))
            .cloned()
            .map_or(AuctionOutcome::NoWinner, AuctionOutcome::Winner)
    }
}

/// An auction as seen by a single actor.
#[derive(Clone, Debug)]
pub struct AuctionSummary {
    pub auction: Auction,
    pub own_bid: Option<Bid>,
    pub outcome: Option<AuctionOutcome>,
}

impl From<Bid> for api::BidReceipt {
    fn from(bid: Bid) -> Self {
        Self {
            id:         bid.id,
            auction_id: bid.auction_id,
            amount:     bid.amount,
            created_at: bid.created_at,
        }
    }
}

impl From<Bid> for api::OwnBid {
    fn from(bid: Bid) -> Self {
        Self {
            id:         bid.id,
            amount:     bid.amount,
            created_at: bid.created_at,
        }
    }
}

impl From<AuctionOutcome> for auction_api::AuctionOutcome {
    fn from(outcome: AuctionOutcome) -> Self {
        match outcome {
            AuctionOutcome::Winner(bid) => auction_api::AuctionOutcome::Winner {
                bidder: bid.bidder.into(),
                amount: bid.amount,
            },
            AuctionOutcome::NoWinner => auction_api::AuctionOutcome::NoWinner,
        }
    }
}

impl From<AuctionSummary> for auction_api::AuctionSummary {
    fn from(summary: AuctionSummary) -> Self {
        let AuctionSummary {
            auction,
            own_bid,
            outcome,
        } = summary;
        // The outcome is only ever exposed for ended auctions.
        let outcome = match auction.status {
            AuctionStatus::Ended => outcome.map(Into::into),
            _ => None,
        };
        Self {
            id: auction.id,
            product_ref: auction.product_ref,
            start_price: auction.start_price,
            end_time: auction.end_time,
            status: auction.status.into(),
            own_bid: own_bid.map(Into::into),
            outcome,
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::kernel::entities::test_utils::actor,
        time::{
            macros::datetime,
            Duration,
        },
    };

    fn bid(bidder: &str, amount: BidAmount, created_at: OffsetDateTime) -> Bid {
        Bid::new(AuctionId::nil(), actor(bidder), amount, created_at)
    }

    #[test]
    fn test_outcome_without_bids() {
        assert_eq!(AuctionOutcome::from_bids(&[]), AuctionOutcome::NoWinner);
    }

    #[test]
    fn test_outcome_prefers_highest_then_earliest() {
        let t1 = datetime!(2026-10-16 12:10 UTC);
        let t2 = t1 + Duration::minutes(5);
        let t3 = t2 + Duration::minutes(5);
        let x = bid("x", 150, t1);
        let y = bid("y", 200, t2);
        let z = bid("z", 200, t3);

        for bids in [
            vec![x.clone(), y.clone(), z.clone()],
            vec![z.clone(), y.clone(), x.clone()],
            vec![y.clone(), x.clone(), z.clone()],
        ] {
            assert_eq!(AuctionOutcome::from_bids(&bids), AuctionOutcome::Winner(y.clone()));
        }
    }

    #[test]
    fn test_outcome_is_total_on_identical_timestamps() {
        let t = datetime!(2026-10-16 12:10 UTC);
        let a = bid("a", 200, t);
        let b = bid("b", 200, t);
        let expected = if a.id < b.id { a.clone() } else { b.clone() };
        assert_eq!(
            AuctionOutcome::from_bids(&[a.clone(), b.clone()]),
            AuctionOutcome::Winner(expected.clone())
        );
        assert_eq!(
            AuctionOutcome::from_bids(&[b, a]),
            AuctionOutcome::Winner(expected)
        );
    }
}
