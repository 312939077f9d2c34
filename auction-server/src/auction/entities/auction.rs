use {
    super::bid::BidAmount,
    crate::kernel::{
        clock::has_ended,
        entities::ActorId,
    },
    sealed_bid_api_types::auction as api,
    time::OffsetDateTime,
    uuid::Uuid,
};

pub type AuctionId = Uuid;
pub type ProductRef = String;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuctionStatus {
    Draft,
    Active,
    Ended,
    Cancelled,
}

impl AuctionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AuctionStatus::Ended | AuctionStatus::Cancelled)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Auction {
    pub id:          AuctionId,
    pub product_ref: ProductRef,
    pub seller:      ActorId,
    pub start_price: BidAmount,
    pub end_time:    OffsetDateTime,
    pub status:      AuctionStatus,
    pub created_at:  OffsetDateTime,
}

impl Auction {
    pub fn new(
        seller: ActorId,
        product_ref: ProductRef,
        start_price: BidAmount,
        end_time: OffsetDateTime,
        now: OffsetDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_ref,
            seller,
            start_price,
            end_time,
            status: AuctionStatus::Draft,
            created_at: now,
        }
    }

    pub fn has_ended(&self, now: OffsetDateTime) -> bool {
        has_ended(self.end_time, now)
    }

    /// The status the auction is in at `now`, which differs from the stored one
    /// when the auction is still flagged active after its end time.
    pub fn status_at(&self, now: OffsetDateTime) -> AuctionStatus {
        match self.status {
            AuctionStatus::Active if self.has_ended(now) => AuctionStatus::Ended,
            status => status,
        }
    }
}

/// Position in the active auctions listing, which is ordered by end time and then by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuctionCursor {
    pub end_time: OffsetDateTime,
    pub id:       AuctionId,
}

impl From<&Auction> for AuctionCursor {
    fn from(auction: &Auction) -> Self {
        Self {
            end_time: auction.end_time,
            id:       auction.id,
        }
    }
}

/// One page of active auctions. `next` is set when more auctions may follow.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveAuctions {
    pub auctions: Vec<Auction>,
    pub next:     Option<AuctionCursor>,
}

impl From<AuctionStatus> for api::AuctionStatus {
    fn from(status: AuctionStatus) -> Self {
        match status {
            AuctionStatus::Draft => api::AuctionStatus::Draft,
            AuctionStatus::Active => api::AuctionStatus::Active,
            AuctionStatus::Ended => api::AuctionStatus::Ended,
            AuctionStatus::Cancelled => api::AuctionStatus::Cancelled,
        }
    }
}

impl From<Auction> for api::AuctionListItem {
    fn from(auction: Auction) -> Self {
        Self {
            id:          auction.id,
            product_ref: auction.product_ref,
            start_price: auction.start_price,
            end_time:    auction.end_time,
        }
    }
}

impl From<AuctionCursor> for api::AuctionCursor {
    fn from(cursor: AuctionCursor) -> Self {
        Self {
            after_end_time: cursor.end_time,
            after_id:       cursor.id,
        }
    }
}

impl From<ActiveAuctions> for api::Auctions {
    fn from(page: ActiveAuctions) -> Self {
        Self {
            items: page.auctions.into_iter().map(Into::into).collect(),
            next:  page.next.map(Into::into),
        }
    }
}
