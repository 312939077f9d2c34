use {
    crate::auction::AuctionId,
    serde::{
        Deserialize,
        Serialize,
    },
    time::OffsetDateTime,
    utoipa::{
        ToResponse,
        ToSchema,
    },
    uuid::Uuid,
};

pub type BidId = Uuid;
/// Amounts are integers in the smallest unit of the auction currency.
pub type BidAmount = u64;

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct BidCreate {
    /// Amount of the sealed bid. Must be strictly greater than the start price of the auction.
    #[schema(example = 150)]
    pub amount: BidAmount,
}

/// Proof that a bid was admitted. A bid can never be changed or withdrawn after admission.
#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, Debug, PartialEq)]
pub struct BidReceipt {
    #[schema(example = "obo3ee3e-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id:         BidId,
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub auction_id: AuctionId,
    #[schema(example = 150)]
    pub amount:     BidAmount,
    /// The time the server admitted the bid formatted in rfc3339.
    #[schema(example = "2026-10-16T21:26:57.329954Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// The caller's own bid. Only ever returned to the bidder who placed it.
#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, Debug, PartialEq)]
pub struct OwnBid {
    #[schema(example = "obo3ee3e-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id:         BidId,
    #[schema(example = 150)]
    pub amount:     BidAmount,
    #[schema(example = "2026-10-16T21:26:57.329954Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
