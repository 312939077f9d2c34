use {
    crate::{
        bid::{
            BidAmount,
            OwnBid,
        },
        ActorId,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    time::OffsetDateTime,
    utoipa::{
        IntoParams,
        ToResponse,
        ToSchema,
    },
    uuid::Uuid,
};

pub type AuctionId = Uuid;

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum AuctionStatus {
    /// The auction was created and is not yet accepting bids.
    Draft,
    /// The auction accepts sealed bids until its end time.
    Active,
    /// The end time has passed. No more bids are accepted and the winner can be resolved.
    Ended,
    /// The seller cancelled the auction before its end time.
    Cancelled,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug)]
pub struct AuctionCreate {
    /// Opaque reference to the product being sold.
    #[schema(example = "product-8f2c")]
    pub product_ref: String,
    /// Bids must be strictly greater than this amount.
    #[schema(example = 100)]
    pub start_price: BidAmount,
    /// The time the auction closes, formatted in rfc3339.
    #[schema(example = "2026-10-16T21:26:57.329954Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub end_time:    OffsetDateTime,
}

#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, Debug)]
pub struct AuctionCreateResult {
    /// The id of the newly created auction. The auction starts in the draft state.
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id: AuctionId,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, Debug, PartialEq)]
pub struct AuctionListItem {
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id:          AuctionId,
    #[schema(example = "product-8f2c")]
    pub product_ref: String,
    #[schema(example = 100)]
    pub start_price: BidAmount,
    #[schema(example = "2026-10-16T21:26:57.329954Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub end_time:    OffsetDateTime,
}

/// Where the next page of the listing starts. Pass both values back as query parameters.
#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, Debug, PartialEq)]
pub struct AuctionCursor {
    #[schema(example = "2026-10-16T21:26:57.329954Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub after_end_time: OffsetDateTime,
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub after_id:       AuctionId,
}

#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, Debug)]
pub struct Auctions {
    pub items: Vec<AuctionListItem>,
    /// Present when more auctions may follow. Absent on the last page.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub next:  Option<AuctionCursor>,
}

/// Paging of the active auctions listing. Either both values are given or none.
#[derive(Serialize, Deserialize, IntoParams, Clone, Debug, Default)]
pub struct GetAuctionsQueryParams {
    /// End time of the last auction of the previous page, formatted in rfc3339.
    #[param(example = "2026-10-16T21:26:57.329954Z", value_type = Option<String>)]
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub after_end_time: Option<OffsetDateTime>,
    /// Id of the last auction of the previous page.
    #[param(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = Option<String>)]
    #[serde(default)]
    pub after_id:       Option<AuctionId>,
}

/// The result of a closed auction.
#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuctionOutcome {
    /// The highest bid won. Ties go to the bid that was placed first.
    #[schema(title = "Winner")]
    Winner {
        #[schema(example = "bidder-42", value_type = String)]
        bidder: ActorId,
        #[schema(example = 200)]
        amount: BidAmount,
    },
    /// The auction closed without any bids.
    #[schema(title = "NoWinner")]
    NoWinner,
}

/// What an actor is allowed to see about an auction.
///
/// Amounts of other bidders are never part of this view. The winner is only included once the auction has ended.
#[derive(Serialize, Deserialize, ToSchema, ToResponse, Clone, Debug)]
pub struct AuctionSummary {
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id:          AuctionId,
    #[schema(example = "product-8f2c")]
    pub product_ref: String,
    #[schema(example = 100)]
    pub start_price: BidAmount,
    #[schema(example = "2026-10-16T21:26:57.329954Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub end_time:    OffsetDateTime,
    pub status:      AuctionStatus,
    /// The caller's own bid, if the caller is identified and has placed one.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub own_bid:     Option<OwnBid>,
    /// Only present for ended auctions.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub outcome:     Option<AuctionOutcome>,
}

#[derive(Serialize, Deserialize, IntoParams, Clone)]
pub struct AuctionParams {
    #[param(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub auction_id: AuctionId,
}
