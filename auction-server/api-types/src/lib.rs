use {
    ::serde::{
        Deserialize,
        Serialize,
    },
    strum::AsRefStr,
    utoipa::{
        ToResponse,
        ToSchema,
    },
};

pub mod auction;
pub mod bid;

/// Identity of the caller as forwarded by the identity provider.
pub type ActorId = String;

#[derive(ToResponse, ToSchema, Serialize, Deserialize, Debug)]
#[response(description = "An error occurred processing the request")]
pub struct ErrorBodyResponse {
    pub error: String,
}

#[derive(AsRefStr, Clone, Copy)]
#[strum(prefix = "/")]
pub enum Route {
    #[strum(serialize = "v1")]
    V1,
    #[strum(serialize = "auctions")]
    Auction,
    #[strum(serialize = "")]
    Root,
    #[strum(serialize = "live")]
    Liveness,
    #[strum(serialize = "docs")]
    Docs,
    #[strum(serialize = "docs/openapi.json")]
    OpenApi,
}

#[derive(AsRefStr, Clone, Copy)]
#[strum(prefix = "/")]
pub enum AuctionRoute {
    #[strum(serialize = "")]
    Auctions,
    #[strum(serialize = ":auction_id")]
    Auction,
    #[strum(serialize = ":auction_id/activate")]
    Activate,
    #[strum(serialize = ":auction_id/cancel")]
    Cancel,
    #[strum(serialize = ":auction_id/bids")]
    Bids,
    #[strum(serialize = ":auction_id/bids/me")]
    OwnBid,
    #[strum(serialize = ":auction_id/winner")]
    Winner,
}
