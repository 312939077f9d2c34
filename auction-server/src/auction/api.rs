use {
    super::{
        entities,
        service::{
            activate_auction::ActivateAuctionInput,
            cancel_auction::CancelAuctionInput,
            create_auction::CreateAuctionInput,
            get_active_auctions::GetActiveAuctionsInput,
            get_auction_summary::GetAuctionSummaryInput,
            get_own_bid::GetOwnBidInput,
            resolve_winner::ResolveWinnerInput,
            submit_bid::SubmitBidInput,
        },
    },
    crate::{
        api::{
            Auth,
            RestError,
        },
        state::Store,
    },
    axum::{
        extract::{
            Path,
            Query,
            State,
        },
        routing::{
            get,
            post,
        },
        Json,
        Router,
    },
    sealed_bid_api_types::{
        auction::{
            AuctionCreate,
            AuctionCreateResult,
            AuctionOutcome,
            AuctionParams,
            AuctionSummary,
            Auctions,
            GetAuctionsQueryParams,
        },
        bid::{
            BidCreate,
            BidReceipt,
            OwnBid,
        },
        AuctionRoute,
        ErrorBodyResponse,
    },
    std::sync::Arc,
};

/// Create a new auction owned by the caller.
///
/// The auction starts in the draft state and does not accept bids until the seller activates it.
#[utoipa::path(post, path = "/v1/auctions", request_body = AuctionCreate, responses(
    (status = 200, description = "Auction was created successfully", body = AuctionCreateResult),
    (status = 400, response = ErrorBodyResponse),
    (status = 401, response = ErrorBodyResponse),
),)]
pub async fn post_auction(
    auth: Auth,
    State(store): State<Arc<Store>>,
    Json(auction_create): Json<AuctionCreate>,
) -> Result<Json<AuctionCreateResult>, RestError> {
    let seller = auth.required()?;
    let auction = store
        .auction_service
        .create_auction(CreateAuctionInput {
            seller,
            product_ref: auction_create.product_ref,
            start_price: auction_create.start_price,
            end_time: auction_create.end_time,
        })
        .await?;
    Ok(Json(AuctionCreateResult { id: auction.id }))
}

/// List the auctions currently accepting bids, soonest to close first.
///
/// At most 100 auctions are returned per page. When more may follow, the response carries the
/// cursor of the next page.
#[utoipa::path(get, path = "/v1/auctions", params(GetAuctionsQueryParams), responses(
    (status = 200, body = Auctions),
    (status = 400, response = ErrorBodyResponse),
    (status = 503, response = ErrorBodyResponse),
),)]
pub async fn get_auctions(
    State(store): State<Arc<Store>>,
    Query(params): Query<GetAuctionsQueryParams>,
) -> Result<Json<Auctions>, RestError> {
    let page = store
        .auction_service
        .get_active_auctions(GetActiveAuctionsInput {
            after: parse_cursor(&params)?,
        })
        .await?;
    Ok(Json(page.into()))
}

fn parse_cursor(
    params: &GetAuctionsQueryParams,
) -> Result<Option<entities::AuctionCursor>, RestError> {
    match (params.after_end_time, params.after_id) {
        (Some(end_time), Some(id)) => Ok(Some(entities::AuctionCursor { end_time, id })),
        (None, None) => Ok(None),
        _ => Err(RestError::BadParameters(
            "after_end_time and after_id must be given together".to_string(),
        )),
    }
}

/// Get the details of an auction.
///
/// Includes the caller's own bid if they placed one. Bids of other bidders are never shown.
/// Once the auction has ended the winning bidder and amount are included.
#[utoipa::path(get, path = "/v1/auctions/{auction_id}", params(AuctionParams), responses(
    (status = 200, body = AuctionSummary),
    (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
),)]
pub async fn get_auction(
    auth: Auth,
    State(store): State<Arc<Store>>,
    Path(params): Path<AuctionParams>,
) -> Result<Json<AuctionSummary>, RestError> {
    let summary = store
        .auction_service
        .get_auction_summary(GetAuctionSummaryInput {
            auction_id: params.auction_id,
            actor:      auth.actor(),
        })
        .await?;
    Ok(Json(summary.into()))
}

/// Open a draft auction for bidding. Only the seller can activate an auction.
#[utoipa::path(post, path = "/v1/auctions/{auction_id}/activate", params(AuctionParams), responses(
    (status = 200, description = "Auction was activated successfully"),
    (status = 401, response = ErrorBodyResponse),
    (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
    (status = 422, response = ErrorBodyResponse),
),)]
pub async fn post_activate_auction(
    auth: Auth,
    State(store): State<Arc<Store>>,
    Path(params): Path<AuctionParams>,
) -> Result<Json<()>, RestError> {
    store
        .auction_service
        .activate_auction(ActivateAuctionInput {
            auction_id: params.auction_id,
            actor:      auth.required()?,
        })
        .await?;
    Ok(Json(()))
}

/// Cancel an auction before its end time. Only the seller can cancel an auction.
#[utoipa::path(post, path = "/v1/auctions/{auction_id}/cancel", params(AuctionParams), responses(
    (status = 200, description = "Auction was cancelled successfully"),
    (status = 401, response = ErrorBodyResponse),
    (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
    (status = 422, response = ErrorBodyResponse),
),)]
pub async fn post_cancel_auction(
    auth: Auth,
    State(store): State<Arc<Store>>,
    Path(params): Path<AuctionParams>,
) -> Result<Json<()>, RestError> {
    store
        .auction_service
        .cancel_auction(CancelAuctionInput {
            auction_id: params.auction_id,
            actor:      auth.required()?,
        })
        .await?;
    Ok(Json(()))
}

/// Place a sealed bid on an active auction.
///
/// Every bidder can place exactly one bid per auction. A placed bid can not be changed or withdrawn.
#[utoipa::path(post, path = "/v1/auctions/{auction_id}/bids", params(AuctionParams), request_body = BidCreate, responses(
    (status = 200, description = "Bid was placed successfully", body = BidReceipt),
    (status = 400, response = ErrorBodyResponse),
    (status = 401, response = ErrorBodyResponse),
    (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
    (status = 409, description = "A bid was already placed", body = ErrorBodyResponse),
    (status = 422, response = ErrorBodyResponse),
    (status = 503, response = ErrorBodyResponse),
),)]
pub async fn post_bid(
    auth: Auth,
    State(store): State<Arc<Store>>,
    Path(params): Path<AuctionParams>,
    Json(bid_create): Json<BidCreate>,
) -> Result<Json<BidReceipt>, RestError> {
    let bid = store
        .auction_service
        .submit_bid(SubmitBidInput {
            auction_id: params.auction_id,
            bidder:     auth.required()?,
            amount:     bid_create.amount,
        })
        .await?;
    Ok(Json(bid.into()))
}

/// Get the bid the caller placed on an auction.
#[utoipa::path(get, path = "/v1/auctions/{auction_id}/bids/me", params(AuctionParams), responses(
    (status = 200, body = OwnBid),
    (status = 401, response = ErrorBodyResponse),
    (status = 404, description = "Auction or bid was not found", body = ErrorBodyResponse),
),)]
pub async fn get_own_bid(
    auth: Auth,
    State(store): State<Arc<Store>>,
    Path(params): Path<AuctionParams>,
) -> Result<Json<OwnBid>, RestError> {
    let bid = store
        .auction_service
        .get_own_bid(GetOwnBidInput {
            auction_id: params.auction_id,
            bidder:     auth.required()?,
        })
        .await?
        .ok_or(RestError::BidNotFound)?;
    Ok(Json(bid.into()))
}

/// Get the outcome of an ended auction.
#[utoipa::path(get, path = "/v1/auctions/{auction_id}/winner", params(AuctionParams), responses(
    (status = 200, body = AuctionOutcome),
    (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
    (status = 422, description = "Auction has not ended", body = ErrorBodyResponse),
),)]
pub async fn get_winner(
    State(store): State<Arc<Store>>,
    Path(params): Path<AuctionParams>,
) -> Result<Json<AuctionOutcome>, RestError> {
    let outcome: entities::AuctionOutcome = store
        .auction_service
        .resolve_winner(ResolveWinnerInput {
            auction_id: params.auction_id,
        })
        .await?;
    Ok(Json(outcome.into()))
}

pub fn get_routes() -> Router<Arc<Store>> {
    Router::new()
        .route(
            AuctionRoute::Auctions.as_ref(),
            post(post_auction).get(get_auctions),
        )
        .route(AuctionRoute::Auction.as_ref(), get(get_auction))
        .route(AuctionRoute::Activate.as_ref(), post(post_activate_auction))
        .route(AuctionRoute::Cancel.as_ref(), post(post_cancel_auction))
        .route(AuctionRoute::Bids.as_ref(), post(post_bid))
        .route(AuctionRoute::OwnBid.as_ref(), get(get_own_bid))
        .route(AuctionRoute::Winner.as_ref(), get(get_winner))
}
