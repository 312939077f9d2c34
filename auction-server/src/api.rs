use {
    crate::{
        auction,
        config::RunOptions,
        kernel::entities::ActorId,
        server::{
            EXIT_CHECK_INTERVAL,
            SHOULD_EXIT,
        },
        state::Store,
    },
    anyhow::Result,
    axum::{
        async_trait,
        extract::FromRequestParts,
        http::{
            request::Parts,
            StatusCode,
        },
        response::{
            IntoResponse,
            Response,
        },
        routing::get,
        Json,
        Router,
    },
    axum_prometheus::PrometheusMetricLayerBuilder,
    clap::crate_version,
    sealed_bid_api_types::{
        auction::{
            AuctionCreate,
            AuctionCreateResult,
            AuctionCursor,
            AuctionListItem,
            AuctionOutcome,
            AuctionStatus,
            AuctionSummary,
            Auctions,
        },
        bid::{
            BidCreate,
            BidReceipt,
            OwnBid,
        },
        ErrorBodyResponse,
        Route,
    },
    std::sync::{
        atomic::Ordering,
        Arc,
    },
    tower_http::cors::CorsLayer,
    utoipa::OpenApi,
    utoipa_redoc::{
        Redoc,
        Servable,
    },
};

async fn root() -> String {
    format!("Sealed Bid Auction Server API {}", crate_version!())
}

#[derive(Debug, Clone, PartialEq)]
pub enum RestError {
    /// The request contained invalid parameters
    BadParameters(String),
    /// The bid is not above the start price of the auction
    BidAmountTooLow { start_price: u64 },
    /// The caller is not identified or not allowed to perform the operation
    Unauthorized,
    /// The auction was not found
    AuctionNotFound,
    /// The caller has not placed a bid on the auction
    BidNotFound,
    /// The caller already placed a bid on the auction
    DuplicateBid,
    /// The auction is not in a state that allows the operation
    InvalidAuctionState(String),
    /// The auction is not accepting bids
    AuctionNotActive,
    /// Internal error occurred during processing the request
    TemporarilyUnavailable,
}

impl RestError {
    pub fn to_status_and_message(&self) -> (StatusCode, String) {
        match self {
            RestError::BadParameters(msg) => {
                (StatusCode::BAD_REQUEST, format!("Bad parameters: {}", msg))
            }
            RestError::BidAmountTooLow { start_price } => (
                StatusCode::BAD_REQUEST,
                format!(
                    "Bid amount must be greater than the start price of {}",
                    start_price
                ),
            ),
            RestError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized access".to_string(),
            ),
            RestError::AuctionNotFound => (
                StatusCode::NOT_FOUND,
                "Auction with the specified id was not found".to_string(),
            ),
            RestError::BidNotFound => (
                StatusCode::NOT_FOUND,
                "You have not placed a bid on this auction".to_string(),
            ),
            RestError::DuplicateBid => (
                StatusCode::CONFLICT,
                "You already placed a bid on this auction".to_string(),
            ),
            RestError::InvalidAuctionState(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Invalid auction state: {}", msg),
            ),
            RestError::AuctionNotActive => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Auction is not accepting bids".to_string(),
            ),
            RestError::TemporarilyUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "This service is temporarily unavailable".to_string(),
            ),
        }
    }
}

impl std::fmt::Display for RestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_status_and_message().1)
    }
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let (status, msg) = self.to_status_and_message();
        (status, Json(ErrorBodyResponse { error: msg })).into_response()
    }
}

pub async fn live() -> Response {
    (StatusCode::OK, "OK").into_response()
}

/// Identity of the caller, as forwarded by the identity provider in the configured header.
#[derive(Debug, Clone, PartialEq)]
pub enum Auth {
    Actor(ActorId),
    Anonymous,
}

impl Auth {
    pub fn actor(self) -> Option<ActorId> {
        match self {
            Auth::Actor(actor) => Some(actor),
            Auth::Anonymous => None,
        }
    }

    pub fn required(self) -> Result<ActorId, RestError> {
        self.actor().ok_or(RestError::Unauthorized)
    }

    fn from_header_value(value: Option<&[u8]>) -> Result<Self, RestError> {
        let Some(value) = value else {
            return Ok(Auth::Anonymous);
        };
        let value = std::str::from_utf8(value).map_err(|_| RestError::Unauthorized)?;
        ActorId::try_from(value.to_string())
            .map(Auth::Actor)
            .map_err(|e| {
                tracing::debug!(error = %e, "Rejected actor header");
                RestError::Unauthorized
            })
    }
}

#[async_trait]
impl FromRequestParts<Arc<Store>> for Auth {
    type Rejection = RestError;

    async fn from_request_parts(
        parts: &mut Parts,
        store: &Arc<Store>,
    ) -> Result<Self, Self::Rejection> {
        Auth::from_header_value(
            parts
                .headers
                .get(store.actor_header.as_str())
                .map(|value| value.as_bytes()),
        )
    }
}

// Make sure functions included in the paths section have distinct names, otherwise some api generators will fail
#[derive(OpenApi)]
#[openapi(
    paths(
        auction::api::post_auction,
        auction::api::get_auctions,
        auction::api::get_auction,
        auction::api::post_activate_auction,
        auction::api::post_cancel_auction,
        auction::api::post_bid,
        auction::api::get_own_bid,
        auction::api::get_winner,
    ),
    components(
        schemas(
            AuctionCreate,
            AuctionCreateResult,
            AuctionCursor,
            AuctionListItem,
            AuctionOutcome,
            AuctionStatus,
            AuctionSummary,
            Auctions,
            BidCreate,
            BidReceipt,
            OwnBid,
            ErrorBodyResponse,
        ),
        responses(
            ErrorBodyResponse,
            AuctionSummary,
            BidReceipt,
        ),
    ),
    tags(
        (name = "Sealed Bid Auction Server", description = "Auction Server runs sealed-bid auctions. \
        Sellers open and close auctions, bidders place a single hidden bid and the highest bid wins once the auction ends.")
    )
)]
pub struct ApiDoc;

pub fn get_router(store: Arc<Store>) -> Router<()> {
    let (prometheus_layer, _) = PrometheusMetricLayerBuilder::new()
        .with_metrics_from_fn(|| store.metrics_recorder.clone())
        .build_pair();

    let v1_routes = Router::new().nest(
        Route::V1.as_ref(),
        Router::new().nest(Route::Auction.as_ref(), auction::api::get_routes()),
    );

    Router::new()
        .merge(Redoc::with_url(Route::Docs.as_ref(), ApiDoc::openapi()))
        .route(Route::OpenApi.as_ref(), get(|| async { Json(ApiDoc::openapi()) }))
        .merge(v1_routes)
        .route(Route::Root.as_ref(), get(root))
        .route(Route::Liveness.as_ref(), get(live))
        .layer(CorsLayer::permissive())
        .layer(prometheus_layer)
        .with_state(store)
}

pub async fn start_api(run_options: RunOptions, store: Arc<Store>) -> Result<()> {
    let app = get_router(store);
    let listener = tokio::net::TcpListener::bind(&run_options.server.listen_addr).await?;
    tracing::info!(addr = %run_options.server.listen_addr, "Starting API server...");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            while !SHOULD_EXIT.load(Ordering::Acquire) {
                tokio::time::sleep(EXIT_CHECK_INTERVAL).await;
            }
            tracing::info!("Shutting down RPC server...");
        })
        .await?;
    Ok(())
}
