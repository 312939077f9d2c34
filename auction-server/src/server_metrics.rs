//! Prometheus metrics of the auction server, served over `/metrics` on their own listener.
//!
//! Two sources feed the recorder. Database spans emitted with the `metrics` target are timed by
//! [`QueryTimingLayer`], and the auction service reports what happened to bids and auctions through
//! the `record_*` functions below.
use {
    crate::{
        api::RestError,
        auction::entities,
        config::RunOptions,
        server::{
            EXIT_CHECK_INTERVAL,
            SHOULD_EXIT,
        },
        state::Store,
    },
    anyhow::{
        anyhow,
        Result,
    },
    axum::{
        routing::get,
        Router,
    },
    axum_prometheus::{
        metrics,
        metrics_exporter_prometheus::{
            Matcher,
            PrometheusBuilder,
            PrometheusHandle,
        },
    },
    std::{
        fmt::Debug,
        sync::{
            atomic::Ordering,
            Arc,
        },
        time::Instant,
    },
    tracing::{
        field::{
            Field,
            Visit,
        },
        span::{
            Attributes,
            Record,
        },
        Id,
        Metadata,
        Subscriber,
    },
    tracing_subscriber::{
        layer::Context,
        registry::LookupSpan,
        Layer,
    },
};

pub const BID_ADMISSIONS_TOTAL: &str = "bid_admissions_total";
pub const WINNER_RESOLUTIONS_TOTAL: &str = "winner_resolutions_total";
pub const WINNER_RESOLUTION_BIDS: &str = "winner_resolution_bids";
pub const AUCTIONS_ENDED_TOTAL: &str = "auctions_ended_total";
const DB_QUERY_DURATION: &str = "db_queries_duration_seconds";

/// Number of bids an auction is resolved over. One bid per bidder keeps this small.
const WINNER_RESOLUTION_BID_BUCKETS: &[f64] = &[0.0, 1.0, 2.0, 3.0, 5.0, 10.0, 25.0, 50.0, 100.0];
/// Admission is a single statement, anything above a second is an outage.
const DB_QUERY_DURATION_BUCKETS: &[f64] = &[
    0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Label of a bid submission result in `bid_admissions_total`.
pub fn admission_outcome(result: &Result<entities::Bid, RestError>) -> &'static str {
    match result {
        Ok(_) => "admitted",
        Err(RestError::DuplicateBid) => "duplicate",
        Err(RestError::AuctionNotActive) => "not_active",
        Err(RestError::BidAmountTooLow { .. }) => "too_low",
        Err(RestError::BadParameters(_)) => "invalid_amount",
        Err(RestError::AuctionNotFound) => "unknown_auction",
        Err(RestError::TemporarilyUnavailable) => "unavailable",
        Err(_) => "rejected",
    }
}

pub fn record_admission(result: &Result<entities::Bid, RestError>) {
    metrics::counter!(BID_ADMISSIONS_TOTAL, "outcome" => admission_outcome(result)).increment(1);
}

pub fn record_resolution(outcome: &entities::AuctionOutcome, bid_count: usize) {
    let label = match outcome {
        entities::AuctionOutcome::Winner(_) => "winner",
        entities::AuctionOutcome::NoWinner => "no_winner",
    };
    metrics::counter!(WINNER_RESOLUTIONS_TOTAL, "outcome" => label).increment(1);
    metrics::histogram!(WINNER_RESOLUTION_BIDS).record(bid_count as f64);
}

pub fn record_auctions_ended(count: usize) {
    metrics::counter!(AUCTIONS_ENDED_TOTAL).increment(count as u64);
}

fn recorder_builder() -> Result<PrometheusBuilder> {
    Ok(PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(WINNER_RESOLUTION_BIDS.to_string()),
            WINNER_RESOLUTION_BID_BUCKETS,
        )?
        .set_buckets_for_metric(
            Matcher::Full(DB_QUERY_DURATION.to_string()),
            DB_QUERY_DURATION_BUCKETS,
        )?)
}

pub fn install_recorder() -> Result<PrometheusHandle> {
    recorder_builder()?
        .install_recorder()
        .map_err(|err| anyhow!("Failed to install prometheus recorder: {:?}", err))
}

/// Whether the span is meant for [`QueryTimingLayer`]. With `require_tracing` the span must also
/// carry a `tracing_enabled` field to show up in the logs.
pub fn is_metrics(metadata: &Metadata, require_tracing: bool) -> bool {
    metadata.target().starts_with("metrics")
        && (!require_tracing || metadata.fields().field("tracing_enabled").is_some())
}

/// Labels collected from the `category`, `name` and `result` fields of a metrics span.
#[derive(Debug)]
struct SpanLabels {
    opened:   Instant,
    category: Option<String>,
    name:     Option<String>,
    result:   Option<String>,
}

impl SpanLabels {
    fn new() -> Self {
        Self {
            opened:   Instant::now(),
            category: None,
            name:     None,
            result:   None,
        }
    }

    fn observe(&self, span_name: &str) {
        let category = self.category.as_deref().unwrap_or("unknown");
        let labels = [
            ("name", self.name.as_deref().unwrap_or(span_name).to_string()),
            (
                "result",
                self.result.as_deref().unwrap_or("unknown").to_string(),
            ),
        ];
        metrics::histogram!(format!("{}_duration_seconds", category), &labels)
            .record(self.opened.elapsed().as_secs_f64());
        metrics::counter!(format!("{}_total", category), &labels).increment(1);
    }
}

impl Visit for SpanLabels {
    fn record_str(&mut self, field: &Field, value: &str) {
        let slot = match field.name() {
            "category" => &mut self.category,
            "name" => &mut self.name,
            "result" => &mut self.result,
            _ => return,
        };
        *slot = Some(value.to_string());
    }

    fn record_debug(&mut self, _field: &Field, _value: &dyn Debug) {}
}

/// Times spans with the `metrics` target into `<category>_duration_seconds` and counts them into
/// `<category>_total`.
pub struct QueryTimingLayer;

impl<S> Layer<S> for QueryTimingLayer
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut labels = SpanLabels::new();
        attrs.record(&mut labels);
        span.extensions_mut().replace(labels);
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        if let Some(labels) = span.extensions_mut().get_mut::<SpanLabels>() {
            values.record(labels);
        };
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        match span.extensions().get::<SpanLabels>() {
            Some(labels) => labels.observe(span.metadata().name()),
            None => tracing::warn!(span = span.metadata().name(), "Metrics span closed without labels"),
        };
    }
}

pub async fn start_metrics(run_options: RunOptions, store: Arc<Store>) -> Result<()> {
    tracing::info!(addr = %run_options.server.metrics_addr, "Starting Metrics Server...");

    let handle = store.metrics_recorder.clone();
    let app = Router::new().route("/metrics", get(|| async move { handle.render() }));

    let listener = tokio::net::TcpListener::bind(&run_options.server.metrics_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            while !SHOULD_EXIT.load(Ordering::Acquire) {
                tokio::time::sleep(EXIT_CHECK_INTERVAL).await;
            }
            tracing::info!("Shutting down metrics server...");
        })
        .await?;
    Ok(())
}
