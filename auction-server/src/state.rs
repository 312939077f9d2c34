use {
    crate::auction::service::Service as AuctionService,
    axum_prometheus::metrics_exporter_prometheus::PrometheusHandle,
};

pub struct Store {
    pub auction_service:  AuctionService,
    /// Request header carrying the identity of the caller.
    pub actor_header:     String,
    pub metrics_recorder: PrometheusHandle,
}
