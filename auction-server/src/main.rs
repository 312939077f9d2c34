use {
    anyhow::Result,
    clap::Parser,
    server::{
        run_migrations,
        start_server,
    },
    server_metrics::{
        is_metrics,
        QueryTimingLayer,
    },
    std::io::IsTerminal,
    tracing_subscriber::{
        filter::{
            self,
            FilterExt,
            LevelFilter,
        },
        layer::SubscriberExt,
        util::SubscriberInitExt,
        EnvFilter,
        Layer,
    },
};

mod api;
mod auction;
mod config;
mod kernel;
mod server;
mod server_metrics;
mod state;

#[tokio::main]
async fn main() -> Result<()> {
    // Metrics-only spans are kept out of the logs unless they opt in with `tracing_enabled`.
    let log_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy()
        .and(filter::filter_fn(|metadata| {
            !is_metrics(metadata, false) || is_metrics(metadata, true)
        }));

    // Initialize a Tracing Subscriber
    let registry = tracing_subscriber::registry()
        .with(QueryTimingLayer.with_filter(filter::filter_fn(|metadata| is_metrics(metadata, false))));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_file(false)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    // Use the compact formatter if we're in a terminal, otherwise use the JSON formatter.
    if std::io::stderr().is_terminal() {
        registry
            .with(fmt_layer.compact().with_filter(log_filter))
            .try_init()?;
    } else {
        registry
            .with(fmt_layer.json().with_filter(log_filter))
            .try_init()?;
    }

    // clap exits on its own for `--help` and invalid arguments.
    match config::Options::parse() {
        config::Options::Run(opts) => start_server(opts).await,
        config::Options::Migrate(opts) => run_migrations(opts).await,
    }
}
