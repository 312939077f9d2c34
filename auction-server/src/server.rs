use {
    crate::{
        api,
        auction::service::Service as AuctionService,
        config::{
            Config,
            MigrateOptions,
            RunOptions,
        },
        kernel::{
            clock::SystemClock,
            db::{
                self,
                MIGRATOR,
            },
        },
        server_metrics::{
            install_recorder,
            start_metrics,
        },
        state::Store,
    },
    anyhow::anyhow,
    std::{
        sync::{
            atomic::{
                AtomicBool,
                Ordering,
            },
            Arc,
        },
        time::Duration,
    },
    tokio_util::task::TaskTracker,
};

pub async fn run_migrations(migrate_options: MigrateOptions) -> anyhow::Result<()> {
    let pool = db::connect(&migrate_options.database.database_url, 1).await?;
    MIGRATOR
        .run(&pool)
        .await
        .map_err(|err| anyhow!("Failed to run migrations: {:?}", err))?;
    tracing::info!("Migrations applied");
    Ok(())
}

pub async fn start_server(run_options: RunOptions) -> anyhow::Result<()> {
    tokio::spawn(async move {
        tracing::info!("Registered shutdown signal handler...");
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = ?err, "Failed to listen for the shutdown signal");
        }
        tracing::info!("Shut down signal received, waiting for tasks...");
        SHOULD_EXIT.store(true, Ordering::Release);
    });

    let config = Config::load(&run_options.config.config).map_err(|err| {
        anyhow!(
            "Failed to load config from file({path}): {:?}",
            err,
            path = run_options.config.config
        )
    })?;

    let metrics_recorder = install_recorder()?;

    let pool = db::connect(
        &run_options.database.database_url,
        config.database_max_connections,
    )
    .await
    .map_err(|err| anyhow!("Failed to connect to database: {:?}", err))?;
    MIGRATOR
        .run(&pool)
        .await
        .map_err(|err| anyhow!("Failed to run migrations: {:?}", err))?;

    let auction_service = AuctionService::new(pool, Arc::new(SystemClock));
    let store = Arc::new(Store {
        auction_service: auction_service.clone(),
        actor_header: config.actor_header.clone(),
        metrics_recorder,
    });

    let task_tracker = TaskTracker::new();
    if config.expiry_worker.enabled {
        let interval = config.expiry_worker.interval;
        task_tracker.spawn(async move {
            if let Err(err) = auction_service.run_expiry_loop(interval).await {
                tracing::error!(error = ?err, "Auction expiry worker failed");
            }
        });
    } else {
        tracing::info!("Auction expiry worker is disabled");
    }
    task_tracker.close();

    tokio::try_join!(
        api::start_api(run_options.clone(), store.clone()),
        start_metrics(run_options.clone(), store.clone()),
    )?;
    task_tracker.wait().await;
    Ok(())
}

// A static exit flag to indicate to running threads that we're shutting down. This is used to
// gracefully shutdown the application.
pub(crate) static SHOULD_EXIT: AtomicBool = AtomicBool::new(false);
pub const EXIT_CHECK_INTERVAL: Duration = Duration::from_secs(1);
