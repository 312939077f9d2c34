use {
    super::Service,
    crate::server::{
        EXIT_CHECK_INTERVAL,
        SHOULD_EXIT,
    },
    std::{
        sync::atomic::Ordering,
        time::Duration,
    },
};

impl Service {
    pub async fn run_expiry_loop(&self, interval: Duration) -> anyhow::Result<()> {
        tracing::info!(interval = ?interval, "Starting auction expiry worker...");
        let mut exit_check_interval = tokio::time::interval(EXIT_CHECK_INTERVAL);
        let mut expiry_interval = tokio::time::interval(interval);

        while !SHOULD_EXIT.load(Ordering::Acquire) {
            tokio::select! {
                _ = expiry_interval.tick() => {
                    self.end_expired_auctions().await;
                }
                _ = exit_check_interval.tick() => {}
            }
        }
        tracing::info!("Shutting down auction expiry worker...");
        Ok(())
    }
}
