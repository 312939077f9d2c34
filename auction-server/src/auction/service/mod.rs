use {
    super::repository::{
        Database,
        Repository,
    },
    crate::kernel::clock::Clock,
    std::sync::Arc,
};

pub mod activate_auction;
pub mod cancel_auction;
pub mod create_auction;
pub mod end_expired_auctions;
pub mod get_active_auctions;
pub mod get_auction_status;
pub mod get_auction_summary;
pub mod get_own_bid;
pub mod resolve_winner;
pub mod submit_bid;
pub mod verification;
pub mod workers;

pub struct ServiceInner {
    repo:  Arc<Repository>,
    clock: Arc<dyn Clock>,
}

#[derive(Clone)]
pub struct Service(Arc<ServiceInner>);
impl std::ops::Deref for Service {
    type Target = ServiceInner;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Service {
    pub fn new(db: impl Database, clock: Arc<dyn Clock>) -> Self {
        Self(Arc::new(ServiceInner {
            repo: Arc::new(Repository::new(db)),
            clock,
        }))
    }

    /// The single source of time for every decision the service makes.
    pub fn now(&self) -> time::OffsetDateTime {
        self.clock.now()
    }
}
