use {
    super::Repository,
    crate::{
        api::RestError,
        auction::entities,
    },
};

impl Repository {
    // NOTE: Do not call this function directly. Instead call `submit_bid` from `Service`.
    pub async fn add_bid(&self, bid: entities::Bid) -> Result<entities::Bid, RestError> {
        self.db.add_bid(&bid).await?;
        Ok(bid)
    }
}
