use {
    super::{
        Repository,
        AUCTION_PAGE_SIZE_CAP,
    },
    crate::{
        api::RestError,
        auction::entities,
    },
    time::OffsetDateTime,
};

impl Repository {
    /// Returns a page of at most `AUCTION_PAGE_SIZE_CAP` active auctions.
    /// The page carries a cursor to the next one when it is full.
    pub async fn get_active_auctions(
        &self,
        now: OffsetDateTime,
        after: Option<entities::AuctionCursor>,
    ) -> Result<entities::ActiveAuctions, RestError> {
        let auctions = self
            .db
            .get_active_auctions(now, after, AUCTION_PAGE_SIZE_CAP)
            .await?;
        let next = match auctions.last() {
            Some(last) if auctions.len() == AUCTION_PAGE_SIZE_CAP => Some(last.into()),
            _ => None,
        };
        Ok(entities::ActiveAuctions { auctions, next })
    }
}
