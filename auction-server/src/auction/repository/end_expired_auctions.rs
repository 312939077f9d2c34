use {
    super::Repository,
    crate::auction::entities,
    time::OffsetDateTime,
};

impl Repository {
    pub async fn end_expired_auctions(
        &self,
        now: OffsetDateTime,
    ) -> anyhow::Result<Vec<entities::AuctionId>> {
        self.db.end_expired_auctions(now).await
    }
}
