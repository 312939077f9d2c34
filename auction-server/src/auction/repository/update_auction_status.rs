use {
    super::Repository,
    crate::auction::entities,
    time::OffsetDateTime,
};

impl Repository {
    /// Returns true if the status was updated. False means the auction was concurrently moved to
    /// another status or is past the point where this transition is allowed.
    pub async fn update_auction_status(
        &self,
        auction_id: entities::AuctionId,
        new_status: entities::AuctionStatus,
        now: OffsetDateTime,
    ) -> anyhow::Result<bool> {
        self.db
            .update_auction_status(auction_id, new_status, now)
            .await
    }
}
