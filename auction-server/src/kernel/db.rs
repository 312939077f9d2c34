use {
    sqlx::{
        migrate::Migrator,
        postgres::PgPoolOptions,
        Pool,
        Postgres,
    },
    std::time::Duration,
    time::{
        OffsetDateTime,
        PrimitiveDateTime,
        UtcOffset,
    },
};

pub type DB = Pool<Postgres>;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const DB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<DB> {
    let db = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(DB_ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await?;
    Ok(db)
}

// Timestamps are stored as `timestamp` columns in UTC.
pub fn to_primitive(time: OffsetDateTime) -> PrimitiveDateTime {
    let time = time.to_offset(UtcOffset::UTC);
    PrimitiveDateTime::new(time.date(), time.time())
}

pub fn from_primitive(time: PrimitiveDateTime) -> OffsetDateTime {
    time.assume_offset(UtcOffset::UTC)
}
