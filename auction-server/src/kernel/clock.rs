use {
    std::fmt::Debug,
    time::OffsetDateTime,
};

/// Whether an auction closing at `end_time` is over at `now`.
///
/// This is the only place where the end of an auction is decided. Status reads, bid admission and
/// winner resolution all go through it.
pub fn has_ended(end_time: OffsetDateTime, now: OffsetDateTime) -> bool {
    end_time <= now
}

pub trait Clock: Debug + Send + Sync + 'static {
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock truncated to microseconds, which is the precision of the database timestamps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        let now = OffsetDateTime::now_utc();
        now.replace_nanosecond(now.microsecond() * 1_000)
            .unwrap_or(now)
    }
}

#[cfg(test)]
pub use manual_clock::ManualClock;
