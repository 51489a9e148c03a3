//! Per-day tag activity: use counts and distinct-account estimates.

use time::{Duration, OffsetDateTime, Time, UtcOffset};
use tracing::debug;

use crate::counter_store::{CounterStore, accounts_key_for, key_for};
use crate::error::{Result, TagError};
use crate::{DayHistory, TagId};

/// Number of days returned by [`UsageStats::history`].
pub const HISTORY_DAYS: i64 = 7;

/// Returns the Unix timestamp of the start of `now`'s calendar day in the
/// zone given by `offset`.
///
/// # Examples
///
/// ```
/// use hashtags::stats::beginning_of_day;
/// use time::macros::{datetime, offset};
///
/// let now = datetime!(2023-11-15 02:00 UTC);
/// assert_eq!(beginning_of_day(now, offset!(UTC)), datetime!(2023-11-15 0:00 UTC).unix_timestamp());
/// assert_eq!(beginning_of_day(now, offset!(-5)), datetime!(2023-11-14 0:00 -5).unix_timestamp());
/// ```
pub fn beginning_of_day(now: OffsetDateTime, offset: UtcOffset) -> i64 {
    now.to_offset(offset)
        .replace_time(Time::MIDNIGHT)
        .unix_timestamp()
}

/// Reads and records daily tag activity in a counter store.
///
/// The store is handed in at construction and handed back by
/// [`UsageStats::into_store`], so its owner controls when it is closed.
pub struct UsageStats<S> {
    store: S,
    utc_offset: UtcOffset,
}

impl<S: CounterStore> UsageStats<S> {
    /// Creates an aggregator whose days start at midnight in `utc_offset`.
    pub fn new(store: S, utc_offset: UtcOffset) -> Self {
        Self { store, utc_offset }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn utc_offset(&self) -> UtcOffset {
        self.utc_offset
    }

    /// Gives the store back to the caller.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Records one use of a tag by an account during the day of `now`.
    ///
    /// Bumps the day's use counter and adds the account to the day's
    /// distinct-account estimator.
    pub fn record_use(&self, tag_id: TagId, account_id: i64, now: OffsetDateTime) -> Result<()> {
        let day = beginning_of_day(now, self.utc_offset);

        let uses = self.store.incr(&key_for(tag_id, day))?;
        self.store
            .cardinality_add(&accounts_key_for(tag_id, day), &account_id.to_string())?;

        debug!(tag_id = %tag_id, day, uses, account_id, "recorded tag use");
        Ok(())
    }

    /// Returns the last seven days of activity, today first.
    ///
    /// Entry `i` covers the day starting at `beginning_of_day(now - i days)`.
    /// Days without activity read as zero uses and zero accounts.
    ///
    /// # Errors
    ///
    /// * [`TagError::Store`] if the counter store fails; no zero is
    ///   substituted for an unreachable store
    /// * [`TagError::DataIntegrity`] if a stored use count is not a number
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtags::{MemoryCounterStore, TagId, UsageStats};
    /// use time::macros::{datetime, offset};
    ///
    /// # fn main() -> Result<(), hashtags::TagError> {
    /// let stats = UsageStats::new(MemoryCounterStore::new(), offset!(UTC));
    /// let now = datetime!(2023-11-15 12:00 UTC);
    /// stats.record_use(TagId::new(1), 42, now)?;
    ///
    /// let history = stats.history(TagId::new(1), now)?;
    /// assert_eq!(history.len(), 7);
    /// assert_eq!(history[0].uses, "1");
    /// assert_eq!(history[1].uses, "0");
    /// # Ok(())
    /// # }
    /// ```
    pub fn history(&self, tag_id: TagId, now: OffsetDateTime) -> Result<Vec<DayHistory>> {
        let history = (0..HISTORY_DAYS)
            .map(|i| {
                let day = beginning_of_day(now - Duration::days(i), self.utc_offset);
                self.day_history(tag_id, day)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(tag_id = %tag_id, days = history.len(), "read tag history");
        Ok(history)
    }

    fn day_history(&self, tag_id: TagId, day: i64) -> Result<DayHistory> {
        let key = key_for(tag_id, day);
        let uses = match self.store.get(&key)? {
            Some(value) => parse_count(&key, &value)?,
            None => 0,
        };
        let accounts = self
            .store
            .cardinality_count(&accounts_key_for(tag_id, day))?;

        Ok(DayHistory {
            day: day.to_string(),
            uses: uses.to_string(),
            accounts: accounts.to_string(),
        })
    }
}

fn parse_count(key: &str, value: &str) -> Result<i64> {
    value.trim().parse().map_err(|_| TagError::DataIntegrity {
        key: key.to_string(),
        value: value.to_string(),
    })
}
