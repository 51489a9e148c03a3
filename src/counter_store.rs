//! Key-value counter store used for per-day tag activity.
//!
//! The store offers two kinds of values: plain integer counters kept as
//! text, and distinct-count estimators. Absent keys read as zero.

mod memory;
mod sqlite;

pub use memory::MemoryCounterStore;
pub use sqlite::SqliteCounterStore;

use crate::TagId;
use crate::error::StoreError;

/// Operations the usage statistics need from a counter store.
///
/// Each operation is atomic on its own; callers add no locking.
pub trait CounterStore {
    /// Reads a counter's raw text value, `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Adds one to a counter, creating it at zero first, and returns the
    /// new value.
    fn incr(&self, key: &str) -> Result<i64, StoreError>;

    /// Adds a member to the estimator at `key`, creating it if needed.
    /// Returns true if the estimate may have changed.
    fn cardinality_add(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    /// Estimates the number of distinct members at `key`, zero when absent.
    fn cardinality_count(&self, key: &str) -> Result<u64, StoreError>;
}

impl<S: CounterStore + ?Sized> CounterStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn incr(&self, key: &str) -> Result<i64, StoreError> {
        (**self).incr(key)
    }

    fn cardinality_add(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        (**self).cardinality_add(key, member)
    }

    fn cardinality_count(&self, key: &str) -> Result<u64, StoreError> {
        (**self).cardinality_count(key)
    }
}

const KEY_PREFIX: &str = "activity:tags";

/// Key of the use counter for a tag on the day starting at `day`.
///
/// # Examples
///
/// ```
/// use hashtags::TagId;
/// use hashtags::counter_store::{accounts_key_for, key_for};
///
/// assert_eq!(key_for(TagId::new(5), 1_700_006_400), "activity:tags:5:1700006400");
/// assert_eq!(
///     accounts_key_for(TagId::new(5), 1_700_006_400),
///     "activity:tags:5:1700006400:accounts"
/// );
/// ```
pub fn key_for(tag_id: TagId, day: i64) -> String {
    format!("{KEY_PREFIX}:{tag_id}:{day}")
}

/// Key of the distinct-account estimator for a tag on the day starting at `day`.
pub fn accounts_key_for(tag_id: TagId, day: i64) -> String {
    format!("{KEY_PREFIX}:{tag_id}:{day}:accounts")
}
