use std::collections::HashMap;

use parking_lot::Mutex;

use super::CounterStore;
use crate::error::StoreError;
use crate::hll::HyperLogLog;

/// Process-local counter store.
///
/// Nothing survives the process; useful for tests and single-node setups.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    counters: Mutex<HashMap<String, String>>,
    sketches: Mutex<HashMap<String, HyperLogLog>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites a counter's raw value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.counters.lock().insert(key.into(), value.into());
    }
}

impl CounterStore for MemoryCounterStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.counters.lock().get(key).cloned())
    }

    fn incr(&self, key: &str) -> Result<i64, StoreError> {
        let mut counters = self.counters.lock();
        let current = match counters.get(key) {
            Some(value) => value.parse::<i64>().map_err(|_| StoreError::NotAnInteger {
                key: key.to_string(),
            })?,
            None => 0,
        };

        let next = current.checked_add(1).ok_or_else(|| StoreError::Overflow {
            key: key.to_string(),
        })?;
        counters.insert(key.to_string(), next.to_string());
        Ok(next)
    }

    fn cardinality_add(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        Ok(self
            .sketches
            .lock()
            .entry(key.to_string())
            .or_default()
            .insert(member))
    }

    fn cardinality_count(&self, key: &str) -> Result<u64, StoreError> {
        Ok(self
            .sketches
            .lock()
            .get(key)
            .map_or(0, HyperLogLog::count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_keys_read_as_none_and_zero() {
        let store = MemoryCounterStore::new();

        assert_eq!(store.get("missing").unwrap(), None);
        assert_eq!(store.cardinality_count("missing").unwrap(), 0);
    }

    #[test]
    fn incr_starts_at_one_and_stores_text() {
        let store = MemoryCounterStore::new();

        assert_eq!(store.incr("k").unwrap(), 1);
        assert_eq!(store.incr("k").unwrap(), 2);
        assert_eq!(store.get("k").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn incr_rejects_non_numeric_value() {
        let store = MemoryCounterStore::new();
        store.set("k", "abc");

        assert!(matches!(
            store.incr("k"),
            Err(StoreError::NotAnInteger { .. })
        ));
    }

    #[test]
    fn incr_at_maximum_is_an_overflow_error() {
        let store = MemoryCounterStore::new();
        store.set("k", i64::MAX.to_string());

        assert!(matches!(store.incr("k"), Err(StoreError::Overflow { .. })));
        assert_eq!(store.get("k").unwrap(), Some(i64::MAX.to_string()));
    }

    #[test]
    fn cardinality_counts_distinct_members() {
        let store = MemoryCounterStore::new();

        assert!(store.cardinality_add("k", "1").unwrap());
        assert!(!store.cardinality_add("k", "1").unwrap());
        store.cardinality_add("k", "2").unwrap();

        assert_eq!(store.cardinality_count("k").unwrap(), 2);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let store = MemoryCounterStore::new();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        store.incr("k").unwrap();
                    }
                });
            }
        });

        assert_eq!(store.get("k").unwrap().as_deref(), Some("800"));
    }
}
