pub mod config;
pub mod counter_store;
pub mod db;
pub mod error;
pub mod grammar;
pub mod hll;
pub mod models;
pub mod registry;
pub mod service;
pub mod stats;
pub mod utils;

pub use config::Config;
pub use counter_store::{CounterStore, MemoryCounterStore, SqliteCounterStore};
pub use db::Database;
pub use error::{StoreError, TagError};
pub use models::{DayHistory, StatId, Tag, TagId, TagUsageStat};
pub use registry::{DEFAULT_SEARCH_LIMIT, TagRegistry};
pub use service::TagService;
pub use stats::UsageStats;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_accessible_from_crate_root() {
        let db = Database::in_memory();
        assert!(db.is_ok());
    }

    #[test]
    fn types_accessible_from_crate_root() {
        use time::OffsetDateTime;

        let tag = Tag::new(TagId::new(1), "test", OffsetDateTime::UNIX_EPOCH);
        assert_eq!(tag.name(), "test");

        let stat = TagUsageStat::new_for(tag.id());
        assert_eq!(stat.lifetime_count(), 0);

        let store = MemoryCounterStore::new();
        assert_eq!(store.get("anything").unwrap(), None);
    }
}
