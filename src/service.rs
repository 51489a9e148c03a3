use time::OffsetDateTime;
use tracing::info;

use crate::counter_store::CounterStore;
use crate::error::{Result, TagError};
use crate::grammar::extract_hashtags;
use crate::{DayHistory, Tag, TagRegistry, UsageStats};

/// Name-addressed facade over the registry and the usage statistics.
///
/// Tags are looked up by name, the identifier the rest of the application
/// uses. Ingestion goes through [`TagService::record_use`] and
/// [`TagService::record_text`]; reads through the remaining methods.
///
/// # Examples
///
/// ```
/// use hashtags::{Database, MemoryCounterStore, TagRegistry, TagService, UsageStats};
/// use time::OffsetDateTime;
/// use time::macros::offset;
///
/// # fn main() -> Result<(), hashtags::TagError> {
/// let service = TagService::new(
///     TagRegistry::new(Database::in_memory()?),
///     UsageStats::new(MemoryCounterStore::new(), offset!(UTC)),
/// );
///
/// let now = OffsetDateTime::now_utc();
/// service.record_text("Morning! #Caturday #photography", 7, now)?;
///
/// assert_eq!(service.lifetime_count("caturday")?, 1);
/// assert_eq!(service.history("caturday", now)?[0].uses, "1");
/// # Ok(())
/// # }
/// ```
pub struct TagService<S> {
    registry: TagRegistry,
    stats: UsageStats<S>,
}

impl<S: CounterStore> TagService<S> {
    pub fn new(registry: TagRegistry, stats: UsageStats<S>) -> Self {
        Self { registry, stats }
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    pub fn stats(&self) -> &UsageStats<S> {
        &self.stats
    }

    /// Splits the service back into its parts, e.g. to close the store.
    pub fn into_parts(self) -> (TagRegistry, UsageStats<S>) {
        (self.registry, self.stats)
    }

    /// Returns the tag with this name.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::NotFound`] if no such tag exists.
    pub fn tag(&self, name: &str) -> Result<Tag> {
        self.registry
            .find_by_name(name)?
            .ok_or_else(|| TagError::NotFound(name.to_string()))
    }

    /// Records that `account_id` used the tag at `now`, creating the tag on
    /// first use.
    ///
    /// Bumps the lifetime count, then the day's counters. A failed lifetime
    /// write leaves the counter store untouched; a counter store failure
    /// after it leaves the lifetime count already incremented.
    pub fn record_use(&self, name: &str, account_id: i64, now: OffsetDateTime) -> Result<Tag> {
        let tag = self.registry.find_or_create(name)?;
        let lifetime = self.registry.increment_lifetime(tag.id())?;
        self.stats.record_use(tag.id(), account_id, now)?;

        info!(tag = tag.name(), account_id, lifetime, "recorded tag use");
        Ok(tag)
    }

    /// Records a use of every hashtag found in `text`.
    ///
    /// Each distinct tag counts once per call, however often it appears.
    pub fn record_text(&self, text: &str, account_id: i64, now: OffsetDateTime) -> Result<Vec<Tag>> {
        extract_hashtags(text)
            .iter()
            .map(|name| self.record_use(name, account_id, now))
            .collect()
    }

    /// Returns the last seven days of activity for the named tag.
    pub fn history(&self, name: &str, now: OffsetDateTime) -> Result<Vec<DayHistory>> {
        let tag = self.tag(name)?;
        self.stats.history(tag.id(), now)
    }

    pub fn lifetime_count(&self, name: &str) -> Result<i64> {
        let tag = self.tag(name)?;
        self.registry.lifetime_count(tag.id())
    }

    pub fn search_for(&self, term: &str, limit: usize) -> Result<Vec<Tag>> {
        self.registry.search_for(term, limit)
    }
}
