use super::{StatId, TagId};

/// Lifetime usage counter owned by a single tag.
///
/// A stat is built lazily: [`TagUsageStat::new_for`] returns an unsaved,
/// zero-valued record that is only written once something about it changed.
/// The `changed` flag is checked before any persistence call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagUsageStat {
    id: Option<StatId>,
    tag_id: TagId,
    lifetime_count: i64,
    changed: bool,
}

impl TagUsageStat {
    /// Builds an unsaved stat with a zero lifetime count.
    ///
    /// A freshly built stat is not considered changed, so saving it
    /// straight away performs no write.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtags::{TagId, TagUsageStat};
    ///
    /// let stat = TagUsageStat::new_for(TagId::new(1));
    /// assert_eq!(stat.lifetime_count(), 0);
    /// assert!(!stat.is_persisted());
    /// assert!(!stat.is_changed());
    /// ```
    pub fn new_for(tag_id: TagId) -> Self {
        Self {
            id: None,
            tag_id,
            lifetime_count: 0,
            changed: false,
        }
    }

    /// Rebuilds a stat from a persisted row.
    pub(crate) fn from_row(id: StatId, tag_id: TagId, lifetime_count: i64) -> Self {
        Self {
            id: Some(id),
            tag_id,
            lifetime_count,
            changed: false,
        }
    }

    pub fn id(&self) -> Option<StatId> {
        self.id
    }

    pub fn tag_id(&self) -> TagId {
        self.tag_id
    }

    pub fn lifetime_count(&self) -> i64 {
        self.lifetime_count
    }

    /// Returns true once the stat has a database row.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Returns true if the in-memory value differs from what was loaded.
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Overwrites the lifetime count.
    ///
    /// Setting the value it already holds leaves the stat unchanged.
    pub fn set_lifetime_count(&mut self, count: i64) {
        if self.lifetime_count != count {
            self.lifetime_count = count;
            self.changed = true;
        }
    }

    pub(crate) fn mark_saved(&mut self, id: StatId) {
        self.id = Some(id);
        self.changed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_same_value_is_not_a_change() {
        let mut stat = TagUsageStat::from_row(StatId::new(1), TagId::new(1), 5);
        stat.set_lifetime_count(5);

        assert!(!stat.is_changed());
    }

    #[test]
    fn setting_new_value_marks_changed() {
        let mut stat = TagUsageStat::new_for(TagId::new(1));
        stat.set_lifetime_count(3);

        assert!(stat.is_changed());
        assert_eq!(stat.lifetime_count(), 3);
    }

    #[test]
    fn mark_saved_clears_changed_and_assigns_id() {
        let mut stat = TagUsageStat::new_for(TagId::new(9));
        stat.set_lifetime_count(1);
        stat.mark_saved(StatId::new(4));

        assert!(!stat.is_changed());
        assert_eq!(stat.id(), Some(StatId::new(4)));
        assert!(stat.is_persisted());
    }
}
