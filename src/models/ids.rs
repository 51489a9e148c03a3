use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a tag.
///
/// Wraps a database ID to provide type safety and prevent accidental
/// mixing of different ID types. The public-facing identifier of a tag
/// is its name, see [`Tag::to_param`](crate::Tag::to_param).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(i64);

impl TagId {
    /// Creates a new tag ID.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying ID value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a tag usage stat row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatId(i64);

impl StatId {
    /// Creates a new stat ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying ID value.
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for StatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_id_serializes_as_raw_integer() {
        let id = TagId::new(99);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "99");

        let deserialized: TagId = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, id);
    }

    #[test]
    fn tag_id_displays_as_raw_integer() {
        assert_eq!(TagId::new(7).to_string(), "7");
        assert_eq!(StatId::new(12).to_string(), "12");
    }

    #[test]
    fn ids_are_not_interchangeable() {
        // These lines would fail to compile:
        // let stat_id: StatId = TagId::new(1);
        // let tag_id: TagId = StatId::new(1);

        let stat_id = StatId::new(1);
        let tag_id = TagId::new(1);

        assert_eq!(stat_id.get(), tag_id.get());
    }
}
