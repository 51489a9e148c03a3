use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::TagId;

/// A hashtag known to the registry.
///
/// Names are unique under case-insensitive comparison. The stored `name`
/// keeps the casing of the first encounter and is the identifier used in
/// URLs, see [`Tag::to_param`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    id: TagId,
    name: String,
    #[serde(with = "time::serde::timestamp")]
    created_at: OffsetDateTime,
    #[serde(with = "time::serde::timestamp")]
    updated_at: OffsetDateTime,
}

impl Tag {
    /// Creates a tag whose timestamps are both `created_at`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtags::{Tag, TagId};
    /// use time::OffsetDateTime;
    ///
    /// let tag = Tag::new(TagId::new(1), "rust", OffsetDateTime::UNIX_EPOCH);
    /// assert_eq!(tag.id(), TagId::new(1));
    /// assert_eq!(tag.name(), "rust");
    /// assert_eq!(tag.to_param(), "rust");
    /// ```
    pub fn new(id: TagId, name: impl Into<String>, created_at: OffsetDateTime) -> Self {
        Self {
            id,
            name: name.into(),
            created_at,
            updated_at: created_at,
        }
    }

    /// Rebuilds a tag from a persisted row.
    pub(crate) fn from_row(
        id: TagId,
        name: String,
        created_at: OffsetDateTime,
        updated_at: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            name,
            created_at,
            updated_at,
        }
    }

    /// Returns the tag's internal identifier.
    pub fn id(&self) -> TagId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the external identifier of the tag, which is its name.
    pub fn to_param(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_sets_both_timestamps() {
        let created = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let tag = Tag::new(TagId::new(3), "Caturday", created);

        assert_eq!(tag.created_at(), created);
        assert_eq!(tag.updated_at(), created);
    }

    #[test]
    fn to_param_is_name_not_id() {
        let tag = Tag::new(TagId::new(42), "MastoArt", OffsetDateTime::UNIX_EPOCH);

        assert_eq!(tag.to_param(), "MastoArt");
        assert_ne!(tag.to_param(), "42");
    }

    #[test]
    fn serializes_timestamps_as_unix_seconds() {
        let created = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let tag = Tag::new(TagId::new(1), "rust", created);

        let json = serde_json::to_value(&tag).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["name"], "rust");
        assert_eq!(json["created_at"], 1_700_000_000);
    }
}
