use rusqlite::{OptionalExtension, ffi};
use time::OffsetDateTime;
use tracing::{debug, info};

use crate::error::{Result, TagError};
use crate::grammar::{escape_like, normalize_name, validate_name};
use crate::{Database, StatId, Tag, TagId, TagUsageStat};

/// Number of results returned by [`TagRegistry::search_for`] when the caller
/// has no preference.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Owns canonical tag identity and the per-tag lifetime counters.
///
/// Uniqueness is enforced by the database on the case-folded name, so
/// concurrent registries sharing a database file cannot create duplicates.
///
/// # Examples
///
/// ```
/// use hashtags::{Database, TagRegistry};
///
/// # fn main() -> Result<(), hashtags::TagError> {
/// let registry = TagRegistry::new(Database::in_memory()?);
///
/// let tag = registry.find_or_create("Rust")?;
/// let again = registry.find_or_create("rust")?;
/// assert_eq!(tag.id(), again.id());
/// # Ok(())
/// # }
/// ```
pub struct TagRegistry {
    db: Database,
}

impl TagRegistry {
    /// Creates a registry over the given database, taking ownership of it.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Returns a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Inserts a new tag.
    ///
    /// # Errors
    ///
    /// * [`TagError::Validation`] if the name does not match the grammar
    /// * [`TagError::Conflict`] if a tag with the same name (ignoring case)
    ///   already exists
    pub fn create(&self, name: &str) -> Result<Tag> {
        validate_name(name)?;

        let conn = self.db.connection();
        let now = OffsetDateTime::now_utc();
        let timestamp = now.unix_timestamp();

        let inserted = conn.execute(
            "INSERT INTO tags (name, normalized_name, created_at, updated_at) VALUES (?1, ?2, ?3, ?3)",
            (name, normalize_name(name), timestamp),
        );

        match inserted {
            Ok(_) => {
                let id = TagId::new(conn.last_insert_rowid());
                info!(tag_id = %id, tag = name, "created tag");
                Ok(Tag::new(id, name, OffsetDateTime::from_unix_timestamp(timestamp)?))
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(TagError::Conflict {
                    name: name.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns the tag with this name, creating it if needed.
    ///
    /// The lookup before inserting only saves a round trip; a concurrent
    /// insert of the same name is caught through the unique constraint and
    /// resolved to the row that won.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::Validation`] for malformed names. Conflicts are
    /// never surfaced.
    pub fn find_or_create(&self, name: &str) -> Result<Tag> {
        validate_name(name)?;

        if let Some(tag) = self.find_by_name(name)? {
            return Ok(tag);
        }

        self.insert_or_fetch(name)
    }

    /// Inserts the tag, resolving a unique violation to the existing row.
    fn insert_or_fetch(&self, name: &str) -> Result<Tag> {
        match self.create(name) {
            Err(TagError::Conflict { .. }) => {
                debug!(tag = name, "tag created concurrently, fetching existing row");
                self.find_by_name(name)?
                    .ok_or_else(|| TagError::NotFound(name.to_string()))
            }
            other => other,
        }
    }

    /// Resolves several names at once, skipping case-insensitive duplicates.
    ///
    /// Fails on the first invalid name without creating the remaining ones.
    pub fn find_or_create_all<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Tag>> {
        let mut seen = std::collections::HashSet::new();
        let mut tags = Vec::new();

        for name in names {
            let name = name.as_ref();
            if !seen.insert(normalize_name(name)) {
                continue;
            }
            tags.push(self.find_or_create(name)?);
        }

        Ok(tags)
    }

    /// Looks up a tag by name, ignoring case.
    ///
    /// Returns `None` if no such tag exists. This is not considered an error.
    pub fn find_by_name(&self, name: &str) -> Result<Option<Tag>> {
        let row = self
            .db
            .connection()
            .query_row(
                "SELECT id, name, created_at, updated_at FROM tags WHERE normalized_name = ?1",
                [normalize_name(name)],
                tag_columns,
            )
            .optional()?;

        row.map(tag_from_columns).transpose()
    }

    /// Looks up a tag by its internal id.
    pub fn find_by_id(&self, id: TagId) -> Result<Option<Tag>> {
        let row = self
            .db
            .connection()
            .query_row(
                "SELECT id, name, created_at, updated_at FROM tags WHERE id = ?1",
                [id.get()],
                tag_columns,
            )
            .optional()?;

        row.map(tag_from_columns).transpose()
    }

    /// Finds tags whose name starts with `term`, ignoring case.
    ///
    /// The term is trimmed and matched literally: `%`, `_` and `\` have no
    /// wildcard meaning. Results are ordered alphabetically (ignoring case)
    /// and truncated to `limit`. A term that is empty after trimming
    /// matches nothing.
    ///
    /// # Examples
    ///
    /// ```
    /// use hashtags::{Database, TagRegistry, DEFAULT_SEARCH_LIMIT};
    ///
    /// # fn main() -> Result<(), hashtags::TagError> {
    /// let registry = TagRegistry::new(Database::in_memory()?);
    /// registry.find_or_create("rustlang")?;
    /// registry.find_or_create("Rust")?;
    /// registry.find_or_create("python")?;
    ///
    /// let names: Vec<String> = registry
    ///     .search_for(" RUS ", DEFAULT_SEARCH_LIMIT)?
    ///     .into_iter()
    ///     .map(|tag| tag.name().to_string())
    ///     .collect();
    /// assert_eq!(names, vec!["Rust", "rustlang"]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn search_for(&self, term: &str, limit: usize) -> Result<Vec<Tag>> {
        let term = term.trim();
        if term.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let pattern = format!("{}%", escape_like(&normalize_name(term)));
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let mut stmt = self.db.connection().prepare(
            r"SELECT id, name, created_at, updated_at FROM tags
              WHERE normalized_name LIKE ?1 ESCAPE '\'
              ORDER BY normalized_name, name
              LIMIT ?2",
        )?;
        let rows = stmt.query_map((pattern, limit), tag_columns)?;

        let mut tags = Vec::new();
        for row in rows {
            tags.push(tag_from_columns(row?)?);
        }

        debug!(term, results = tags.len(), "searched tags");
        Ok(tags)
    }

    /// Deletes a tag together with its stat row and associations.
    ///
    /// Returns `false` if the tag did not exist.
    pub fn destroy(&self, id: TagId) -> Result<bool> {
        let deleted = self
            .db
            .connection()
            .execute("DELETE FROM tags WHERE id = ?1", [id.get()])?;

        if deleted > 0 {
            info!(tag_id = %id, "destroyed tag");
        }
        Ok(deleted > 0)
    }

    /// Returns the stat for a tag, building an unsaved zero-valued one if the
    /// tag has none yet.
    ///
    /// Nothing is written here; see [`TagRegistry::save_stat`].
    pub fn get_or_create_stat(&self, tag_id: TagId) -> Result<TagUsageStat> {
        let existing = self
            .db
            .connection()
            .query_row(
                "SELECT id, lifetime_count FROM tag_stats WHERE tag_id = ?1",
                [tag_id.get()],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        Ok(match existing {
            Some((id, count)) => TagUsageStat::from_row(StatId::new(id), tag_id, count),
            None => TagUsageStat::new_for(tag_id),
        })
    }

    /// Persists a stat if it changed since it was loaded.
    ///
    /// Returns whether a write happened. Unchanged stats, including freshly
    /// built ones, cost no write at all.
    pub fn save_stat(&self, stat: &mut TagUsageStat) -> Result<bool> {
        if !stat.is_changed() {
            return Ok(false);
        }

        let now = OffsetDateTime::now_utc().unix_timestamp();
        let id: i64 = self
            .db
            .connection()
            .query_row(
                "INSERT INTO tag_stats (tag_id, lifetime_count, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?3)
                 ON CONFLICT(tag_id) DO UPDATE SET
                     lifetime_count = excluded.lifetime_count,
                     updated_at = excluded.updated_at
                 RETURNING id",
                (stat.tag_id().get(), stat.lifetime_count(), now),
                |row| row.get(0),
            )
            .map_err(|e| missing_tag(e, stat.tag_id()))?;

        stat.mark_saved(StatId::new(id));
        debug!(tag_id = %stat.tag_id(), lifetime_count = stat.lifetime_count(), "saved tag stat");
        Ok(true)
    }

    /// Atomically adds one to the tag's lifetime count and returns the new
    /// value, creating the stat row when needed.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::NotFound`] if the tag does not exist.
    pub fn increment_lifetime(&self, tag_id: TagId) -> Result<i64> {
        self.adjust_lifetime(
            tag_id,
            "INSERT INTO tag_stats (tag_id, lifetime_count, created_at, updated_at)
             VALUES (?1, 1, ?2, ?2)
             ON CONFLICT(tag_id) DO UPDATE SET
                 lifetime_count = lifetime_count + 1,
                 updated_at = excluded.updated_at
             RETURNING lifetime_count",
        )
    }

    /// Atomically subtracts one from the tag's lifetime count, never going
    /// below zero, and returns the new value.
    pub fn decrement_lifetime(&self, tag_id: TagId) -> Result<i64> {
        self.adjust_lifetime(
            tag_id,
            "INSERT INTO tag_stats (tag_id, lifetime_count, created_at, updated_at)
             VALUES (?1, 0, ?2, ?2)
             ON CONFLICT(tag_id) DO UPDATE SET
                 lifetime_count = MAX(lifetime_count - 1, 0),
                 updated_at = excluded.updated_at
             RETURNING lifetime_count",
        )
    }

    /// Returns the tag's lifetime count, zero if it has no stat yet.
    pub fn lifetime_count(&self, tag_id: TagId) -> Result<i64> {
        Ok(self.get_or_create_stat(tag_id)?.lifetime_count())
    }

    fn adjust_lifetime(&self, tag_id: TagId, sql: &str) -> Result<i64> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let count: i64 = self
            .db
            .connection()
            .query_row(sql, (tag_id.get(), now), |row| row.get(0))
            .map_err(|e| missing_tag(e, tag_id))?;

        debug!(tag_id = %tag_id, lifetime_count = count, "adjusted lifetime count");
        Ok(count)
    }
}

type TagColumns = (i64, String, i64, i64);

fn tag_columns(row: &rusqlite::Row<'_>) -> rusqlite::Result<TagColumns> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn tag_from_columns((id, name, created_at, updated_at): TagColumns) -> Result<Tag> {
    Ok(Tag::from_row(
        TagId::new(id),
        name,
        OffsetDateTime::from_unix_timestamp(created_at)?,
        OffsetDateTime::from_unix_timestamp(updated_at)?,
    ))
}

/// Maps a foreign key failure on `tag_stats` to a missing tag.
fn missing_tag(err: rusqlite::Error, tag_id: TagId) -> TagError {
    match err {
        rusqlite::Error::SqliteFailure(ref failure, _)
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            TagError::NotFound(tag_id.to_string())
        }
        other => other.into(),
    }
}
