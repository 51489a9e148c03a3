/// Complete database schema for the tag registry.
///
/// Uses CREATE TABLE/INDEX IF NOT EXISTS for idempotent execution.
pub const INITIAL_SCHEMA: &str = r#"
-- Tags table: display name plus its case-folded form, which carries the
-- uniqueness constraint
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    normalized_name TEXT NOT NULL UNIQUE,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

-- Lifetime usage counter, at most one row per tag
CREATE TABLE IF NOT EXISTS tag_stats (
    id INTEGER PRIMARY KEY,
    tag_id INTEGER NOT NULL UNIQUE,
    lifetime_count INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
);

-- Junction table: links statuses to tags (many-to-many)
CREATE TABLE IF NOT EXISTS status_tags (
    status_id INTEGER NOT NULL,
    tag_id INTEGER NOT NULL,
    PRIMARY KEY (status_id, tag_id),
    FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
);

-- Junction table: links accounts to tags (many-to-many)
CREATE TABLE IF NOT EXISTS account_tags (
    account_id INTEGER NOT NULL,
    tag_id INTEGER NOT NULL,
    PRIMARY KEY (account_id, tag_id),
    FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_status_tags_tag ON status_tags(tag_id);
CREATE INDEX IF NOT EXISTS idx_account_tags_tag ON account_tags(tag_id);
"#;
