/// Integration tests for tag creation and prefix search against a
/// file-based SQLite database.
///
/// To run locally:
/// ```bash
/// cargo test --test tag_search_integration
/// ```
use anyhow::Result;
use hashtags::{DEFAULT_SEARCH_LIMIT, Database, TagError, TagRegistry};
use tempfile::tempdir;

fn search_names(registry: &TagRegistry, term: &str, limit: usize) -> Result<Vec<String>> {
    Ok(registry
        .search_for(term, limit)?
        .into_iter()
        .map(|tag| tag.name().to_string())
        .collect())
}

#[test]
fn tags_persist_across_reopen() -> Result<()> {
    // Arrange: Create tags in a file database
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("tags.db");
    let created = {
        let registry = TagRegistry::new(Database::open(&db_path)?);
        registry.find_or_create("Fediverse")?
    };

    // Act: Reopen and resolve the same name in another case
    let registry = TagRegistry::new(Database::open(&db_path)?);
    let resolved = registry.find_or_create("FEDIVERSE")?;

    // Assert: Same tag, original spelling
    assert_eq!(resolved.id(), created.id());
    assert_eq!(resolved.name(), "Fediverse");
    assert_eq!(resolved.to_param(), "Fediverse");

    Ok(())
}

#[test]
fn search_returns_at_most_limit_alphabetical_prefix_matches() -> Result<()> {
    // Arrange: Ten matching tags and a few that only contain the term
    let registry = TagRegistry::new(Database::in_memory()?);
    for name in [
        "abcj", "abci", "abch", "abcg", "abcf", "abce", "abcd", "abcc", "abcb", "abca",
    ] {
        registry.find_or_create(name)?;
    }
    for name in ["xabc", "ab", "a_bc"] {
        registry.find_or_create(name)?;
    }

    // Act
    let names = search_names(&registry, "ABC", DEFAULT_SEARCH_LIMIT)?;

    // Assert
    assert_eq!(names, vec!["abca", "abcb", "abcc", "abcd", "abce"]);

    Ok(())
}

#[test]
fn search_does_not_expand_wildcards_from_input() -> Result<()> {
    let registry = TagRegistry::new(Database::in_memory()?);
    for name in ["a_c", "abc", "a1c"] {
        registry.find_or_create(name)?;
    }

    assert_eq!(search_names(&registry, "a_", 10)?, vec!["a_c"]);
    assert!(search_names(&registry, "a%", 10)?.is_empty());
    assert!(search_names(&registry, "%", 10)?.is_empty());

    Ok(())
}

#[test]
fn invalid_names_are_rejected_and_never_stored() -> Result<()> {
    let registry = TagRegistry::new(Database::in_memory()?);

    for name in ["", "   ", "!!!", "42", "#hash", "a-b"] {
        let result = registry.find_or_create(name);
        assert!(
            matches!(result, Err(TagError::Validation { .. })),
            "{name:?} should be rejected, got {result:?}"
        );
    }

    let count: i64 = registry
        .database()
        .connection()
        .query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))?;
    assert_eq!(count, 0);

    Ok(())
}
