/// Integration tests for usage recording and the seven-day history, with the
/// relational tables and the counters sharing one SQLite file.
use anyhow::Result;
use hashtags::stats::beginning_of_day;
use hashtags::{Database, SqliteCounterStore, TagRegistry, TagService, UsageStats};
use tempfile::tempdir;
use time::macros::{datetime, offset};
use time::{Duration, UtcOffset};

fn open_service(path: &std::path::Path, offset: UtcOffset) -> Result<TagService<SqliteCounterStore>> {
    Ok(TagService::new(
        TagRegistry::new(Database::open(path)?),
        UsageStats::new(SqliteCounterStore::open(path)?, offset),
    ))
}

#[test]
fn history_reflects_recorded_uses_across_reopen() -> Result<()> {
    // Arrange: Record activity on three different days
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("hashtags.db");
    let now = datetime!(2024-03-10 18:30 UTC);
    {
        let service = open_service(&db_path, offset!(UTC))?;
        service.record_use("rustlang", 1, now)?;
        service.record_use("rustlang", 2, now)?;
        service.record_use("rustlang", 2, now - Duration::days(1))?;
        service.record_use("rustlang", 3, now - Duration::days(6))?;
        // Outside the window
        service.record_use("rustlang", 4, now - Duration::days(7))?;

        let (_, stats) = service.into_parts();
        stats.into_store().close()?;
    }

    // Act: Reopen and read the history
    let service = open_service(&db_path, offset!(UTC))?;
    let history = service.history("RustLang", now)?;

    // Assert
    let summary: Vec<(&str, &str)> = history
        .iter()
        .map(|day| (day.uses.as_str(), day.accounts.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("2", "2"),
            ("1", "1"),
            ("0", "0"),
            ("0", "0"),
            ("0", "0"),
            ("0", "0"),
            ("1", "1"),
        ]
    );
    assert_eq!(
        history[0].day,
        beginning_of_day(now, offset!(UTC)).to_string()
    );
    assert_eq!(
        history[6].day,
        beginning_of_day(now - Duration::days(6), offset!(UTC)).to_string()
    );
    assert_eq!(service.lifetime_count("rustlang")?, 5);

    Ok(())
}

#[test]
fn history_json_matches_public_shape() -> Result<()> {
    let temp_dir = tempdir()?;
    let service = open_service(&temp_dir.path().join("hashtags.db"), offset!(UTC))?;
    let now = datetime!(2024-03-10 00:00 UTC);
    service.record_use("art", 1, now)?;

    let json = serde_json::to_value(service.history("art", now)?)?;

    assert_eq!(json.as_array().map(Vec::len), Some(7));
    assert_eq!(
        json[0],
        serde_json::json!({
            "day": now.unix_timestamp().to_string(),
            "uses": "1",
            "accounts": "1",
        })
    );

    Ok(())
}

#[test]
fn distinct_accounts_estimate_stays_close_for_busy_tags() -> Result<()> {
    let stats = UsageStats::new(SqliteCounterStore::in_memory()?, offset!(UTC));
    let registry = TagRegistry::new(Database::in_memory()?);
    let tag = registry.find_or_create("busy")?;
    let now = datetime!(2024-03-10 12:00 UTC);

    for account in 0..5_000 {
        stats.record_use(tag.id(), account, now)?;
    }

    let history = stats.history(tag.id(), now)?;
    let accounts: f64 = history[0].accounts.parse()?;
    assert_eq!(history[0].uses, "5000");
    assert!(
        (accounts - 5_000.0).abs() / 5_000.0 < 0.03,
        "estimate was {accounts}"
    );

    Ok(())
}
