//! Runtime configuration read from the environment.
//!
//! | Variable                | Default                              |
//! |-------------------------|--------------------------------------|
//! | `HASHTAGS_DB`           | `{data_dir}/hashtags/hashtags.db`    |
//! | `HASHTAGS_COUNTER_DB`   | same file as `HASHTAGS_DB`           |
//! | `HASHTAGS_UTC_OFFSET`   | `UTC` (otherwise `+HH:MM`/`-HH:MM`)  |
//! | `HASHTAGS_SEARCH_LIMIT` | `5`                                  |

use std::path::PathBuf;

use thiserror::Error;
use time::UtcOffset;
use time::macros::format_description;

use crate::registry::DEFAULT_SEARCH_LIMIT;
use crate::utils::default_database_path;

pub const DATABASE_VAR: &str = "HASHTAGS_DB";
pub const COUNTER_DATABASE_VAR: &str = "HASHTAGS_COUNTER_DB";
pub const UTC_OFFSET_VAR: &str = "HASHTAGS_UTC_OFFSET";
pub const SEARCH_LIMIT_VAR: &str = "HASHTAGS_SEARCH_LIMIT";

/// Errors for configuration values that cannot be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to determine data directory; set HASHTAGS_DB")]
    NoDataDir,

    #[error("Invalid HASHTAGS_UTC_OFFSET {0:?}: expected UTC or +HH:MM")]
    InvalidOffset(String),

    #[error("Invalid HASHTAGS_SEARCH_LIMIT {0:?}: expected a positive integer")]
    InvalidSearchLimit(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
    pub counter_store_path: PathBuf,
    /// Offset of the server's zone; days start at midnight there.
    pub utc_offset: UtcOffset,
    pub search_limit: usize,
}

impl Config {
    /// Reads the configuration from process environment variables.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let database_path = match var(DATABASE_VAR) {
            Some(path) => PathBuf::from(path),
            None => default_database_path().ok_or(ConfigError::NoDataDir)?,
        };
        let counter_store_path = var(COUNTER_DATABASE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| database_path.clone());
        let utc_offset = match var(UTC_OFFSET_VAR) {
            Some(value) => parse_utc_offset(&value)?,
            None => UtcOffset::UTC,
        };
        let search_limit = match var(SEARCH_LIMIT_VAR) {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => return Err(ConfigError::InvalidSearchLimit(value)),
            },
            None => DEFAULT_SEARCH_LIMIT,
        };

        Ok(Self {
            database_path,
            counter_store_path,
            utc_offset,
            search_limit,
        })
    }
}

/// Parses `UTC`, `Z` or a signed `HH:MM` offset.
///
/// # Examples
///
/// ```
/// use hashtags::config::parse_utc_offset;
/// use time::UtcOffset;
///
/// assert_eq!(parse_utc_offset("UTC").unwrap(), UtcOffset::UTC);
/// assert_eq!(parse_utc_offset("+09:30").unwrap().whole_minutes(), 570);
/// assert!(parse_utc_offset("9").is_err());
/// ```
pub fn parse_utc_offset(value: &str) -> Result<UtcOffset, ConfigError> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("utc") || trimmed.eq_ignore_ascii_case("z") {
        return Ok(UtcOffset::UTC);
    }

    UtcOffset::parse(
        trimmed,
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .map_err(|_| ConfigError::InvalidOffset(value.to_string()))
}
