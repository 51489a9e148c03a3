use serde::{Deserialize, Serialize};

use crate::error::{Result, TagError};

/// Usage of a tag during one day.
///
/// All three fields are decimal strings: `day` is the Unix timestamp of the
/// beginning of the day, `uses` the number of times the tag was used and
/// `accounts` the estimated number of distinct accounts that used it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHistory {
    pub day: String,
    pub uses: String,
    pub accounts: String,
}

impl DayHistory {
    /// Returns `uses` as a number.
    ///
    /// # Errors
    ///
    /// Returns [`TagError::DataIntegrity`] if the field is not a number.
    pub fn uses_count(&self) -> Result<u64> {
        parse_field("uses", &self.uses)
    }

    /// Returns `accounts` as a number.
    pub fn accounts_count(&self) -> Result<u64> {
        parse_field("accounts", &self.accounts)
    }
}

fn parse_field(field: &str, value: &str) -> Result<u64> {
    value.parse().map_err(|_| TagError::DataIntegrity {
        key: field.to_string(),
        value: value.to_string(),
    })
}
