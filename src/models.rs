mod day_history;
mod ids;
mod tag;
mod tag_usage_stat;

pub use day_history::DayHistory;
pub use ids::{StatId, TagId};
pub use tag::Tag;
pub use tag_usage_stat::TagUsageStat;
