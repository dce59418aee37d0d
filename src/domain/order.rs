//! Order identity: kinds, daily date stamps, and tracking codes.
//!
//! All order-facing timestamps use the desk's fixed +03:30 offset so daily
//! counter resets and tracking codes follow the local business day
//! regardless of the host timezone.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Which side of the desk an order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    Buy,
    Sell,
}

impl OrderKind {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderKind::Buy => "buy",
            OrderKind::Sell => "sell",
        }
    }
}

impl std::fmt::Display for OrderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn desk_offset() -> FixedOffset {
    FixedOffset::east_opt(3 * 3600 + 30 * 60).expect("offset is in range")
}

/// Current time in the desk's local offset.
pub fn now_local() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&desk_offset())
}

/// Today's date stamp (`YYYYMMDD`) in the desk's local offset.
///
/// The ledger compares this against the persisted counter date to decide
/// when to reset the daily order counters.
pub fn today_stamp() -> String {
    now_local().format("%Y%m%d").to_string()
}

/// Human-shown order identifier: local date, local time, and user id.
pub fn tracking_code(user_id: UserId) -> String {
    format!("{}-{}", now_local().format("%Y%m%d%H%M%S"), user_id)
}
