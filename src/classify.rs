//! Stay-length classification.
//!
//! Maps a booking's duration (check-out minus check-in, in whole days) onto a
//! closed set of stay categories.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Stay-length category of a single booking.
///
/// | Duration (days)          | Category |
/// |--------------------------|----------|
/// | <= 0, > 30, or undefined | Error    |
/// | == 1                     | Short    |
/// | 2..=7                    | Standard |
/// | 8..=14                   | Extended |
/// | 15..=30                  | Long     |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StayCategory {
    Error,
    Short,
    Standard,
    Extended,
    Long,
}

impl StayCategory {
    /// The four countable categories, in tie-break priority order.
    /// `Error` is deliberately absent: error stays are never counted.
    pub const COUNTED: [StayCategory; 4] = [
        StayCategory::Short,
        StayCategory::Standard,
        StayCategory::Extended,
        StayCategory::Long,
    ];

    /// Classifies a stay duration in whole days.
    ///
    /// The ranges are mutually exclusive and cover every integer, so the
    /// match order carries no meaning.
    pub fn from_duration(days: i64) -> Self {
        match days {
            1 => StayCategory::Short,
            2..=7 => StayCategory::Standard,
            8..=14 => StayCategory::Extended,
            15..=30 => StayCategory::Long,
            _ => StayCategory::Error,
        }
    }

    /// Column name used in CSV output and JSON state dumps.
    pub fn as_str(&self) -> &'static str {
        match self {
            StayCategory::Error => "err",
            StayCategory::Short => "short",
            StayCategory::Standard => "standard",
            StayCategory::Extended => "extended",
            StayCategory::Long => "long",
        }
    }
}

/// Classifies a booking from its check-in and check-out dates.
///
/// A missing date on either side classifies as [`StayCategory::Error`], as
/// does a check-out on or before the check-in.
pub fn classify(check_in: Option<NaiveDate>, check_out: Option<NaiveDate>) -> StayCategory {
    match (check_in, check_out) {
        (Some(ci), Some(co)) => StayCategory::from_duration((co - ci).num_days()),
        _ => StayCategory::Error,
    }
}
