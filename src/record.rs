//! Booking record input model and lenient CSV deserialization.
//!
//! A record with an unparseable date still deserializes; the bad date becomes
//! `None` and the record classifies as an error stay instead of failing the
//! whole batch.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// A single raw booking row. Only present in incoming batches; never stored.
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRecord {
    pub hotel_id: String,
    #[serde(default, deserialize_with = "lenient_date", alias = "srch_ci")]
    pub check_in: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date", alias = "srch_co")]
    pub check_out: Option<NaiveDate>,
    /// Number of accompanying children. Absent in historical sources.
    #[serde(default, deserialize_with = "lenient_count", alias = "srch_children_cnt")]
    pub num_kids: u32,
}

impl BookingRecord {
    pub fn new(hotel_id: impl Into<String>, check_in: NaiveDate, check_out: NaiveDate) -> Self {
        BookingRecord {
            hotel_id: hotel_id.into(),
            check_in: Some(check_in),
            check_out: Some(check_out),
            num_kids: 0,
        }
    }

    pub fn with_kids(mut self, num_kids: u32) -> Self {
        self.num_kids = num_kids;
        self
    }
}

/// Deserializes a `%Y-%m-%d` date, mapping empty or malformed input to `None`.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()))
}

/// Deserializes a non-negative count, mapping empty or malformed input to 0.
fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.trim().parse().ok()).unwrap_or(0))
}
