//! Per-batch aggregation: classify records and fold them into per-hotel
//! partial states.

use std::collections::HashMap;

use tracing::debug;

use crate::classify::{StayCategory, classify};
use crate::record::BookingRecord;
use crate::state::{CategoryCounts, HotelState};

/// Aggregates one batch of records into a per-hotel partial state.
///
/// Error-classified records are dropped before counting, so a hotel whose
/// records are all invalid does not appear in the output at all. With
/// `include_kids` set, the children counts of the hotel's valid records are
/// summed and `with_kids` reflects whether the sum is positive.
///
/// The returned partials carry a computed `most_popular`, so they are usable
/// standalone (one-shot reporting) or as input to [`HotelState::merge`].
pub fn aggregate_batch(
    records: &[BookingRecord],
    include_kids: bool,
) -> HashMap<String, HotelState> {
    let mut counts: HashMap<String, CategoryCounts> = HashMap::new();
    let mut kids: HashMap<String, u64> = HashMap::new();
    let mut errors = 0usize;

    for record in records {
        let category = classify(record.check_in, record.check_out);
        if category == StayCategory::Error {
            errors += 1;
            continue;
        }

        counts.entry(record.hotel_id.clone()).or_default().bump(category);
        if include_kids {
            *kids.entry(record.hotel_id.clone()).or_default() += record.num_kids as u64;
        }
    }

    debug!(
        records = records.len(),
        hotels = counts.len(),
        errors,
        include_kids,
        "Batch aggregated"
    );

    counts
        .into_iter()
        .map(|(hotel_id, counts)| {
            let with_kids = kids.get(&hotel_id).copied().unwrap_or(0) > 0;
            (hotel_id, HotelState::from_counts(counts, with_kids))
        })
        .collect()
}
