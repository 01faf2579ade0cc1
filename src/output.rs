//! Output formatting and persistence for the per-hotel state table.
//!
//! Supports CSV export of the final state or an intermediate count table,
//! and a pretty-printed JSON dump.

use std::collections::HashMap;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::state::HotelState;
use crate::store::StateStore;

/// One output row of the state table.
#[derive(Debug, Serialize)]
struct StateRow<'a> {
    hotel_id: &'a str,
    short: u64,
    standard: u64,
    extended: u64,
    long: u64,
    /// Empty when every count is zero (no popular category).
    most_popular: Option<&'static str>,
    with_kids: bool,
}

impl<'a> StateRow<'a> {
    fn new(hotel_id: &'a str, state: &HotelState) -> Self {
        StateRow {
            hotel_id,
            short: state.counts.short,
            standard: state.counts.standard,
            extended: state.counts.extended,
            long: state.counts.long,
            most_popular: state.most_popular.map(|c| c.as_str()),
            with_kids: state.with_kids,
        }
    }
}

/// Writes the final state table to a CSV file, one row per hotel.
///
/// Rows are sorted by hotel id so reruns produce identical files.
pub fn write_state_csv(path: &str, store: &StateStore) -> Result<()> {
    write_table(path, store.states())?;
    info!(path, hotels = store.len(), "State table written");
    Ok(())
}

/// Writes a per-hotel count table straight from the aggregator, for one-shot
/// reporting without going through a store.
pub fn write_counts_csv(path: &str, partials: &HashMap<String, HotelState>) -> Result<()> {
    write_table(path, partials)?;
    info!(path, hotels = partials.len(), "Count table written");
    Ok(())
}

fn write_table(path: &str, states: &HashMap<String, HotelState>) -> Result<()> {
    debug!(path, rows = states.len(), "Writing CSV table");

    let mut hotel_ids: Vec<&String> = states.keys().collect();
    hotel_ids.sort();

    let mut writer = csv::Writer::from_path(path)?;
    for hotel_id in hotel_ids {
        writer.serialize(StateRow::new(hotel_id, &states[hotel_id]))?;
    }
    writer.flush()?;

    Ok(())
}

/// Logs the full state table as pretty-printed JSON.
pub fn print_json(store: &StateStore) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(store.states())?);
    Ok(())
}
