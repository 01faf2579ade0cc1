//! The state store and the update loop that feeds it.
//!
//! The store is a plain owned value with a single writer: the historical
//! bootstrap builds it once, then the streaming loop folds in one batch at a
//! time. All mutation goes through [`HotelState::merge`], so the result does
//! not depend on batch boundaries or merge order.

use std::collections::HashMap;

use anyhow::Result;
use tracing::{error, info};

use crate::aggregate::aggregate_batch;
use crate::record::BookingRecord;
use crate::source::BatchSource;
use crate::state::HotelState;

/// Running per-hotel state for the lifetime of the process.
///
/// Entries are created on first sight of a hotel and never deleted.
#[derive(Debug, Default)]
pub struct StateStore {
    states: HashMap<String, HotelState>,
}

impl StateStore {
    pub fn new() -> Self {
        StateStore::default()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn get(&self, hotel_id: &str) -> Option<&HotelState> {
        self.states.get(hotel_id)
    }

    pub fn states(&self) -> &HashMap<String, HotelState> {
        &self.states
    }

    /// A point-in-time copy, for readers that must never observe a
    /// half-merged state.
    pub fn snapshot(&self) -> HashMap<String, HotelState> {
        self.states.clone()
    }

    /// Builds the store from the historical batch.
    ///
    /// The records are split into chunks aggregated on parallel tasks, and
    /// the chunk partials are folded in through the merge algebra. The
    /// historical source carries no children field, so `with_kids` starts
    /// out false everywhere.
    #[tracing::instrument(skip(self, records), fields(records = records.len(), chunk_size))]
    pub async fn bootstrap(&mut self, records: Vec<BookingRecord>, chunk_size: usize) -> Result<()> {
        let chunk_size = chunk_size.max(1);
        let chunks: Vec<Vec<BookingRecord>> =
            records.chunks(chunk_size).map(|c| c.to_vec()).collect();

        let mut tasks = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            tasks.push(tokio::spawn(async move { aggregate_batch(&chunk, false) }));
        }

        for task in tasks {
            let partials = task.await?;
            self.merge_partials(partials);
        }

        info!(hotels = self.states.len(), "Historical bootstrap complete");
        Ok(())
    }

    /// Folds one incremental batch into the store.
    ///
    /// Incremental batches are expected to carry the children field, so kids
    /// aggregation is always on here.
    pub fn apply_batch(&mut self, records: &[BookingRecord]) {
        let partials = aggregate_batch(records, true);
        self.merge_partials(partials);
    }

    fn merge_partials(&mut self, partials: HashMap<String, HotelState>) {
        for (hotel_id, partial) in partials {
            self.states
                .entry(hotel_id)
                .or_default()
                .merge_in(&partial);
        }
    }

    /// Pulls batches from `source` until it reports caught-up, merging each
    /// into the store strictly in arrival order.
    ///
    /// A batch that fails to read is logged and skipped; it never stops the
    /// loop or poisons the store.
    #[tracing::instrument(skip(self, source))]
    pub async fn run_stream<S: BatchSource>(&mut self, source: &mut S) -> Result<()> {
        let mut batch_no = 0usize;
        loop {
            match source.next_batch().await {
                Ok(Some(records)) => {
                    batch_no += 1;
                    self.apply_batch(&records);
                    info!(
                        batch = batch_no,
                        records = records.len(),
                        hotels = self.states.len(),
                        "Batch merged"
                    );
                }
                Ok(None) => {
                    info!(batches = batch_no, "Source caught up");
                    return Ok(());
                }
                Err(e) => {
                    error!(error = %e, "Failed to read batch, skipping");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::StayCategory;
    use crate::source::ReplaySource;
    use chrono::NaiveDate;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2016, 1, 1).unwrap() + chrono::Days::new(n as u64)
    }

    fn stay(hotel: &str, nights: u32) -> BookingRecord {
        BookingRecord::new(hotel, day(0), day(nights))
    }

    #[tokio::test]
    async fn test_bootstrap_matches_single_fold_regardless_of_chunking() {
        let records: Vec<BookingRecord> = (0u32..50)
            .map(|i| stay(if i % 3 == 0 { "1" } else { "2" }, 1 + (i % 20)))
            .collect();

        let mut whole = StateStore::new();
        whole.bootstrap(records.clone(), records.len()).await.unwrap();

        let mut chunked = StateStore::new();
        chunked.bootstrap(records, 7).await.unwrap();

        assert_eq!(whole.states(), chunked.states());
    }

    #[tokio::test]
    async fn test_incremental_merge_onto_bootstrap() {
        // Historical: hotel 1 has one short and one extended stay
        let mut store = StateStore::new();
        store
            .bootstrap(vec![stay("1", 1), stay("1", 8)], 10)
            .await
            .unwrap();

        // Incremental: one more short stay, with kids
        store.apply_batch(&[stay("1", 1).with_kids(2)]);

        let h1 = store.get("1").unwrap();
        assert_eq!(h1.counts.short, 2);
        assert_eq!(h1.counts.extended, 1);
        assert_eq!(h1.most_popular, Some(StayCategory::Short));
        assert!(h1.with_kids);
    }

    #[tokio::test]
    async fn test_apply_batch_creates_new_hotels() {
        let mut store = StateStore::new();
        store.apply_batch(&[stay("9", 3)]);

        let h9 = store.get("9").unwrap();
        assert_eq!(h9.counts.standard, 1);
        assert_eq!(h9.most_popular, Some(StayCategory::Standard));
    }

    #[tokio::test]
    async fn test_with_kids_survives_later_batches() {
        let mut store = StateStore::new();
        store.apply_batch(&[stay("1", 2).with_kids(1)]);
        store.apply_batch(&[stay("1", 2)]);
        assert!(store.get("1").unwrap().with_kids);
    }

    #[tokio::test]
    async fn test_run_stream_drains_source() {
        let mut store = StateStore::new();
        let mut source = ReplaySource::new(vec![
            vec![stay("1", 1)],
            vec![stay("1", 1), stay("2", 16)],
        ]);

        store.run_stream(&mut source).await.unwrap();

        assert_eq!(store.get("1").unwrap().counts.short, 2);
        assert_eq!(store.get("2").unwrap().counts.long, 1);
    }

    #[tokio::test]
    async fn test_snapshot_is_detached() {
        let mut store = StateStore::new();
        store.apply_batch(&[stay("1", 1)]);
        let snap = store.snapshot();

        store.apply_batch(&[stay("1", 1)]);
        assert_eq!(snap["1"].counts.short, 1);
        assert_eq!(store.get("1").unwrap().counts.short, 2);
    }
}
