//! Batch sources for the streaming update loop.
//!
//! A source hands out record batches one at a time and signals with `None`
//! once everything currently available has been delivered.

use std::collections::VecDeque;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::record::BookingRecord;

#[async_trait]
pub trait BatchSource: Send {
    /// The next available batch, or `None` once the source is caught up.
    async fn next_batch(&mut self) -> Result<Option<Vec<BookingRecord>>>;
}

/// Replays pre-built in-memory batches. Used in tests and for embedding.
pub struct ReplaySource {
    batches: VecDeque<Vec<BookingRecord>>,
}

impl ReplaySource {
    pub fn new(batches: Vec<Vec<BookingRecord>>) -> Self {
        ReplaySource {
            batches: batches.into(),
        }
    }
}

#[async_trait]
impl BatchSource for ReplaySource {
    async fn next_batch(&mut self) -> Result<Option<Vec<BookingRecord>>> {
        Ok(self.batches.pop_front())
    }
}

/// Replays every `*.csv` file in a directory as one batch per file, in
/// filename order so a rerun delivers the batches identically.
pub struct DirectorySource {
    pending: VecDeque<PathBuf>,
}

impl DirectorySource {
    pub fn open(dir: &str) -> Result<Self> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir).with_context(|| format!("reading batch dir {dir}"))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("csv") {
                files.push(path);
            }
        }
        files.sort();

        debug!(dir, batches = files.len(), "Batch directory opened");
        Ok(DirectorySource {
            pending: files.into(),
        })
    }
}

#[async_trait]
impl BatchSource for DirectorySource {
    async fn next_batch(&mut self) -> Result<Option<Vec<BookingRecord>>> {
        match self.pending.pop_front() {
            Some(path) => Ok(Some(read_records(&path)?)),
            None => Ok(None),
        }
    }
}

/// Reads all booking records from one CSV file.
pub fn read_records(path: &Path) -> Result<Vec<BookingRecord>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: BookingRecord = result?;
        records.push(record);
    }

    debug!(path = %path.display(), records = records.len(), "Batch file read");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("stay_tracker_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_batch(dir: &Path, name: &str, rows: &str) {
        let mut f = File::create(dir.join(name)).unwrap();
        writeln!(f, "hotel_id,check_in,check_out,num_kids").unwrap();
        write!(f, "{rows}").unwrap();
    }

    #[tokio::test]
    async fn test_replay_source_exhausts() {
        let mut source = ReplaySource::new(vec![vec![], vec![]]);
        assert!(source.next_batch().await.unwrap().is_some());
        assert!(source.next_batch().await.unwrap().is_some());
        assert!(source.next_batch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_directory_source_replays_in_filename_order() {
        let dir = temp_dir("dir_order");
        write_batch(&dir, "batch-002.csv", "2,2017-01-01,2017-01-02,0\n");
        write_batch(&dir, "batch-001.csv", "1,2017-01-01,2017-01-02,0\n");

        let mut source = DirectorySource::open(dir.to_str().unwrap()).unwrap();
        let first = source.next_batch().await.unwrap().unwrap();
        let second = source.next_batch().await.unwrap().unwrap();

        assert_eq!(first[0].hotel_id, "1");
        assert_eq!(second[0].hotel_id, "2");
        assert!(source.next_batch().await.unwrap().is_none());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_directory_source_ignores_non_csv() {
        let dir = temp_dir("dir_filter");
        write_batch(&dir, "batch-001.csv", "1,2017-01-01,2017-01-02,0\n");
        std::fs::write(dir.join("notes.txt"), "ignore me").unwrap();

        let mut source = DirectorySource::open(dir.to_str().unwrap()).unwrap();
        assert!(source.next_batch().await.unwrap().is_some());
        assert!(source.next_batch().await.unwrap().is_none());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
