//! Lazy, bounded-memory CSV-to-batch streaming.
//!
//! [`CsvTickStreamer`] transforms a raw tick CSV (`time`, `price`,
//! `quantity`, `isbuyermaker` columns, extra columns ignored) into the
//! canonical [`TickBatch`] schema, holding at most one batch plus the
//! underlying reader's own buffer in memory at a time — total working set
//! is `O(batch_size)`, independent of file size.

use backsweep_core::batch::{BatchError, TickBatch, TickBatchBuilder};
use backsweep_core::fixed_point::to_fixed;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default batch size: 100,000 rows.
pub const DEFAULT_BATCH_SIZE: usize = 100_000;

#[derive(Debug, Deserialize)]
struct CsvTickRow {
    time: i64,
    price: f64,
    quantity: f64,
    isbuyermaker: u8,
}

/// Errors raised while streaming a tick CSV into batches.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("CSV file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to open CSV file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed row in CSV near record {record}: {source}")]
    Csv {
        record: u64,
        #[source]
        source: csv::Error,
    },
    #[error(transparent)]
    Batch(#[from] BatchError),
}

/// Streams a tick CSV as a finite, in-order sequence of [`TickBatch`]es.
///
/// Implements `Iterator` directly so a consumer can simply
/// `for batch in CsvTickStreamer::open(path)? { ... }`.
pub struct CsvTickStreamer {
    reader: csv::Reader<BufReader<File>>,
    batch_size: usize,
    rows_seen: u64,
    batches_emitted: u64,
    exhausted: bool,
}

impl CsvTickStreamer {
    /// Open `path` with the default batch size ([`DEFAULT_BATCH_SIZE`]).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, IoError> {
        Self::with_batch_size(path, DEFAULT_BATCH_SIZE)
    }

    /// Open `path`, yielding batches of at most `batch_size` rows.
    pub fn with_batch_size<P: AsRef<Path>>(path: P, batch_size: usize) -> Result<Self, IoError> {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            return Err(IoError::NotFound(path_ref.to_path_buf()));
        }
        let file = File::open(path_ref).map_err(|source| IoError::Open {
            path: path_ref.to_path_buf(),
            source,
        })?;
        let reader = ReaderBuilder::new()
            .has_headers(true)
            .from_reader(BufReader::new(file));
        tracing::debug!(path = %path_ref.display(), batch_size, "opened CSV tick stream");
        Ok(Self {
            reader,
            batch_size,
            rows_seen: 0,
            batches_emitted: 0,
            exhausted: false,
        })
    }

    /// Total rows successfully transformed so far.
    pub fn rows_seen(&self) -> u64 {
        self.rows_seen
    }

    /// Total batches emitted so far.
    pub fn batches_emitted(&self) -> u64 {
        self.batches_emitted
    }

    fn next_batch(&mut self) -> Option<Result<TickBatch, IoError>> {
        if self.exhausted {
            return None;
        }

        let mut builder = TickBatchBuilder::with_capacity(self.batch_size);
        let mut rows = self.reader.deserialize::<CsvTickRow>();

        loop {
            match rows.next() {
                None => {
                    self.exhausted = true;
                    break;
                }
                Some(Ok(row)) => {
                    self.rows_seen += 1;
                    let ts_exchange = row.time.saturating_mul(1_000_000);
                    let price = to_fixed(row.price);
                    let qty = to_fixed(row.quantity);
                    // isbuyermaker=1 -> maker is buyer -> taker is seller -> side=-1
                    let side: i8 = if row.isbuyermaker == 1 { -1 } else { 1 };
                    builder.push(ts_exchange, price, qty, side, 0);
                    if builder.len() >= self.batch_size {
                        break;
                    }
                }
                Some(Err(source)) => {
                    let record = source.position().map(|p| p.record()).unwrap_or(self.rows_seen);
                    self.exhausted = true;
                    return Some(Err(IoError::Csv { record, source }));
                }
            }
        }

        if builder.is_empty() {
            return None;
        }

        self.batches_emitted += 1;
        tracing::debug!(
            batch = self.batches_emitted,
            rows = builder.len(),
            "emitted tick batch"
        );
        Some(builder.build().map_err(IoError::from))
    }
}

impl Iterator for CsvTickStreamer {
    type Item = Result<TickBatch, IoError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch()
    }
}
