//! Tick file reader.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use csv_async::{AsyncReaderBuilder, Trim};
use futures::{Stream, StreamExt};
use momentum_lib::prelude::*;
use serde::Deserialize;
use std::path::Path;
use tokio::fs::File;
use tokio::io::BufReader;

/// One row of a tick file.
#[derive(Debug, Deserialize)]
pub(crate) struct TickRecord {
    timestamp: DateTime<Utc>,
    price: f64,
    volume: u64,
    /// Explicit session flag; when absent the session oracle decides.
    #[serde(default)]
    new_session: Option<bool>,
}

impl TickRecord {
    pub(crate) const fn tick(&self) -> Tick {
        Tick::new(self.timestamp, self.price, self.volume)
    }

    pub(crate) const fn new_session(&self) -> Option<bool> {
        self.new_session
    }
}

/// Streams tick records from a CSV file with a header row.
pub(crate) async fn tick_records(path: &Path) -> Result<impl Stream<Item = Result<TickRecord>>> {
    let file = File::open(path)
        .await
        .with_context(|| format!("Failed to open tick file: {}", path.display()))?;
    let reader = AsyncReaderBuilder::new()
        .trim(Trim::All)
        .create_deserializer(BufReader::new(file));

    Ok(reader
        .into_deserialize::<TickRecord>()
        .enumerate()
        .map(|(row, record)| {
            record.with_context(|| format!("Invalid tick record on row {}", row + 1))
        }))
}
