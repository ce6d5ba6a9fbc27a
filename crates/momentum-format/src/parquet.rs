//! Apache Parquet output format.

use arrow::array::{
    ArrayRef, Float64Array, StringArray, TimestampMicrosecondArray, UInt32Array, UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use momentum_aggregate::{Bar, BarEvent};
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::io::Write;
use std::sync::Arc;

use crate::{FormatError, Formatter};

/// Parquet formatter.
#[derive(Debug, Clone)]
pub struct ParquetFormatter {
    /// Row group size (number of rows per group).
    row_group_size: usize,
    /// Compression codec.
    compression: Compression,
}

impl Default for ParquetFormatter {
    fn default() -> Self {
        Self {
            row_group_size: 100_000,
            compression: Compression::SNAPPY,
        }
    }
}

impl ParquetFormatter {
    /// Creates a new Parquet formatter with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the row group size.
    #[must_use]
    pub const fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Sets the compression codec.
    #[must_use]
    pub const fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    fn bar_fields() -> Vec<Field> {
        vec![
            Field::new(
                "timestamp",
                DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
                false,
            ),
            Field::new("open", DataType::Float64, false),
            Field::new("high", DataType::Float64, false),
            Field::new("low", DataType::Float64, false),
            Field::new("close", DataType::Float64, false),
            Field::new("volume", DataType::UInt64, false),
            Field::new("tick_count", DataType::UInt32, false),
        ]
    }

    /// Creates the Arrow schema for bars.
    fn bar_schema() -> Schema {
        Schema::new(Self::bar_fields())
    }

    /// Creates the Arrow schema for bar events.
    fn event_schema() -> Schema {
        let mut fields = vec![
            Field::new("event", DataType::Utf8, false),
            Field::new("index", DataType::UInt64, false),
        ];
        fields.extend(Self::bar_fields());
        Schema::new(fields)
    }

    fn bar_columns<'a>(bars: impl Iterator<Item = &'a Bar> + Clone) -> Vec<ArrayRef> {
        let timestamps: Vec<_> = bars
            .clone()
            .map(|b| b.timestamp.timestamp_micros())
            .collect();
        let opens: Vec<_> = bars.clone().map(|b| b.open).collect();
        let highs: Vec<_> = bars.clone().map(|b| b.high).collect();
        let lows: Vec<_> = bars.clone().map(|b| b.low).collect();
        let closes: Vec<_> = bars.clone().map(|b| b.close).collect();
        let volumes: Vec<_> = bars.clone().map(|b| b.volume).collect();
        let tick_counts: Vec<_> = bars.map(|b| b.tick_count).collect();

        vec![
            Arc::new(TimestampMicrosecondArray::from(timestamps).with_timezone("UTC")),
            Arc::new(Float64Array::from(opens)),
            Arc::new(Float64Array::from(highs)),
            Arc::new(Float64Array::from(lows)),
            Arc::new(Float64Array::from(closes)),
            Arc::new(UInt64Array::from(volumes)),
            Arc::new(UInt32Array::from(tick_counts)),
        ]
    }

    /// Converts bars to Arrow RecordBatch.
    fn bars_to_batch(schema: SchemaRef, bars: &[Bar]) -> Result<RecordBatch, FormatError> {
        RecordBatch::try_new(schema, Self::bar_columns(bars.iter()))
            .map_err(|e| FormatError::Parquet(e.to_string()))
    }

    /// Converts bar events to Arrow RecordBatch.
    fn events_to_batch(
        schema: SchemaRef,
        events: &[BarEvent],
    ) -> Result<RecordBatch, FormatError> {
        let names: Vec<_> = events.iter().map(BarEvent::name).collect();
        let indices: Vec<_> = events.iter().map(|e| e.index() as u64).collect();

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(names)),
            Arc::new(UInt64Array::from(indices)),
        ];
        columns.extend(Self::bar_columns(events.iter().map(BarEvent::bar)));

        RecordBatch::try_new(schema, columns).map_err(|e| FormatError::Parquet(e.to_string()))
    }

    fn write_chunks<T, W, F>(
        &self,
        schema: Schema,
        rows: &[T],
        writer: W,
        to_batch: F,
    ) -> Result<(), FormatError>
    where
        W: Write + Send,
        F: Fn(SchemaRef, &[T]) -> Result<RecordBatch, FormatError>,
    {
        let schema = Arc::new(schema);
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut arrow_writer = ArrowWriter::try_new(writer, Arc::clone(&schema), Some(props))
            .map_err(|e| FormatError::Parquet(e.to_string()))?;

        for chunk in rows.chunks(self.row_group_size.max(1)) {
            let batch = to_batch(Arc::clone(&schema), chunk)?;
            arrow_writer
                .write(&batch)
                .map_err(|e| FormatError::Parquet(e.to_string()))?;
        }

        arrow_writer
            .close()
            .map_err(|e| FormatError::Parquet(e.to_string()))?;

        Ok(())
    }
}

impl Formatter for ParquetFormatter {
    fn write_bars<W: Write + Send>(&self, bars: &[Bar], writer: W) -> Result<(), FormatError> {
        self.write_chunks(Self::bar_schema(), bars, writer, Self::bars_to_batch)
    }

    fn write_events<W: Write + Send>(
        &self,
        events: &[BarEvent],
        writer: W,
    ) -> Result<(), FormatError> {
        self.write_chunks(Self::event_schema(), events, writer, Self::events_to_batch)
    }

    fn extension(&self) -> &str {
        "parquet"
    }
}
