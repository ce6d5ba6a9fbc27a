//! CSV output format.

use chrono::{DateTime, SecondsFormat, Utc};
use momentum_aggregate::{Bar, BarEvent};
use std::io::Write;

use crate::{FormatError, Formatter};

/// CSV formatter.
#[derive(Debug, Clone, Default)]
pub struct CsvFormatter {
    /// Field delimiter (default: comma).
    delimiter: char,
    /// Whether to include header row.
    include_header: bool,
}

impl CsvFormatter {
    /// Creates a new CSV formatter with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether to include a header row.
    #[must_use]
    pub const fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Creates a tab-separated values (TSV) formatter.
    #[must_use]
    pub const fn tsv() -> Self {
        Self {
            delimiter: '\t',
            include_header: true,
        }
    }

    fn bar_fields(&self, bar: &Bar) -> String {
        let d = self.delimiter;
        format!(
            "{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}",
            timestamp(&bar.timestamp),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume,
            bar.tick_count,
            bar.kind()
        )
    }

    fn bar_header(&self) -> String {
        let d = self.delimiter;
        format!("timestamp{d}open{d}high{d}low{d}close{d}volume{d}tick_count{d}kind")
    }
}

fn timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Formatter for CsvFormatter {
    fn write_bars<W: Write + Send>(&self, bars: &[Bar], mut writer: W) -> Result<(), FormatError> {
        if self.include_header {
            writeln!(writer, "{}", self.bar_header())?;
        }

        for bar in bars {
            writeln!(writer, "{}", self.bar_fields(bar))?;
        }

        Ok(())
    }

    fn write_events<W: Write + Send>(
        &self,
        events: &[BarEvent],
        mut writer: W,
    ) -> Result<(), FormatError> {
        let d = self.delimiter;

        if self.include_header {
            writeln!(writer, "event{d}index{d}{}", self.bar_header())?;
        }

        for event in events {
            writeln!(
                writer,
                "{}{d}{}{d}{}",
                event.name(),
                event.index(),
                self.bar_fields(event.bar())
            )?;
        }

        Ok(())
    }

    fn extension(&self) -> &str {
        if self.delimiter == '\t' { "tsv" } else { "csv" }
    }
}
