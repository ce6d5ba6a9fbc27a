//! Display utilities and output formatting for the momentum CLI.

use anyhow::{Result, bail};
use clap::ValueEnum;
use momentum_lib::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Output format for built bars.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Format {
    Csv,
    Json,
    Ndjson,
    Parquet,
}

impl Format {
    /// Returns the file extension for this format.
    pub(crate) const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Ndjson => "ndjson",
            Self::Parquet => "parquet",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Opens the output file, or stdout when no path is given.
fn open_output(output: Option<&Path>, format: Format) -> Result<Box<dyn Write + Send>> {
    match output {
        Some(path) => Ok(Box::new(BufWriter::new(File::create(path)?))),
        None if matches!(format, Format::Parquet) => {
            bail!("Parquet output needs a file path (--output)")
        }
        None => Ok(Box::new(BufWriter::new(std::io::stdout()))),
    }
}

/// Write bars in the specified format.
pub(crate) fn write_bars(bars: &[Bar], output: Option<&Path>, format: Format) -> Result<()> {
    let mut writer = open_output(output, format)?;

    match format {
        Format::Csv => CsvFormatter::new().write_bars(bars, &mut writer)?,
        Format::Json => JsonFormatter::new().write_bars(bars, &mut writer)?,
        Format::Ndjson => JsonFormatter::ndjson().write_bars(bars, &mut writer)?,
        Format::Parquet => {
            #[cfg(feature = "parquet")]
            {
                ParquetFormatter::new().write_bars(bars, &mut writer)?;
            }
            #[cfg(not(feature = "parquet"))]
            {
                bail!("Parquet support not compiled in");
            }
        }
    }

    writer.flush()?;
    Ok(())
}

/// Write bar events in the specified format.
pub(crate) fn write_events(
    events: &[BarEvent],
    output: Option<&Path>,
    format: Format,
) -> Result<()> {
    let mut writer = open_output(output, format)?;

    match format {
        Format::Csv => CsvFormatter::new().write_events(events, &mut writer)?,
        Format::Json => JsonFormatter::new().write_events(events, &mut writer)?,
        Format::Ndjson => JsonFormatter::ndjson().write_events(events, &mut writer)?,
        Format::Parquet => {
            #[cfg(feature = "parquet")]
            {
                ParquetFormatter::new().write_events(events, &mut writer)?;
            }
            #[cfg(not(feature = "parquet"))]
            {
                bail!("Parquet support not compiled in");
            }
        }
    }

    writer.flush()?;
    Ok(())
}

/// Parse a category string into a Category enum.
pub(crate) fn parse_category(s: &str) -> Result<Category> {
    match s.to_lowercase().as_str() {
        "future" | "futures" => Ok(Category::Future),
        "forex" | "fx" => Ok(Category::Forex),
        "crypto" => Ok(Category::Crypto),
        "stock" => Ok(Category::Stock),
        _ => bail!(
            "Unknown category: {}. Valid options: future, forex, crypto, stock",
            s
        ),
    }
}
