//! Streaming momentum bar construction from tick data.
//!
//! This is a facade crate that re-exports functionality from the momentum
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use momentum_lib::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let instrument = InstrumentRegistry::global().resolve("es")?;
//!     let config = MomentumConfig::new(2, 6, OpenPolicy::NoGap)?;
//!     let mut series = BarSeries::new(MomentumAggregator::new(config, instrument.grid()?));
//!
//!     let now = chrono::Utc::now();
//!     for price in [5000.0, 5000.75, 5001.25, 4999.5] {
//!         series.push(&Tick::new(now, price, 1), false)?;
//!     }
//!     println!("{} bars", series.len());
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/momentum/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use momentum_types::*;

// Re-export instrument registry
pub use momentum_instruments::InstrumentRegistry;

// Re-export the bar engine
#[cfg(feature = "aggregate")]
pub use momentum_aggregate::{
    Bar, BarBuilder, BarEvent, BarKind, BarSeries, Bias, DEFAULT_MAX_PHANTOM_BARS, DailySession,
    MomentumAggregator, MomentumConfig, NoSession, OpenPolicy, RangeMeasure, RangeState,
    SessionOracle,
};

// Re-export formatters
#[cfg(feature = "format")]
pub use momentum_format::{
    CsvFormatter, FormatError, Formatter, JsonFormatter, JsonStyle, OutputFormat,
};

#[cfg(all(feature = "format", feature = "parquet"))]
pub use momentum_format::ParquetFormatter;

/// Prelude module for convenient imports.
///
/// ```
/// use momentum_lib::prelude::*;
/// ```
pub mod prelude {
    pub use momentum_types::{
        Category, Instrument, MomentumError, Result, Tick, TickGrid, TickRounding,
    };

    pub use momentum_instruments::InstrumentRegistry;

    #[cfg(feature = "aggregate")]
    pub use momentum_aggregate::{
        Bar, BarBuilder, BarEvent, BarSeries, DailySession, MomentumAggregator, MomentumConfig,
        NoSession, OpenPolicy, SessionOracle,
    };

    #[cfg(feature = "format")]
    pub use momentum_format::{CsvFormatter, Formatter, JsonFormatter, OutputFormat};

    #[cfg(all(feature = "format", feature = "parquet"))]
    pub use momentum_format::ParquetFormatter;
}
