//! Momentum bar construction for the momentum engine.
//!
//! This crate turns a stream of ticks into momentum bars:
//!
//! - [`MomentumAggregator`] - Streaming range bar engine
//! - [`BarBuilder`] - Reset/update interface driven by a host
//! - [`BarSeries`] - Host that applies bar events to an owned series
//! - [`SessionOracle`] - Session boundary detection for the host
//! - [`Bar`] - OHLCV bar data structure

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/momentum/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod aggregator;
mod bar;
mod builder;
mod config;
mod event;
mod series;
mod session;

pub use aggregator::{Bias, MomentumAggregator, RangeState};
pub use bar::{Bar, BarKind, RangeMeasure};
pub use builder::BarBuilder;
pub use config::{DEFAULT_MAX_PHANTOM_BARS, MomentumConfig, OpenPolicy};
pub use event::BarEvent;
pub use series::BarSeries;
pub use session::{DailySession, NoSession, SessionOracle};
