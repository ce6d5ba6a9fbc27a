//! Core types for the momentum bars engine.
//!
//! This crate provides the fundamental data structures used throughout momentum:
//!
//! - [`Tick`] - A single trade with timestamp, price, and volume
//! - [`Instrument`] - Tradable instrument with its tick size
//! - [`TickRounding`] - Tick-aware compare and rounding service
//! - [`TickGrid`] - Concrete tick grid implementing [`TickRounding`]
//! - [`MomentumError`] - Errors raised while building bars

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/momentum/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod instrument;
mod rounding;
mod tick;

pub use error::{ConfigError, MomentumError, NumericError, Result};
pub use instrument::{Category, Instrument};
pub use rounding::{FIXED_POINT_SCALE, PriceOrdering, TickGrid, TickRounding, fixed_add};
pub use tick::Tick;
