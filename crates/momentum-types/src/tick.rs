//! Trade tick representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::NumericError;

/// A single trade: price, time, and traded volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Timestamp of the trade (UTC).
    pub timestamp: DateTime<Utc>,
    /// Traded price.
    pub price: f64,
    /// Traded volume.
    pub volume: u64,
}

impl Tick {
    /// Creates a new tick.
    #[must_use]
    pub const fn new(timestamp: DateTime<Utc>, price: f64, volume: u64) -> Self {
        Self {
            timestamp,
            price,
            volume,
        }
    }

    /// Returns the price if it is usable for bar construction.
    ///
    /// # Errors
    ///
    /// Returns [`NumericError::NonFinite`] for NaN or infinite prices.
    pub fn checked_price(&self) -> Result<f64, NumericError> {
        NumericError::check_finite("price", self.price)
    }
}
