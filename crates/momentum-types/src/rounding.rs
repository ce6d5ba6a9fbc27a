//! Tick-grid rounding and fixed-point-safe price arithmetic.
//!
//! Range boundaries are built by repeatedly adding tick-denominated values.
//! Plain `f64` addition drifts over long streams, so every such sum goes
//! through [`fixed_add`]: both operands are scaled by [`FIXED_POINT_SCALE`],
//! floored to integers, summed, scaled back and snapped to the tick grid.

use crate::{ConfigError, NumericError};

/// Scale factor used by [`fixed_add`] (seven decimal places).
pub const FIXED_POINT_SCALE: f64 = 10_000_000.0;

/// Fraction of a tick below which two prices compare equal.
const COMPARE_TOLERANCE: f64 = 1e-3;

/// Most decimal places a tick size is inspected for.
const MAX_TICK_DECIMALS: u32 = 10;

/// Result of a tick-aware price comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceOrdering {
    /// First price is below the second by more than the tolerance.
    Below,
    /// Prices are equal within the tolerance.
    Equal,
    /// First price is above the second by more than the tolerance.
    Above,
}

/// Instrument rounding service consumed by the bar engine.
pub trait TickRounding {
    /// Returns the minimum price increment.
    fn tick_size(&self) -> f64;

    /// Compares two prices, absorbing noise smaller than the tick tolerance.
    fn compare(&self, a: f64, b: f64) -> PriceOrdering;

    /// Snaps a value to the nearest point of the tick grid.
    fn round_to_tick(&self, value: f64) -> f64;

    /// Adds two price-like values through the fixed-point adder.
    ///
    /// # Errors
    ///
    /// See [`fixed_add`].
    fn add_prices(&self, lhs: f64, rhs: f64) -> Result<f64, NumericError> {
        fixed_add(self, lhs, rhs)
    }
}

/// Adds two prices through a scaled-integer round trip, then rounds to tick.
///
/// # Errors
///
/// Returns [`NumericError::NonFinite`] for NaN or infinite operands and
/// [`NumericError::Overflow`] when the scaled values do not fit an `i64`.
pub fn fixed_add<R: TickRounding + ?Sized>(
    rounding: &R,
    lhs: f64,
    rhs: f64,
) -> Result<f64, NumericError> {
    let lhs = NumericError::check_finite("operand", lhs)?;
    let rhs = NumericError::check_finite("operand", rhs)?;
    let overflow = NumericError::Overflow { lhs, rhs };

    let a = scaled_floor(lhs).ok_or_else(|| overflow.clone())?;
    let b = scaled_floor(rhs).ok_or_else(|| overflow.clone())?;
    let sum = a.checked_add(b).ok_or(overflow)?;

    Ok(rounding.round_to_tick(sum as f64 / FIXED_POINT_SCALE))
}

/// Scales and floors a value, or `None` if it leaves the `i64` range.
fn scaled_floor(value: f64) -> Option<i64> {
    let scaled = (value * FIXED_POINT_SCALE).floor();
    // i64::MAX is not exactly representable; 2^63 is the first value past it.
    if scaled >= i64::MIN as f64 && scaled < i64::MAX as f64 {
        Some(scaled as i64)
    } else {
        None
    }
}

/// A uniform price grid defined by its tick size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickGrid {
    tick_size: f64,
    decimals: u32,
}

impl TickGrid {
    /// Creates a grid for the given tick size.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTickSize`] unless the tick size is a
    /// positive finite number.
    pub fn new(tick_size: f64) -> Result<Self, ConfigError> {
        if !tick_size.is_finite() || tick_size <= 0.0 {
            return Err(ConfigError::InvalidTickSize(tick_size));
        }
        Ok(Self {
            tick_size,
            decimals: decimals_of(tick_size),
        })
    }

    /// Returns the number of decimal places the tick size carries.
    #[must_use]
    pub const fn decimals(&self) -> u32 {
        self.decimals
    }

    /// Returns the absolute tolerance used by [`TickRounding::compare`].
    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tick_size * COMPARE_TOLERANCE
    }

    /// Converts a price distance to a number of ticks.
    #[must_use]
    pub fn to_ticks(&self, distance: f64) -> f64 {
        self.round_to_tick(distance) / self.tick_size
    }
}

impl TickRounding for TickGrid {
    fn tick_size(&self) -> f64 {
        self.tick_size
    }

    fn compare(&self, a: f64, b: f64) -> PriceOrdering {
        let diff = a - b;
        if diff.abs() < self.tolerance() {
            PriceOrdering::Equal
        } else if diff > 0.0 {
            PriceOrdering::Above
        } else {
            PriceOrdering::Below
        }
    }

    fn round_to_tick(&self, value: f64) -> f64 {
        let snapped = (value / self.tick_size).round() * self.tick_size;
        let factor = 10f64.powi(self.decimals as i32);
        (snapped * factor).round() / factor
    }
}

/// Counts the decimal places needed to represent a tick size.
fn decimals_of(tick_size: f64) -> u32 {
    let mut scaled = tick_size;
    let mut decimals = 0;
    while decimals < MAX_TICK_DECIMALS && (scaled - scaled.round()).abs() > 1e-9 {
        scaled *= 10.0;
        decimals += 1;
    }
    decimals
}
