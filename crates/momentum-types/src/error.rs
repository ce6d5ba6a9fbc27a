//! Error types for momentum.

use thiserror::Error;

/// Result type alias for momentum operations.
pub type Result<T> = std::result::Result<T, MomentumError>;

/// Errors that can occur while building bars.
#[derive(Error, Debug)]
pub enum MomentumError {
    /// Invalid aggregator configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Arithmetic on a price produced an unusable value.
    #[error(transparent)]
    Numeric(#[from] NumericError),

    /// A single tick required more phantom bars than allowed.
    #[error("Range exhausted: price {price} still breaches after {bars} bars")]
    RangeExhausted {
        /// The tick price that kept breaching.
        price: f64,
        /// Number of bars appended before giving up.
        bars: usize,
    },

    /// Instrument not found.
    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),
}

/// Error for configuration rejected at construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A range bound was zero or negative.
    #[error("Invalid {field}: {value} (must be a positive number of ticks)")]
    NonPositiveRange {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: i64,
    },

    /// A range bound does not fit the supported tick count.
    #[error("Invalid {field}: {value} ticks is too large")]
    RangeTooLarge {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: i64,
    },

    /// The rounding service reported an unusable tick size.
    #[error("Invalid tick size: {0}")]
    InvalidTickSize(f64),

    /// Phantom bar limit of zero.
    #[error("Invalid phantom bar limit: must allow at least one bar")]
    InvalidPhantomLimit,

    /// Unrecognized open policy name.
    #[error("Unknown open policy '{0}', expected one of: nogap, trueopen")]
    UnknownOpenPolicy(String),
}

/// Error for price arithmetic that cannot produce a valid price.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericError {
    /// NaN or infinite input.
    #[error("Non-finite {what}: {value}")]
    NonFinite {
        /// What the value represents.
        what: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// The scaled-integer sum left the representable range.
    #[error("Overflow adding {lhs} and {rhs}")]
    Overflow {
        /// Left operand.
        lhs: f64,
        /// Right operand.
        rhs: f64,
    },
}

impl NumericError {
    /// Rejects NaN and infinite values.
    ///
    /// # Errors
    ///
    /// Returns [`NumericError::NonFinite`] when `value` is not finite.
    pub fn check_finite(what: &'static str, value: f64) -> std::result::Result<f64, Self> {
        if value.is_finite() {
            Ok(value)
        } else {
            Err(Self::NonFinite { what, value })
        }
    }
}
