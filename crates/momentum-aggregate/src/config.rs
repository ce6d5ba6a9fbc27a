//! Aggregator configuration.

use momentum_types::ConfigError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default cap on bars appended for a single tick.
pub const DEFAULT_MAX_PHANTOM_BARS: usize = 10_000;

/// Default range in ticks, used for both bounds.
const DEFAULT_RANGE_TICKS: u32 = 4;

/// Where a new bar opens after its predecessor closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenPolicy {
    /// Open at the previous bar's clipped close, leaving no gap.
    NoGap,
    /// Open at the price of the trade that closed the previous bar.
    #[default]
    TrueOpen,
}

impl OpenPolicy {
    /// Maps a numeric open option: `1` is no-gap, anything else true open.
    #[must_use]
    pub const fn from_code(code: u8) -> Self {
        match code {
            1 => Self::NoGap,
            _ => Self::TrueOpen,
        }
    }

    /// Returns the policy label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoGap => "NoGap",
            Self::TrueOpen => "TrueOpen",
        }
    }
}

impl std::fmt::Display for OpenPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OpenPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nogap" | "no-gap" | "no_gap" | "1" => Ok(Self::NoGap),
            "trueopen" | "true-open" | "true_open" | "real" | "2" => Ok(Self::TrueOpen),
            _ => Err(ConfigError::UnknownOpenPolicy(s.to_string())),
        }
    }
}

/// Validated momentum bar configuration.
///
/// Range bounds are kept in ticks; the aggregator converts them to prices
/// with the instrument's tick size on every session reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawConfig", into = "RawConfig")]
pub struct MomentumConfig {
    range_min_ticks: u32,
    range_max_ticks: u32,
    open_policy: OpenPolicy,
    reset_on_session: bool,
    max_phantom_bars: usize,
}

impl MomentumConfig {
    /// Creates a configuration, swapping the bounds if given in the wrong order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonPositiveRange`] if either bound is zero or
    /// negative, and [`ConfigError::RangeTooLarge`] if it exceeds `u32`.
    pub fn new(
        range_min_ticks: i64,
        range_max_ticks: i64,
        open_policy: OpenPolicy,
    ) -> Result<Self, ConfigError> {
        let mut min = validate_ticks("range_min", range_min_ticks)?;
        let mut max = validate_ticks("range_max", range_max_ticks)?;
        if min > max {
            tracing::warn!(min, max, "range bounds given in reverse order, swapping");
            std::mem::swap(&mut min, &mut max);
        }

        Ok(Self {
            range_min_ticks: min,
            range_max_ticks: max,
            open_policy,
            reset_on_session: true,
            max_phantom_bars: DEFAULT_MAX_PHANTOM_BARS,
        })
    }

    /// Sets whether a session boundary reseeds the bar stream.
    #[must_use]
    pub const fn with_reset_on_session(mut self, reset: bool) -> Self {
        self.reset_on_session = reset;
        self
    }

    /// Sets the cap on bars appended for a single tick.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPhantomLimit`] for a limit of zero.
    pub const fn with_max_phantom_bars(mut self, limit: usize) -> Result<Self, ConfigError> {
        if limit == 0 {
            return Err(ConfigError::InvalidPhantomLimit);
        }
        self.max_phantom_bars = limit;
        Ok(self)
    }

    /// Returns the minimum range in ticks.
    #[must_use]
    pub const fn range_min_ticks(&self) -> u32 {
        self.range_min_ticks
    }

    /// Returns the maximum range in ticks.
    #[must_use]
    pub const fn range_max_ticks(&self) -> u32 {
        self.range_max_ticks
    }

    /// Returns the open policy.
    #[must_use]
    pub const fn open_policy(&self) -> OpenPolicy {
        self.open_policy
    }

    /// Returns true if session boundaries reseed the bar stream.
    #[must_use]
    pub const fn reset_on_session(&self) -> bool {
        self.reset_on_session
    }

    /// Returns the cap on bars appended for a single tick.
    #[must_use]
    pub const fn max_phantom_bars(&self) -> usize {
        self.max_phantom_bars
    }

    /// Returns true if the range grows with the trend.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        self.range_min_ticks < self.range_max_ticks
    }
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            range_min_ticks: DEFAULT_RANGE_TICKS,
            range_max_ticks: DEFAULT_RANGE_TICKS,
            open_policy: OpenPolicy::default(),
            reset_on_session: true,
            max_phantom_bars: DEFAULT_MAX_PHANTOM_BARS,
        }
    }
}

impl std::fmt::Display for MomentumConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_dynamic() {
            write!(
                f,
                "MomentumBars {}-{} {}",
                self.range_min_ticks, self.range_max_ticks, self.open_policy
            )
        } else {
            write!(f, "MomentumBars {} {}", self.range_max_ticks, self.open_policy)
        }
    }
}

/// Unvalidated configuration as it appears in files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct RawConfig {
    range_min_ticks: i64,
    range_max_ticks: i64,
    open_policy: OpenPolicy,
    reset_on_session: bool,
    max_phantom_bars: usize,
}

impl Default for RawConfig {
    fn default() -> Self {
        MomentumConfig::default().into()
    }
}

impl TryFrom<RawConfig> for MomentumConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        Self::new(raw.range_min_ticks, raw.range_max_ticks, raw.open_policy)?
            .with_reset_on_session(raw.reset_on_session)
            .with_max_phantom_bars(raw.max_phantom_bars)
    }
}

impl From<MomentumConfig> for RawConfig {
    fn from(config: MomentumConfig) -> Self {
        Self {
            range_min_ticks: i64::from(config.range_min_ticks),
            range_max_ticks: i64::from(config.range_max_ticks),
            open_policy: config.open_policy,
            reset_on_session: config.reset_on_session,
            max_phantom_bars: config.max_phantom_bars,
        }
    }
}

fn validate_ticks(field: &'static str, value: i64) -> Result<u32, ConfigError> {
    if value <= 0 {
        return Err(ConfigError::NonPositiveRange { field, value });
    }
    u32::try_from(value).map_err(|_| ConfigError::RangeTooLarge { field, value })
}
