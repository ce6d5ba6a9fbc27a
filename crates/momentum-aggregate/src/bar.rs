//! Bar data structure.

use chrono::{DateTime, Utc};
use momentum_types::TickRounding;
use serde::{Deserialize, Serialize};

/// A momentum bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Time of the most recent trade applied to the bar.
    pub timestamp: DateTime<Utc>,
    /// Opening price.
    pub open: f64,
    /// Highest price.
    pub high: f64,
    /// Lowest price.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Traded volume attributed to the bar.
    pub volume: u64,
    /// Number of trades attributed to the bar.
    pub tick_count: u32,
}

/// Shape of a bar, as used to shade candles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarKind {
    /// No volume; created while a single trade gapped across ranges.
    Phantom,
    /// Opened at the low and closed at the high.
    BullTrend,
    /// Opened at the high and closed at the low.
    BearTrend,
    /// Closed above the open with at least one wick.
    Bullish,
    /// Closed below the open with at least one wick.
    Bearish,
    /// Closed at the open.
    Doji,
}

impl BarKind {
    /// Returns the snake case label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Phantom => "phantom",
            Self::BullTrend => "bull_trend",
            Self::BearTrend => "bear_trend",
            Self::Bullish => "bullish",
            Self::Bearish => "bearish",
            Self::Doji => "doji",
        }
    }
}

impl std::fmt::Display for BarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a bar's range is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeMeasure {
    /// Body height, `|close - open|`.
    #[default]
    OpenClose,
    /// Full height, `high - low`.
    HighLow,
}

impl Bar {
    /// Creates a new bar.
    #[must_use]
    pub const fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
        tick_count: u32,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            tick_count,
        }
    }

    /// Creates a zero-height bar at `price` from a single trade.
    #[must_use]
    pub const fn seed(timestamp: DateTime<Utc>, price: f64, volume: u64) -> Self {
        Self::new(timestamp, price, price, price, price, volume, 1)
    }

    /// Applies a trade that stays inside the bar's range.
    pub(crate) fn extend(&mut self, timestamp: DateTime<Utc>, price: f64, volume: u64) {
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
        self.volume = self.volume.saturating_add(volume);
        self.tick_count = self.tick_count.saturating_add(1);
        self.timestamp = timestamp;
    }

    /// Returns the price range (high - low).
    #[must_use]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Returns the body size (|close - open|).
    #[must_use]
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Returns the wick above the body.
    #[must_use]
    pub fn upper_wick(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    /// Returns the wick below the body.
    #[must_use]
    pub fn lower_wick(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    /// Returns true if this is a bullish bar.
    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Returns true if this is a bearish bar.
    #[must_use]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Returns true if no volume was attributed to the bar.
    #[must_use]
    pub const fn is_phantom(&self) -> bool {
        self.volume == 0
    }

    /// Classifies the bar's shape.
    ///
    /// Prices are compared exactly: the engine copies boundary values into
    /// bars verbatim, so a bar closed on its high holds the identical value.
    #[must_use]
    pub fn kind(&self) -> BarKind {
        if self.is_phantom() {
            BarKind::Phantom
        } else if self.close == self.high && self.open == self.low && self.is_bullish() {
            BarKind::BullTrend
        } else if self.close == self.low && self.open == self.high && self.is_bearish() {
            BarKind::BearTrend
        } else if self.is_bullish() {
            BarKind::Bullish
        } else if self.is_bearish() {
            BarKind::Bearish
        } else {
            BarKind::Doji
        }
    }

    /// Returns the bar's range in ticks of the given grid.
    #[must_use]
    pub fn range_ticks<R: TickRounding + ?Sized>(&self, measure: RangeMeasure, grid: &R) -> f64 {
        let distance = match measure {
            RangeMeasure::OpenClose => self.body(),
            RangeMeasure::HighLow => self.range(),
        };
        grid.round_to_tick(distance) / grid.tick_size()
    }
}
