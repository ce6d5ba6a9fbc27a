//! Streaming tick-to-momentum-bar aggregation.
//!
//! Each bar is bounded by two breach thresholds around its open. A trade
//! inside the thresholds extends the open bar; a trade outside closes it on
//! the breached threshold and opens as many new bars as the move requires.
//! In dynamic mode the threshold in the trend direction widens one tick per
//! with-trend bar up to the maximum range, while the counter-trend threshold
//! stays at the minimum range.

use chrono::{DateTime, Utc};
use momentum_types::{
    ConfigError, MomentumError, NumericError, PriceOrdering, Result, Tick, TickRounding,
};
use tracing::{debug, trace, warn};

use crate::{Bar, BarBuilder, BarEvent, MomentumConfig, OpenPolicy};

/// Direction of the move that closed the most recent bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Bias {
    /// Closed below its open.
    Down,
    /// No completed move yet.
    #[default]
    Flat,
    /// Closed above its open.
    Up,
}

impl Bias {
    /// Returns the bias of a move from `open` to `price`.
    fn of_move<R: TickRounding + ?Sized>(rounding: &R, price: f64, open: f64) -> Self {
        match rounding.compare(price, open) {
            PriceOrdering::Above => Self::Up,
            PriceOrdering::Below => Self::Down,
            PriceOrdering::Equal => Self::Flat,
        }
    }
}

/// Side of the open bar a trade broke through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Breach {
    Up,
    Down,
}

impl Breach {
    /// Classifies `price` against the thresholds in `state`.
    fn classify<R: TickRounding + ?Sized>(
        rounding: &R,
        price: f64,
        state: &RangeState,
    ) -> Option<Self> {
        if rounding.compare(price, state.this_max) == PriceOrdering::Above {
            Some(Self::Up)
        } else if rounding.compare(price, state.this_min) == PriceOrdering::Below {
            Some(Self::Down)
        } else {
            None
        }
    }

    /// Clips `price` to the breached threshold.
    fn clip(self, price: f64, state: &RangeState) -> f64 {
        match self {
            Self::Up => price.min(state.this_max),
            Self::Down => price.max(state.this_min),
        }
    }
}

/// Builds the event for a newly appended bar.
fn appended(index: usize, bar: Bar) -> BarEvent {
    trace!(index, open = bar.open, close = bar.close, volume = bar.volume, "bar appended");
    BarEvent::Appended { index, bar }
}

/// Range tracking state of one aggregator.
///
/// Ranges and thresholds are absolute prices on the instrument's tick grid.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RangeState {
    prev_bias: Bias,
    this_bias: Bias,
    range_min: f64,
    range_max: f64,
    this_range: f64,
    this_open: f64,
    this_max: f64,
    this_min: f64,
    tick_size: f64,
}

impl RangeState {
    /// Bias of the bar closed before the most recent one.
    #[must_use]
    pub const fn prev_bias(&self) -> Bias {
        self.prev_bias
    }

    /// Bias of the most recently closed bar.
    #[must_use]
    pub const fn this_bias(&self) -> Bias {
        self.this_bias
    }

    /// Minimum range as a price distance.
    #[must_use]
    pub const fn range_min(&self) -> f64 {
        self.range_min
    }

    /// Maximum range as a price distance.
    #[must_use]
    pub const fn range_max(&self) -> f64 {
        self.range_max
    }

    /// Active range as a price distance.
    #[must_use]
    pub const fn this_range(&self) -> f64 {
        self.this_range
    }

    /// Active range in ticks.
    #[must_use]
    pub fn this_range_ticks(&self) -> f64 {
        if self.tick_size > 0.0 {
            (self.this_range / self.tick_size).round()
        } else {
            0.0
        }
    }

    /// Open of the bar being built.
    #[must_use]
    pub const fn this_open(&self) -> f64 {
        self.this_open
    }

    /// Upper breach threshold of the bar being built.
    #[must_use]
    pub const fn this_max(&self) -> f64 {
        self.this_max
    }

    /// Lower breach threshold of the bar being built.
    #[must_use]
    pub const fn this_min(&self) -> f64 {
        self.this_min
    }

    /// Tick size cached at the last reset.
    #[must_use]
    pub const fn tick_size(&self) -> f64 {
        self.tick_size
    }

    /// Returns true if the most recent close went against the bar before it.
    fn is_reversal(&self) -> bool {
        self.prev_bias != Bias::Flat && self.this_bias != self.prev_bias
    }

    /// Widens the range for a with-trend bar, or restarts it after a reversal.
    fn advance_range<R: TickRounding + ?Sized>(
        &mut self,
        rounding: &R,
        reversal: bool,
    ) -> std::result::Result<(), NumericError> {
        if reversal {
            self.this_range = rounding.add_prices(self.range_min, self.tick_size)?;
        } else if rounding.compare(self.this_range, self.range_max) == PriceOrdering::Below {
            self.this_range = rounding.add_prices(self.this_range, self.tick_size)?;
        }

        self.this_range = self.this_range.min(self.range_max);
        Ok(())
    }

    /// Places the open and both thresholds for the next bar.
    fn adjust_bounds<R: TickRounding + ?Sized>(
        &mut self,
        rounding: &R,
        policy: OpenPolicy,
        dynamic: bool,
        clipped_close: f64,
        real_close: f64,
    ) -> std::result::Result<(), NumericError> {
        self.this_open = match policy {
            OpenPolicy::NoGap => clipped_close,
            OpenPolicy::TrueOpen => real_close,
        };

        let (up, down) = if dynamic {
            (
                if self.this_bias == Bias::Up {
                    self.this_range
                } else {
                    self.range_min
                },
                if self.this_bias == Bias::Down {
                    self.this_range
                } else {
                    self.range_min
                },
            )
        } else {
            (self.this_range, self.this_range)
        };

        self.this_max = rounding.add_prices(self.this_open, up)?;
        self.this_min = rounding.add_prices(self.this_open, -down)?;
        Ok(())
    }
}

/// Momentum bar aggregator.
///
/// Owns its range state exclusively and expects ticks from a single
/// producer, in order. Every call runs to completion; on error the state
/// and the open bar are left exactly as they were before the call.
#[derive(Debug)]
pub struct MomentumAggregator<R> {
    config: MomentumConfig,
    rounding: R,
    state: RangeState,
    current: Option<Bar>,
    next_index: usize,
    last_price: Option<f64>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl<R: TickRounding> MomentumAggregator<R> {
    /// Creates an aggregator; the first tick seeds the bar stream.
    #[must_use]
    pub const fn new(config: MomentumConfig, rounding: R) -> Self {
        Self {
            config,
            rounding,
            state: RangeState {
                prev_bias: Bias::Flat,
                this_bias: Bias::Flat,
                range_min: 0.0,
                range_max: 0.0,
                this_range: 0.0,
                this_open: 0.0,
                this_max: 0.0,
                this_min: 0.0,
                tick_size: 0.0,
            },
            current: None,
            next_index: 0,
            last_price: None,
            last_timestamp: None,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &MomentumConfig {
        &self.config
    }

    /// Returns the rounding service.
    #[must_use]
    pub const fn rounding(&self) -> &R {
        &self.rounding
    }

    /// Returns the current range state.
    #[must_use]
    pub const fn state(&self) -> &RangeState {
        &self.state
    }

    /// Returns the bar currently being built.
    #[must_use]
    pub const fn current_bar(&self) -> Option<&Bar> {
        self.current.as_ref()
    }

    /// Returns the number of bars appended so far.
    #[must_use]
    pub const fn bar_count(&self) -> usize {
        self.next_index
    }

    /// Returns the price of the last tick accepted.
    #[must_use]
    pub const fn last_price(&self) -> Option<f64> {
        self.last_price
    }

    /// Records the tick as the last one seen.
    fn observe(&mut self, tick: &Tick) {
        if let Some(last) = self.last_timestamp {
            if tick.timestamp < last {
                debug!(
                    %last,
                    timestamp = %tick.timestamp,
                    "tick timestamp moved backwards"
                );
            }
        }
        self.last_timestamp = Some(tick.timestamp);
        self.last_price = Some(tick.price);
    }

    /// Closes the open bar on a breach and opens bars until the tick fits.
    fn breach(
        &self,
        tick: &Tick,
        price: f64,
        open_bar: Bar,
        direction: Breach,
    ) -> Result<(RangeState, Bar, Vec<BarEvent>)> {
        let rounding = &self.rounding;
        let policy = self.config.open_policy();
        let dynamic = self.config.is_dynamic();
        let limit = self.config.max_phantom_bars();

        let mut state = self.state;
        state.prev_bias = state.this_bias;
        state.this_bias = Bias::of_move(rounding, price, open_bar.open);

        // The closing bar keeps its volume; the trade's volume lands on the
        // first bar opened below.
        let mut close = direction.clip(price, &state);
        let mut closing = open_bar;
        match direction {
            Breach::Up => closing.high = closing.high.max(close),
            Breach::Down => closing.low = closing.low.min(close),
        }
        closing.close = close;
        closing.timestamp = tick.timestamp;

        let mut events = vec![BarEvent::Extended {
            index: self.next_index - 1,
            bar: closing,
        }];
        let mut volume = Some(tick.volume);
        let mut index = self.next_index;
        let mut last = closing;
        let mut breach = Some(direction);
        // Only the first bar opened by a reversal restarts the range.
        let mut reversal = state.is_reversal();

        while let Some(direction) = breach {
            let opened = index - self.next_index;
            if opened >= limit {
                warn!(price, bars = opened, "phantom bar limit reached");
                return Err(MomentumError::RangeExhausted {
                    price,
                    bars: opened,
                });
            }

            if dynamic {
                state.advance_range(rounding, reversal)?;
                reversal = false;
            }
            state.adjust_bounds(rounding, policy, dynamic, close, price)?;
            close = direction.clip(price, &state);

            let first = volume.is_some();
            let bar = Bar::new(
                tick.timestamp,
                state.this_open,
                if direction == Breach::Up { close } else { state.this_open },
                if direction == Breach::Down { close } else { state.this_open },
                close,
                volume.take().unwrap_or(0),
                u32::from(first),
            );
            events.push(appended(index, bar));
            index += 1;
            last = bar;

            breach = Breach::classify(rounding, price, &state);
        }

        Ok((state, last, events))
    }
}

impl<R: TickRounding> BarBuilder for MomentumAggregator<R> {
    fn reset(&mut self, tick: &Tick) -> Result<Vec<BarEvent>> {
        let price = tick.checked_price()?;
        let rounding = &self.rounding;
        let tick_size = rounding.tick_size();
        if !tick_size.is_finite() || tick_size <= 0.0 {
            return Err(ConfigError::InvalidTickSize(tick_size).into());
        }

        let mut state = RangeState {
            tick_size,
            ..RangeState::default()
        };
        state.range_max =
            rounding.add_prices(f64::from(self.config.range_max_ticks()) * tick_size, 0.0)?;
        state.range_min =
            rounding.add_prices(f64::from(self.config.range_min_ticks()) * tick_size, 0.0)?;
        if rounding.compare(state.range_min, state.range_max) == PriceOrdering::Above {
            std::mem::swap(&mut state.range_min, &mut state.range_max);
        }

        let dynamic = self.config.is_dynamic();
        state.this_range = if dynamic {
            state.range_min
        } else {
            state.range_max
        };
        state.adjust_bounds(rounding, self.config.open_policy(), dynamic, price, price)?;

        let bar = Bar::seed(tick.timestamp, state.this_open, tick.volume);
        let index = self.next_index;
        debug!(
            index,
            open = state.this_open,
            max = state.this_max,
            min = state.this_min,
            "bar stream seeded"
        );

        self.state = state;
        self.current = Some(bar);
        self.next_index += 1;
        self.observe(tick);
        Ok(vec![appended(index, bar)])
    }

    fn reset_on_session(&self) -> bool {
        self.config.reset_on_session()
    }

    fn update(&mut self, tick: &Tick) -> Result<Vec<BarEvent>> {
        let Some(mut open_bar) = self.current else {
            return self.reset(tick);
        };
        let price = tick.checked_price()?;

        let events = match Breach::classify(&self.rounding, price, &self.state) {
            None => {
                open_bar.extend(tick.timestamp, price, tick.volume);
                self.current = Some(open_bar);
                vec![BarEvent::Extended {
                    index: self.next_index - 1,
                    bar: open_bar,
                }]
            }
            Some(direction) => {
                let (state, last, events) = self.breach(tick, price, open_bar, direction)?;
                self.state = state;
                self.current = Some(last);
                self.next_index += events.len() - 1;
                events
            }
        };

        self.observe(tick);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::{TimeDelta, TimeZone};
    use momentum_types::TickGrid;

    fn tick(seconds: i64, price: f64, volume: u64) -> Tick {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap();
        Tick::new(start + TimeDelta::seconds(seconds), price, volume)
    }

    fn aggregator(min: i64, max: i64, policy: OpenPolicy, tick_size: f64) -> MomentumAggregator<TickGrid> {
        let config = MomentumConfig::new(min, max, policy).unwrap();
        MomentumAggregator::new(config, TickGrid::new(tick_size).unwrap())
    }

    #[test]
    fn test_reset_seeds_zero_height_bar() {
        let mut agg = aggregator(4, 4, OpenPolicy::NoGap, 0.25);
        let events = agg.reset(&tick(0, 100.0, 5)).unwrap();

        assert_eq!(events.len(), 1);
        let bar = events[0].bar();
        assert!(events[0].is_appended());
        assert_eq!((bar.open, bar.high, bar.low, bar.close), (100.0, 100.0, 100.0, 100.0));
        assert_eq!(bar.volume, 5);

        let state = agg.state();
        assert_abs_diff_eq!(state.range_max(), 1.0);
        assert_abs_diff_eq!(state.this_max(), 101.0);
        assert_abs_diff_eq!(state.this_min(), 99.0);
        assert_eq!(agg.last_price(), Some(100.0));
    }

    #[test]
    fn test_update_without_seed_resets() {
        let mut agg = aggregator(4, 4, OpenPolicy::NoGap, 0.25);
        let events = agg.update(&tick(0, 100.0, 1)).unwrap();
        assert!(events[0].is_appended());
        assert_eq!(agg.bar_count(), 1);
    }

    #[test]
    fn test_within_range_extends() {
        let mut agg = aggregator(4, 4, OpenPolicy::NoGap, 0.25);
        agg.reset(&tick(0, 100.0, 1)).unwrap();
        let events = agg.update(&tick(1, 100.75, 2)).unwrap();
        let events2 = agg.update(&tick(2, 99.25, 3)).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events2[0].index(), 0);
        let bar = agg.current_bar().unwrap();
        assert_eq!(bar.high, 100.75);
        assert_eq!(bar.low, 99.25);
        assert_eq!(bar.close, 99.25);
        assert_eq!(bar.volume, 6);
        assert_eq!(bar.tick_count, 3);
    }

    #[test]
    fn test_touching_threshold_stays_in_bar() {
        let mut agg = aggregator(4, 4, OpenPolicy::NoGap, 0.25);
        agg.reset(&tick(0, 100.0, 1)).unwrap();
        let events = agg.update(&tick(1, 101.0, 1)).unwrap();
        assert_eq!(events.len(), 1);
        assert!(!events[0].is_appended());
    }

    #[test]
    fn test_true_open_uses_trade_price() {
        let mut agg = aggregator(4, 4, OpenPolicy::TrueOpen, 0.25);
        agg.reset(&tick(0, 100.0, 1)).unwrap();
        let events = agg.update(&tick(1, 101.5, 9)).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].bar().close, 101.0);
        let opened = events[1].bar();
        assert_eq!(opened.open, 101.5);
        assert_eq!(opened.close, 101.5);
        assert_eq!(opened.volume, 9);
        assert_abs_diff_eq!(agg.state().this_max(), 102.5);
    }

    #[test]
    fn test_downward_breach_clips_low() {
        let mut agg = aggregator(4, 4, OpenPolicy::NoGap, 0.25);
        agg.reset(&tick(0, 100.0, 1)).unwrap();
        agg.update(&tick(1, 100.5, 1)).unwrap();
        let events = agg.update(&tick(2, 98.5, 4)).unwrap();

        let closed = events[0].bar();
        assert_eq!(closed.low, 99.0);
        assert_eq!(closed.high, 100.5);
        assert_eq!(closed.close, 99.0);
        assert_eq!(agg.state().this_bias(), Bias::Down);

        let opened = events[1].bar();
        assert_eq!(opened.open, 99.0);
        assert_eq!(opened.high, 99.0);
        assert_eq!(opened.low, 98.5);
    }

    #[test]
    fn test_non_finite_price_is_rejected_untouched() {
        let mut agg = aggregator(2, 6, OpenPolicy::NoGap, 1.0);
        agg.reset(&tick(0, 100.0, 1)).unwrap();
        let before = (*agg.state(), agg.current_bar().copied());

        let err = agg.update(&tick(1, f64::NAN, 1)).unwrap_err();
        assert!(matches!(err, MomentumError::Numeric(NumericError::NonFinite { .. })));
        assert_eq!((*agg.state(), agg.current_bar().copied()), before);
        assert_eq!(agg.last_price(), Some(100.0));
    }

    #[test]
    fn test_range_exhausted_leaves_state_untouched() {
        let config = MomentumConfig::new(1, 1, OpenPolicy::NoGap)
            .unwrap()
            .with_max_phantom_bars(3)
            .unwrap();
        let mut agg = MomentumAggregator::new(config, TickGrid::new(1.0).unwrap());
        agg.reset(&tick(0, 100.0, 1)).unwrap();
        let before = (*agg.state(), agg.current_bar().copied(), agg.bar_count());

        let err = agg.update(&tick(1, 110.0, 1)).unwrap_err();
        assert!(matches!(err, MomentumError::RangeExhausted { bars: 3, .. }));
        assert_eq!(
            (*agg.state(), agg.current_bar().copied(), agg.bar_count()),
            before
        );

        // A gap the limit allows still goes through.
        let events = agg.update(&tick(2, 104.0, 1)).unwrap();
        assert_eq!(events.len(), 4);
    }

    #[test]
    fn test_overflowing_price_is_numeric_error() {
        let mut agg = aggregator(4, 4, OpenPolicy::NoGap, 0.25);
        let err = agg.reset(&tick(0, 1e13, 1)).unwrap_err();
        assert!(matches!(err, MomentumError::Numeric(NumericError::Overflow { .. })));
        assert!(agg.current_bar().is_none());
    }

    #[test]
    fn test_backwards_timestamp_passes_through() {
        let mut agg = aggregator(4, 4, OpenPolicy::NoGap, 0.25);
        agg.reset(&tick(10, 100.0, 1)).unwrap();
        let events = agg.update(&tick(5, 100.25, 1)).unwrap();
        assert_eq!(events[0].bar().timestamp, tick(5, 0.0, 0).timestamp);
    }

    #[test]
    fn test_reversal_gap_keeps_prev_bias() {
        let mut agg = aggregator(2, 6, OpenPolicy::NoGap, 1.0);
        agg.reset(&tick(0, 100.0, 1)).unwrap();
        agg.update(&tick(1, 103.0, 1)).unwrap();
        assert_eq!(agg.state().this_range_ticks(), 3.0);

        // Open 102, thresholds 105 / 100: a drop to 93 reverses and gaps.
        let events = agg.update(&tick(2, 93.0, 4)).unwrap();
        let state = agg.state();
        assert_eq!(state.prev_bias(), Bias::Up);
        assert_eq!(state.this_bias(), Bias::Down);

        // The range restarts at 3 once, then widens to 4 for the phantom bar.
        let opens: Vec<f64> = events[1..].iter().map(|e| e.bar().open).collect();
        assert_eq!(opens, vec![100.0, 97.0]);
        assert_eq!(state.this_range_ticks(), 4.0);
        assert_abs_diff_eq!(state.this_min(), 93.0);
        assert_eq!(events[1].bar().volume, 4);
        assert!(events[2..].iter().all(|e| e.bar().volume == 0));
    }
}
