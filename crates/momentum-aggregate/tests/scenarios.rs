//! End-to-end behavior of the momentum bar engine.

use approx::assert_abs_diff_eq;
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use momentum_aggregate::{
    Bar, BarBuilder, BarSeries, Bias, MomentumAggregator, MomentumConfig, OpenPolicy,
};
use momentum_types::{Tick, TickGrid};

const EPS: f64 = 1e-9;

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap()
}

fn tick(seconds: i64, price: f64, volume: u64) -> Tick {
    Tick::new(start() + TimeDelta::seconds(seconds), price, volume)
}

fn aggregator(
    min: i64,
    max: i64,
    policy: OpenPolicy,
    tick_size: f64,
) -> MomentumAggregator<TickGrid> {
    let config = MomentumConfig::new(min, max, policy).unwrap();
    MomentumAggregator::new(config, TickGrid::new(tick_size).unwrap())
}

#[test]
fn static_range_breach_clips_close() {
    let mut agg = aggregator(4, 4, OpenPolicy::NoGap, 0.25);
    let seeded = agg.reset(&tick(0, 100.0, 3)).unwrap();
    let seed = seeded[0].bar();
    assert_eq!((seed.open, seed.high, seed.low, seed.close), (100.0, 100.0, 100.0, 100.0));

    let events = agg.update(&tick(1, 101.05, 2)).unwrap();
    assert_eq!(events.len(), 2);

    let closed = events[0].bar();
    assert_eq!(events[0].index(), 0);
    assert_eq!(closed.close, 101.0);
    assert_eq!(closed.high, 101.0);
    assert_eq!(closed.volume, 3);

    assert!(events[1].is_appended());
    assert_eq!(events[1].index(), 1);
    let opened = events[1].bar();
    assert_eq!(opened.open, 101.0);
    assert_eq!(opened.volume, 2);
    assert_abs_diff_eq!(agg.state().this_max(), 102.0, epsilon = EPS);
    assert_abs_diff_eq!(agg.state().this_min(), 100.0, epsilon = EPS);
}

#[test]
fn dynamic_range_grows_with_trend_then_resets_on_reversal() {
    let mut agg = aggregator(2, 6, OpenPolicy::NoGap, 1.0);
    agg.reset(&tick(0, 100.0, 1)).unwrap();

    let mut ranges = vec![agg.state().this_range_ticks()];
    for (i, price) in [103.0, 106.0, 110.0].into_iter().enumerate() {
        let events = agg.update(&tick(i as i64 + 1, price, 1)).unwrap();
        assert_eq!(events.len(), 2, "each breach opens exactly one bar");
        assert_eq!(agg.state().this_bias(), Bias::Up);
        ranges.push(agg.state().this_range_ticks());
    }
    assert_eq!(ranges, vec![2.0, 3.0, 4.0, 5.0]);

    // Counter-trend threshold stays at the minimum range.
    let state = *agg.state();
    assert_abs_diff_eq!(state.this_open() - state.this_min(), 2.0, epsilon = EPS);
    assert_abs_diff_eq!(state.this_max() - state.this_open(), 5.0, epsilon = EPS);

    agg.update(&tick(10, 106.0, 1)).unwrap();
    let state = agg.state();
    assert_eq!(state.this_bias(), Bias::Down);
    assert_eq!(state.prev_bias(), Bias::Up);
    assert_eq!(state.this_range_ticks(), 3.0);
    assert_abs_diff_eq!(state.this_open() - state.this_min(), 3.0, epsilon = EPS);
    assert_abs_diff_eq!(state.this_max() - state.this_open(), 2.0, epsilon = EPS);
}

#[test]
fn dynamic_range_is_capped_at_maximum() {
    let mut agg = aggregator(2, 4, OpenPolicy::NoGap, 1.0);
    agg.reset(&tick(0, 100.0, 1)).unwrap();
    let mut last = None;
    for i in 1..10 {
        let price = agg.state().this_max() + 0.5;
        agg.update(&tick(i, price, 1)).unwrap();
        assert!(agg.state().this_range_ticks() <= 4.0);
        last = Some(price);
    }
    assert_eq!(agg.state().this_range_ticks(), 4.0);
    assert_eq!(agg.last_price(), last);
}

#[test]
fn gap_tick_emits_phantom_bars() {
    let mut agg = aggregator(4, 4, OpenPolicy::NoGap, 1.0);
    agg.reset(&tick(0, 100.0, 1)).unwrap();

    let events = agg.update(&tick(1, 117.0, 7)).unwrap();
    assert_eq!(events.len(), 5);
    assert!(!events[0].is_appended());
    assert_eq!(events[0].bar().close, 104.0);

    let appended: Vec<&Bar> = events[1..].iter().map(|e| e.bar()).collect();
    assert_eq!(appended.len(), 4);
    assert_eq!(appended[0].volume, 7);
    assert!(appended[1..].iter().all(|bar| bar.is_phantom()));
    assert_eq!(
        appended.iter().map(|bar| bar.open).collect::<Vec<_>>(),
        vec![104.0, 108.0, 112.0, 116.0]
    );
    assert_eq!(appended[3].close, 117.0);
    assert_eq!(
        events.iter().map(|e| e.index()).collect::<Vec<_>>(),
        vec![0, 1, 2, 3, 4]
    );
    assert_eq!(agg.bar_count(), 5);
}

#[test]
fn true_open_never_emits_phantoms() {
    let mut agg = aggregator(4, 4, OpenPolicy::TrueOpen, 1.0);
    agg.reset(&tick(0, 100.0, 1)).unwrap();
    let events = agg.update(&tick(1, 117.0, 7)).unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[1].bar().open, 117.0);
}

#[test]
fn session_reset_is_idempotent() {
    let mut agg = aggregator(2, 6, OpenPolicy::NoGap, 0.25);
    agg.reset(&tick(0, 100.0, 1)).unwrap();
    agg.update(&tick(1, 101.0, 1)).unwrap();

    agg.reset(&tick(2, 99.0, 1)).unwrap();
    let once = *agg.state();
    agg.reset(&tick(2, 99.0, 1)).unwrap();

    assert_eq!(*agg.state(), once);
    assert_eq!(once.this_bias(), Bias::Flat);
    assert_eq!(once.prev_bias(), Bias::Flat);
}

#[test]
fn inverted_bounds_are_normalized() {
    let mut agg = aggregator(8, 3, OpenPolicy::NoGap, 0.5);
    agg.reset(&tick(0, 50.0, 1)).unwrap();
    let state = agg.state();
    assert!(state.range_min() <= state.range_max());
    assert_abs_diff_eq!(state.range_min(), 1.5, epsilon = EPS);
    assert_abs_diff_eq!(state.range_max(), 4.0, epsilon = EPS);
}

#[test]
fn series_conserves_volume() {
    let config = MomentumConfig::new(2, 5, OpenPolicy::NoGap).unwrap();
    let mut series = BarSeries::new(MomentumAggregator::new(
        config,
        TickGrid::new(0.25).unwrap(),
    ));

    let prices = [100.0, 100.5, 101.75, 99.0, 104.0, 103.25, 95.5, 96.0];
    let mut total = 0;
    for (i, price) in prices.into_iter().enumerate() {
        let volume = i as u64 + 1;
        total += volume;
        series.push(&tick(i as i64, price, volume), false).unwrap();
    }

    let bars = series.bars();
    assert_eq!(bars.iter().map(|bar| bar.volume).sum::<u64>(), total);
    assert_eq!(bars.iter().map(|bar| u64::from(bar.tick_count)).sum::<u64>(), 8);
    assert!(bars.len() > prices.len());
}

/// Deterministic walk of whole-tick steps.
struct Walk {
    seed: u64,
    ticks: i64,
}

impl Walk {
    fn step(&mut self) -> i64 {
        self.seed = self
            .seed
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        let draw = (self.seed >> 33) % 13;
        self.ticks += draw as i64 - 6;
        self.ticks
    }
}

fn check_walk(policy: OpenPolicy, min: i64, max: i64) {
    let tick_size = 0.25;
    let mut agg = aggregator(min, max, policy, tick_size);
    let mut walk = Walk { seed: 42, ticks: 4_000 };
    let eps = tick_size * 0.01;

    agg.reset(&tick(0, 1_000.0, 1)).unwrap();
    for i in 1..5_000 {
        let price = walk.step() as f64 * tick_size;
        let volume = i as u64 % 4 + 1;
        let before = *agg.state();
        let events = agg.update(&tick(i, price, volume)).unwrap();

        let state = *agg.state();
        assert!(state.this_range() >= state.range_min() - eps);
        assert!(state.this_range() <= state.range_max() + eps);
        assert!(state.this_min() <= state.this_open() && state.this_open() <= state.this_max());

        let up = state.this_max() - state.this_open();
        let down = state.this_open() - state.this_min();
        match state.this_bias() {
            Bias::Up if min != max => assert_abs_diff_eq!(down, state.range_min(), epsilon = eps),
            Bias::Down if min != max => assert_abs_diff_eq!(up, state.range_min(), epsilon = eps),
            _ => {}
        }

        for event in &events {
            let bar = event.bar();
            assert!(bar.low <= bar.open && bar.open <= bar.high);
            assert!(bar.low <= bar.close && bar.close <= bar.high);
            assert!(bar.body() <= state.range_max() + eps);
        }

        let opened: Vec<&Bar> = events
            .iter()
            .filter(|e| e.is_appended())
            .map(|e| e.bar())
            .collect();
        let breached = !opened.is_empty();
        let expected = if breached { volume } else { 0 };
        assert_eq!(opened.iter().map(|bar| bar.volume).sum::<u64>(), expected);
        assert_eq!(
            opened.iter().map(|bar| u64::from(bar.tick_count)).sum::<u64>(),
            u64::from(breached)
        );

        if breached {
            // The closed bar stays inside the range that was active when it opened.
            let closed = events[0].bar();
            assert!(!events[0].is_appended());
            assert!(closed.body() <= before.this_range() + eps);
            match (before.this_bias(), state.this_bias()) {
                (Bias::Up, Bias::Up) => assert!(closed.lower_wick() <= before.range_min() + eps),
                (Bias::Down, Bias::Down) => assert!(closed.upper_wick() <= before.range_min() + eps),
                _ => {}
            }
        }

        let open = agg.current_bar().unwrap();
        assert!(open.high <= state.this_max() + eps);
        assert!(open.low >= state.this_min() - eps);
    }
}

#[test]
fn random_walk_respects_bounds_static() {
    check_walk(OpenPolicy::NoGap, 4, 4);
}

#[test]
fn random_walk_respects_bounds_dynamic() {
    check_walk(OpenPolicy::NoGap, 2, 6);
}

#[test]
fn random_walk_respects_bounds_true_open() {
    check_walk(OpenPolicy::TrueOpen, 3, 8);
}
