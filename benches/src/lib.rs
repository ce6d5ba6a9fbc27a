//! Benchmark utilities for momentum.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use momentum_lib::Tick;

/// Shape of a synthetic tick stream.
#[derive(Debug, Clone, Copy)]
pub struct WalkConfig {
    /// Number of ticks to generate.
    pub ticks: usize,
    /// Grid spacing of generated prices.
    pub tick_size: f64,
    /// Largest single step, in ticks.
    pub max_step: u64,
    /// Every `gap_every`-th tick jumps `gap_ticks` ticks; zero disables gaps.
    pub gap_every: usize,
    /// Size of a gap jump, in ticks.
    pub gap_ticks: i64,
    /// Seed of the generator.
    pub seed: u64,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            ticks: 100_000,
            tick_size: 0.25,
            max_step: 3,
            gap_every: 0,
            gap_ticks: 0,
            seed: 7,
        }
    }
}

impl WalkConfig {
    /// A walk with a gap of `ticks` ticks every `every` trades.
    pub const fn with_gaps(mut self, every: usize, ticks: i64) -> Self {
        self.gap_every = every;
        self.gap_ticks = ticks;
        self
    }
}

/// Generates a reproducible random walk of ticks on a price grid.
pub fn random_walk(config: WalkConfig) -> Vec<Tick> {
    let start: DateTime<Utc> = Utc
        .with_ymd_and_hms(2024, 1, 2, 14, 30, 0)
        .single()
        .expect("valid start time");
    let span = 2 * config.max_step + 1;
    let mut seed = config.seed;
    let mut level: i64 = 20_000;

    (0..config.ticks)
        .map(|i| {
            seed = seed
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let step = ((seed >> 33) % span) as i64 - config.max_step as i64;
            level += step;
            if config.gap_every > 0 && i > 0 && i % config.gap_every == 0 {
                level += config.gap_ticks;
            }
            let volume = 1 + (seed >> 60);
            Tick::new(
                start + TimeDelta::milliseconds(i as i64 * 50),
                level as f64 * config.tick_size,
                volume,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_is_reproducible() {
        let config = WalkConfig {
            ticks: 100,
            ..WalkConfig::default()
        };
        assert_eq!(random_walk(config), random_walk(config));
        assert_eq!(random_walk(config).len(), 100);
    }

    #[test]
    fn test_walk_stays_on_grid() {
        let ticks = random_walk(WalkConfig {
            ticks: 1_000,
            ..WalkConfig::default()
        });
        for tick in ticks {
            let steps = tick.price / 0.25;
            assert_eq!(steps, steps.round());
            assert!(tick.volume >= 1);
        }
    }
}
