//! Info command implementation.
//!
//! This module displays an instrument's tick grid and the price distances of
//! the default momentum bar configuration.

use anyhow::Result;
use momentum_lib::prelude::*;

/// Show detailed information about an instrument.
pub(crate) fn show_info(instrument_id: &str) -> Result<()> {
    let instrument = InstrumentRegistry::global().resolve(instrument_id)?;
    let grid = instrument.grid()?;

    println!("Instrument:  {}", instrument.name());
    println!("ID:          {}", instrument.id());
    println!("Category:    {}", instrument.category());
    println!("Description: {}", instrument.description());
    println!("Tick Size:   {}", instrument.tick_size());
    println!("Decimals:    {}", grid.decimals());

    let config = MomentumConfig::default();
    let range = f64::from(config.range_max_ticks()) * grid.tick_size();
    println!("\nDefault Bars: {config}");
    println!(
        "Range:        {} ticks = {}",
        config.range_max_ticks(),
        grid.round_to_tick(range)
    );

    Ok(())
}
