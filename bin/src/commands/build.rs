//! Build command implementation.
//!
//! This module reads ticks from a CSV file, runs them through the momentum bar
//! engine and writes the resulting bars or bar events.

use crate::display::{Format, write_bars, write_events};
use crate::source::tick_records;
use anyhow::{Context, Result, bail};
use chrono::NaiveTime;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use momentum_lib::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info};

/// Arguments of the build command.
pub(crate) struct BuildArgs {
    pub(crate) input: PathBuf,
    pub(crate) instrument: Option<String>,
    pub(crate) tick_size: Option<f64>,
    pub(crate) range_min: Option<i64>,
    pub(crate) range_max: Option<i64>,
    pub(crate) open: Option<String>,
    pub(crate) session_start: String,
    pub(crate) no_session_reset: bool,
    pub(crate) max_phantom_bars: Option<usize>,
    pub(crate) config: Option<PathBuf>,
    pub(crate) events: bool,
    pub(crate) output: Option<PathBuf>,
    pub(crate) format: Format,
}

/// Build momentum bars from a tick file.
pub(crate) async fn build(args: BuildArgs, quiet: bool) -> Result<()> {
    let grid = resolve_grid(args.instrument.as_deref(), args.tick_size)?;
    let config = resolve_config(&args)?;
    let mut oracle = session_oracle(&args.session_start)?;
    info!(%config, tick_size = grid.tick_size(), "building bars");

    let mut series = BarSeries::new(MomentumAggregator::new(config.clone(), grid));
    let mut events = Vec::new();

    // Stdout may carry the bars, so progress stays on stderr.
    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} ticks {msg}")
                .expect("Invalid progress template"),
        );
        pb.set_message(config.to_string());
        pb
    };

    let records = tick_records(&args.input).await?;
    futures::pin_mut!(records);

    let mut ticks = 0u64;
    while let Some(record) = records.next().await {
        let record = record?;
        let tick = record.tick();
        let detected = oracle.is_new_session(tick.timestamp);
        let is_new_session = record.new_session().unwrap_or(detected);
        if is_new_session {
            debug!(timestamp = %tick.timestamp, "session boundary");
        }

        let emitted = series
            .push(&tick, is_new_session)
            .with_context(|| format!("Failed to process tick {} at {}", ticks + 1, tick.timestamp))?;
        if args.events {
            events.extend(emitted);
        }

        ticks += 1;
        progress.inc(1);
    }

    progress.finish_with_message(format!("{} bars from {ticks} ticks", series.len()));

    let output = args.output.as_deref();
    if args.events {
        write_events(&events, output, args.format)?;
    } else {
        write_bars(series.bars(), output, args.format)?;
    }

    if let (Some(path), false) = (output, quiet) {
        eprintln!("Output written to: {}", path.display());
    }

    Ok(())
}

/// Picks the tick grid from an explicit tick size or the instrument registry.
fn resolve_grid(instrument: Option<&str>, tick_size: Option<f64>) -> Result<TickGrid> {
    let tick_size = match (tick_size, instrument) {
        (Some(size), _) => size,
        (None, Some(id)) => InstrumentRegistry::global().resolve(id)?.tick_size(),
        (None, None) => bail!("Either --instrument or --tick-size is required"),
    };
    TickGrid::new(tick_size).with_context(|| format!("Invalid tick size: {tick_size}"))
}

/// Loads the configuration file, if any, and applies the command line overrides.
fn resolve_config(args: &BuildArgs) -> Result<MomentumConfig> {
    let base = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str::<MomentumConfig>(&text)
                .with_context(|| format!("Invalid config: {}", path.display()))?
        }
        None => MomentumConfig::default(),
    };

    let open = match &args.open {
        Some(open) => open.parse::<OpenPolicy>()?,
        None => base.open_policy(),
    };
    let config = MomentumConfig::new(
        args.range_min.unwrap_or_else(|| i64::from(base.range_min_ticks())),
        args.range_max.unwrap_or_else(|| i64::from(base.range_max_ticks())),
        open,
    )?
    .with_reset_on_session(base.reset_on_session() && !args.no_session_reset)
    .with_max_phantom_bars(args.max_phantom_bars.unwrap_or(base.max_phantom_bars()))?;

    if config != base {
        debug!(%base, %config, "configuration overridden from the command line");
    }
    Ok(config)
}

/// Builds the session oracle from a daily start time, or "none".
fn session_oracle(start: &str) -> Result<Box<dyn SessionOracle>> {
    if start.eq_ignore_ascii_case("none") {
        return Ok(Box::new(NoSession));
    }
    let time = NaiveTime::parse_from_str(start, "%H:%M")
        .with_context(|| format!("Invalid session start: {start} (expected HH:MM)"))?;
    Ok(Box::new(DailySession::new(time)))
}
