//! momentum CLI - Build momentum bars from tick data.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;
mod source;

use commands::build::BuildArgs;
use display::Format;

#[derive(Parser)]
#[command(name = "momentum")]
#[command(about = "Build momentum range bars from tick data", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build momentum bars from a tick CSV file
    Build {
        /// Tick file with columns timestamp,price,volume[,new_session]
        input: PathBuf,

        /// Instrument identifier supplying the tick size (e.g., es, eurusd)
        #[arg(short, long)]
        instrument: Option<String>,

        /// Tick size, overriding the instrument's
        #[arg(long)]
        tick_size: Option<f64>,

        /// Minimum range in ticks
        #[arg(long)]
        range_min: Option<i64>,

        /// Maximum range in ticks
        #[arg(long)]
        range_max: Option<i64>,

        /// Open policy for new bars (nogap, trueopen)
        #[arg(long)]
        open: Option<String>,

        /// Daily session start in UTC (HH:MM), or "none" for a single session
        #[arg(long, default_value = "00:00")]
        session_start: String,

        /// Keep building across session boundaries instead of reseeding
        #[arg(long)]
        no_session_reset: bool,

        /// Maximum bars a single tick may append
        #[arg(long)]
        max_phantom_bars: Option<usize>,

        /// JSON configuration file; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the bar event stream instead of the final bars
        #[arg(long)]
        events: bool,

        /// Output file path. Defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,
    },

    /// List available instruments
    List {
        /// Filter by category (future, forex, crypto, stock)
        #[arg(short, long)]
        category: Option<String>,

        /// Search pattern
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show instrument details
    Info {
        /// Instrument identifier
        instrument: String,
    },
}

/// Installs the log subscriber; `RUST_LOG` overrides the `-v` level.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Build {
            input,
            instrument,
            tick_size,
            range_min,
            range_max,
            open,
            session_start,
            no_session_reset,
            max_phantom_bars,
            config,
            events,
            output,
            format,
        } => {
            let args = BuildArgs {
                input,
                instrument,
                tick_size,
                range_min,
                range_max,
                open,
                session_start,
                no_session_reset,
                max_phantom_bars,
                config,
                events,
                output,
                format,
            };
            commands::build::build(args, cli.quiet).await
        }
        Commands::List { category, search } => {
            commands::list::list_instruments(category.as_deref(), search.as_deref())
        }
        Commands::Info { instrument } => commands::info::show_info(&instrument),
    }
}
