// CLI application
use anyhow::{Context, Result};
use clap::Parser;
use glshim_core::{GlContext, ShimConfig};
use std::path::PathBuf;

mod driver;
mod trace;

use driver::TraceDriver;
use trace::{Replay, ReplayReport};

#[derive(Parser)]
#[command(name = "glshim")]
#[command(about = "Replay legacy GL matrix call traces through the GLES matrix shim")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Replay a JSON call trace and print the resulting matrix state
    Replay {
        /// Path to the JSON trace file
        #[arg(short, long)]
        trace: PathBuf,

        /// Path to a JSON context configuration (defaults apply otherwise)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    },
    /// Print the default context configuration as JSON
    DefaultConfig,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            trace,
            config,
            pretty,
        } => {
            let config = match config {
                Some(path) => ShimConfig::load(&path)?,
                None => ShimConfig::default(),
            };
            let calls = trace::load_trace(&trace)?;
            log::info!("Replaying {} calls from {}", calls.len(), trace.display());

            let mut ctx = GlContext::new(config, TraceDriver::default())
                .context("Invalid context configuration")?;
            let mut replay = Replay::new();
            replay.run(&mut ctx, &calls);
            if ctx.is_compiling() {
                log::warn!("Trace ended while a list was still being compiled");
            }

            let report = ReplayReport::collect(&ctx, &replay);
            let json = if pretty {
                serde_json::to_string_pretty(&report)
            } else {
                serde_json::to_string(&report)
            }
            .context("Failed to serialize report")?;
            println!("{}", json);
        }
        Commands::DefaultConfig => {
            println!("{}", ShimConfig::default().to_json()?);
        }
    }

    Ok(())
}
