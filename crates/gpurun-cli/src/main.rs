//! gpurun — single-node distributed-training launcher shim.
//!
//! Replaces the usual batch-script boilerplate: module loads, environment
//! activation, device diagnostics, and the distributed-launch invocation
//! with worker count derived from the scheduler's accelerator reservation.

mod config;
mod pipeline;
mod script;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::error;

use gpurun_model::{JobContext, LogPattern};
use gpurun_observe::init_tracing;

use crate::config::RunConfig;

#[derive(Parser, Debug)]
#[command(name = "gpurun")]
#[command(version, about = "Launch a single-node distributed training job", long_about = None)]
struct Cli {
    /// Path to a JSON launch config; defaults reproduce the stock job.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the launch sequence (the default).
    Launch {
        /// Print the derived launcher invocation without running anything.
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the scheduler submission script wrapping this tool.
    BatchScript,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = RunConfig::load_or_default(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Launch { dry_run: false }) {
        Command::BatchScript => {
            print!(
                "{}",
                script::render_batch_script(&cfg.directives, cli.config.as_deref())
            );
            Ok(())
        }
        Command::Launch { dry_run } => {
            let ctx = JobContext::from_process();

            // Route the shim's own logs to the job-keyed file when the
            // config asks for one; scheduler escapes expand against the
            // injected job identity.
            let mut log = cfg.log.clone();
            if let Some(file) = &log.file {
                let pattern = LogPattern::new(file.to_string_lossy());
                log.file = Some(pattern.expand(&ctx));
            }
            init_tracing(&log)?;

            match pipeline::launch(&cfg, &ctx, dry_run).await {
                Ok(code) => std::process::exit(code),
                Err(e) => {
                    error!(error = %e, "launch aborted");
                    Err(e)
                }
            }
        }
    }
}
