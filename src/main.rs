//! Tor ACL synchronizer CLI.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tor_acl_sync::{run_pass, Config, PassOptions};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tor-acl-sync")]
#[command(about = "Synchronize a managed edge ACL with the published Tor exit node list")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "tor-acl-sync.yaml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'L', long, default_value = "info")]
    log_level: String,

    /// Compute deltas but do not modify the ACL
    #[arg(long)]
    dry_run: bool,

    /// Allow an empty desired set to delete every ACL entry
    #[arg(long)]
    force: bool,

    /// Print example configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Handle --print-config
    if args.print_config {
        println!("{}", Config::example());
        return Ok(ExitCode::SUCCESS);
    }

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    // Load configuration
    info!(config = %args.config.display(), "Loading configuration");
    let config = Config::load(&args.config)?;

    // Handle --validate
    if args.validate {
        info!("Configuration is valid");
        return Ok(ExitCode::SUCCESS);
    }

    let options = PassOptions {
        dry_run: args.dry_run,
        force: args.force,
    };

    let report = run_pass(&config, options).await?;

    // Per-chunk summary
    if let Some(ref apply) = report.apply {
        for chunk in &apply.chunks {
            match &chunk.error {
                None => info!(
                    batch = chunk.index + 1,
                    creates = chunk.creates,
                    deletes = chunk.deletes,
                    "Batch applied"
                ),
                Some(e) => error!(
                    batch = chunk.index + 1,
                    creates = chunk.creates,
                    deletes = chunk.deletes,
                    error = %e,
                    "Batch failed"
                ),
            }
        }
    }

    // Final status line
    if report.is_success() {
        info!(
            desired = report.desired,
            current = report.current,
            creates = report.creates,
            deletes = report.deletes,
            "ACL synchronization complete"
        );
        Ok(ExitCode::SUCCESS)
    } else {
        let apply = report.apply.as_ref().map(|a| (a.succeeded(), a.failed()));
        error!(
            succeeded = apply.map(|a| a.0).unwrap_or(0),
            failed = apply.map(|a| a.1).unwrap_or(0),
            "ACL synchronization finished with failed batches; rerun to retry"
        );
        Ok(ExitCode::FAILURE)
    }
}
