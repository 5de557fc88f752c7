use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};

use reviewwatch::{connect, logging, CycleOutcome, Settings};

#[derive(Parser, Debug)]
#[command(name = "reviewwatch")]
#[command(about = "Sends a Telegram message whenever a homework review status changes")]
struct Args {
    /// Path to a TOML settings file (default: reviewwatch.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seconds between polls, overriding the configured value
    #[arg(short, long)]
    interval: Option<u64>,

    /// Directory for the rotating log file
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Initial cursor as Unix seconds (0 returns every homework)
    #[arg(long)]
    from_date: Option<u64>,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // A missing .env is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(interval) = args.interval {
        settings.retry_secs = interval;
    }
    if let Some(log_dir) = args.log_dir {
        settings.log_dir = log_dir;
    }
    if args.from_date.is_some() {
        settings.from_date = args.from_date;
    }
    settings.validate()?;

    let _guard = logging::init(&settings.log_dir)?;

    let mut poll = connect(&settings).inspect_err(|err| error!("refusing to start: {err:#}"))?;

    if args.once {
        return match poll.run_cycle().await {
            CycleOutcome::Accepted { sent } => {
                info!(sent, "cycle accepted");
                Ok(())
            }
            CycleOutcome::Incomplete {
                sent,
                undelivered,
                rejected,
            } => {
                bail!(
                    "{undelivered} notification(s) not delivered and {rejected} unknown status(es) ({sent} sent)"
                )
            }
            CycleOutcome::Failed(err) => Err(err.into()),
        };
    }

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown requested, finishing current cycle");
        let _ = stop_tx.send(true);
    });

    poll.run(stop_rx).await;
    Ok(())
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
