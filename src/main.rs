//! Motherboard BIOS update checker.
//!
//! Asks the vendor support API for the newest BIOS of every configured
//! board, downloads archives that are newer than the flashed version and
//! announces them over MQTT.  Runs once and exits; schedule it with cron or
//! a systemd timer.
//!
//! Usage:
//!   bios-updater -c /etc/bios-updater/config.json
//!   bios-updater -c config.json --stderr --no-mqtt

mod api;
mod config;
mod console;
mod download;
mod error;
mod fetch;
mod mobo;
mod mqtt;
mod notes;
mod notify;
mod update;
mod updater;

use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::{error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::fetch::HttpFetcher;
use crate::notify::Publisher;
use crate::updater::{RunSummary, Updater};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "bios-updater", about = "Check, download and announce new motherboard BIOS releases")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short = 'c', long = "config", default_value = "config.json")]
    config: PathBuf,

    /// Log to stderr even if the config asks for syslog.
    #[arg(long)]
    stderr: bool,

    /// Do not connect to the MQTT broker; skip notifications.
    #[arg(long)]
    no_mqtt: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let cfg = match config::load_config(&cli.config).and_then(config::validate_config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("bios-updater: configuration is malformed: {e}");
            process::exit(1);
        }
    };

    let use_syslog = cfg.log_syslog && !cli.stderr;
    if let Err(e) = setup_logging(use_syslog) {
        eprintln!("bios-updater: logging setup failed: {e}");
        process::exit(1);
    }

    if !cfg.download_path.is_dir() {
        warn!(
            "download directory {} does not exist; downloads will fail",
            cfg.download_path.display()
        );
    }

    let started = chrono::Local::now();
    info!("bios-updater starting: {} mobo entries", cfg.mobos.len());

    match run(&cfg, !cli.no_mqtt).await {
        Ok(summary) => {
            let secs = (chrono::Local::now() - started).num_seconds();
            println!("Finished in {secs}s: {summary}");
            info!("finished in {secs}s: {summary}");
        }
        Err(e) => {
            error!("{e}");
            eprintln!("bios-updater: {e}");
            process::exit(1);
        }
    }
}

/// One full pass.  The MQTT connection, if any, is opened first and closed
/// once every mobo has been checked.
async fn run(cfg: &Config, use_mqtt: bool) -> Result<RunSummary> {
    let fetcher = HttpFetcher::new(cfg.http_timeout)?;

    let channel = if use_mqtt {
        Some(mqtt::connect(&cfg.broker).await?)
    } else {
        info!("MQTT disabled; no notifications will be sent");
        None
    };

    let publisher = channel.as_ref().map(|c| c as &dyn Publisher);
    let summary = Updater::new(cfg, &fetcher, publisher).run().await;

    if let Some(channel) = channel {
        channel.close().await?;
    }
    Ok(summary)
}

// ── Logging setup ─────────────────────────────────────────────────────────────

fn setup_logging(use_syslog: bool) -> anyhow::Result<()> {
    if use_syslog {
        let formatter = syslog::Formatter3164 {
            facility: syslog::Facility::LOG_DAEMON,
            hostname: None,
            process:  "bios-updater".into(),
            pid:      process::id(),
        };
        let logger = syslog::unix(formatter)
            .map_err(|e| anyhow::anyhow!("syslog connect failed: {e}"))?;
        log::set_boxed_logger(Box::new(syslog::BasicLogger::new(logger)))
            .map(|()| log::set_max_level(log::LevelFilter::Info))
            .map_err(|e| anyhow::anyhow!("set_logger: {e}"))?;
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init()?;
    }
    Ok(())
}
