//! The update check: one pass over every configured mobo.
//!
//! Per mobo:
//!   1. Validate the config entry (skip if malformed)
//!   2. Ask the vendor API for the newest BIOS (skip if the answer is unusable)
//!   3. Compare versions; stop here if up to date
//!   4. Report, download the archive if missing, publish a notification
//!
//! Only a bad config stops a run, and that is caught before an `Updater`
//! exists.  Everything here is contained per mobo: failures are logged and
//! the loop moves on.

use std::fmt;

use log::{error, info, warn};

use crate::api::Bios;
use crate::config::Config;
use crate::console;
use crate::download;
use crate::error::Result;
use crate::fetch::Fetcher;
use crate::mobo::Mobo;
use crate::notify::{self, Publisher};
use crate::update::{self, UpdateStatus};

/// Per-run counters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Entries that failed validation.
    pub malformed:         usize,
    /// Mobos the vendor API was asked about.
    pub checked:           usize,
    /// API answers that could not be used.
    pub api_failures:      usize,
    pub up_to_date:        usize,
    pub updates:           usize,
    pub downloaded:        usize,
    pub download_failures: usize,
    pub notified:          usize,
    pub notify_failures:   usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} checked, {} up to date, {} with updates ({} downloaded, {} download errors), \
             {} notified ({} failed), {} malformed, {} API errors",
            self.checked,
            self.up_to_date,
            self.updates,
            self.downloaded,
            self.download_failures,
            self.notified,
            self.notify_failures,
            self.malformed,
            self.api_failures,
        )
    }
}

pub struct Updater<'a> {
    cfg:       &'a Config,
    fetcher:   &'a dyn Fetcher,
    publisher: Option<&'a dyn Publisher>,
}

impl<'a> Updater<'a> {
    /// `publisher` is optional; without one no notifications are sent.
    pub fn new(cfg: &'a Config, fetcher: &'a dyn Fetcher, publisher: Option<&'a dyn Publisher>) -> Self {
        Updater { cfg, fetcher, publisher }
    }

    /// Check every configured mobo, in order.
    pub async fn run(&self) -> RunSummary {
        let mut summary = RunSummary::default();

        for (idx, entry) in self.cfg.mobos.iter().enumerate() {
            let mobo = match Mobo::from_entry(entry) {
                Ok(m) => m,
                Err(e) => {
                    warn!("malformed mobo entry #{idx}: {e}");
                    console::failure(&format!("Malformed mobo entry #{idx}: {e}"));
                    summary.malformed += 1;
                    continue;
                }
            };
            self.check(&mobo, &mut summary).await;
        }

        summary
    }

    async fn check(&self, mobo: &Mobo, summary: &mut RunSummary) {
        summary.checked += 1;

        let bios = match self.latest_bios(mobo).await {
            Ok(b) => b,
            Err(e) => {
                error!("fetching BIOS information for {} failed: {e}", mobo.name);
                console::failure(&format!(
                    "Something went wrong fetching the BIOS information for {}",
                    mobo.name
                ));
                summary.api_failures += 1;
                return;
            }
        };

        if update::evaluate(mobo.current_version, &bios.version) == UpdateStatus::UpToDate {
            info!("{} BIOS {} is up to date (latest {})", mobo.name, mobo.current_version, bios.version);
            console::up_to_date(mobo);
            summary.up_to_date += 1;
            return;
        }

        info!("{} BIOS {} → {} available", mobo.name, mobo.current_version, bios.version);
        summary.updates += 1;

        let path = download::file_path(&self.cfg.download_path, mobo, &bios);
        console::new_bios(mobo, &bios, &path);

        match download::download_if_missing(self.fetcher, &path, &bios).await {
            Ok(true)  => summary.downloaded += 1,
            Ok(false) => {}
            Err(e) => {
                error!("downloading BIOS for {} failed: {e}; mobo={mobo:?} bios={bios:?}", mobo.name);
                console::failure("Something went wrong fetching a BIOS");
                summary.download_failures += 1;
            }
        }

        if let Some(publisher) = self.publisher {
            match notify::notify(publisher, &self.cfg.mqtt_title, mobo, &bios, &path).await {
                Ok(()) => summary.notified += 1,
                Err(e) => {
                    error!("notifying {} about {} failed: {e}", self.cfg.mqtt_title, mobo.name);
                    summary.notify_failures += 1;
                }
            }
        }
    }

    async fn latest_bios(&self, mobo: &Mobo) -> Result<Bios> {
        let resp = self.fetcher.get_json(&mobo.api_end_point).await?;
        Bios::from_response(&resp)
    }
}
