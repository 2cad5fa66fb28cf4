//! Updater configuration file loader.
//!
//! The file is JSON with camelCase keys, matching the format the motherboard
//! list has always been kept in:
//!
//! ```json
//! {
//!   "downloadPath": "/srv/bios",
//!   "mqttTitle": "newBiosAlert",
//!   "mobos": [
//!     { "name": "X570", "currentVersion": 1105, "apiEndPoint": "https://..." }
//!   ],
//!   "broker": { "host": "mqtt://broker.lan", "username": "u", "password": "p" }
//! }
//! ```
//!
//! Every field is optional at decode time; [`validate_config`] decides what
//! is actually required.  Mobo entries stay untyped until the updater looks
//! at them, so one bad entry never rejects the whole file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};
use crate::mqtt;

// Defaults
const MQTT_PORT:         u16 = 1883;
const MQTTS_PORT:        u16 = 8883;
const HTTP_TIMEOUT_SECS: u64 = 60;

/// Configuration exactly as decoded from disk.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    pub download_path:     Option<String>,
    pub mqtt_title:        Option<String>,
    pub mobos:             Option<Vec<Value>>,
    pub broker:            Option<RawBroker>,
    pub http_timeout_secs: Option<u64>,
    pub log_syslog:        Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBroker {
    pub host:      Option<String>,
    pub port:      Option<u16>,
    pub username:  Option<String>,
    pub password:  Option<String>,
    pub client_id: Option<String>,
    pub tls:       Option<bool>,
}

/// Validated configuration, immutable for the run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory firmware archives are written to.  Must already exist.
    pub download_path: PathBuf,
    /// MQTT topic new-BIOS notifications are published on.
    pub mqtt_title: String,
    /// Mobo entries in configured order, still unvalidated.
    pub mobos: Vec<Value>,
    pub broker: BrokerConfig,
    /// Upper bound for every HTTP request.
    pub http_timeout: Duration,
    /// Send log records to syslog instead of stderr.
    pub log_syslog: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    pub host:      String,
    pub port:      u16,
    pub username:  String,
    pub password:  String,
    /// `None` lets the MQTT layer generate one.
    pub client_id: Option<String>,
    pub tls:       bool,
}

/// Read and decode `path` without validating it.
pub fn load_config(path: &Path) -> Result<RawConfig> {
    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("cannot parse {}: {e}", path.display())))
}

/// Check that every required field is present and build the typed config.
///
/// Required: `downloadPath`, `mqttTitle`, a non-empty `mobos` list and
/// `broker.host`, `broker.username`, `broker.password`.  The error names the
/// first missing field.
pub fn validate_config(raw: RawConfig) -> Result<Config> {
    let download_path = required(raw.download_path, "downloadPath")?;
    let mqtt_title    = required(raw.mqtt_title, "mqttTitle")?;
    if !mqtt::valid_topic(&mqtt_title) {
        return Err(Error::Config(format!("mqttTitle {mqtt_title:?} is not a valid topic name")));
    }

    let mobos = match raw.mobos {
        Some(m) if !m.is_empty() => m,
        _ => return Err(missing("mobos")),
    };

    let broker = raw.broker.ok_or_else(|| missing("broker"))?;
    let host     = required(broker.host, "broker.host")?;
    let username = required(broker.username, "broker.username")?;
    let password = required(broker.password, "broker.password")?;

    let (host, port, tls) = parse_broker_host(&host, broker.port, broker.tls)?;

    Ok(Config {
        download_path: PathBuf::from(download_path),
        mqtt_title,
        mobos,
        broker: BrokerConfig {
            host,
            port,
            username,
            password,
            client_id: broker.client_id.filter(|id| !id.trim().is_empty()),
            tls,
        },
        http_timeout: Duration::from_secs(raw.http_timeout_secs.unwrap_or(HTTP_TIMEOUT_SECS)),
        log_syslog:   raw.log_syslog.unwrap_or(false),
    })
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(missing(field)),
    }
}

fn missing(field: &str) -> Error {
    Error::Config(format!("{field} is required"))
}

/// Split `broker.host` into host, port and TLS flag.
///
/// Accepts a bare host name or an `mqtt://` / `mqtts://` URL.  An explicit
/// `broker.port` / `broker.tls` wins over what the URL implies.
fn parse_broker_host(
    host: &str,
    port: Option<u16>,
    tls:  Option<bool>,
) -> Result<(String, u16, bool)> {
    if !host.contains("://") {
        let tls = tls.unwrap_or(false);
        let default_port = if tls { MQTTS_PORT } else { MQTT_PORT };
        return Ok((host.trim().to_string(), port.unwrap_or(default_port), tls));
    }

    let url = Url::parse(host)
        .map_err(|e| Error::Config(format!("broker.host {host:?} is not a valid URL: {e}")))?;
    let url_tls = match url.scheme() {
        "mqtt" | "tcp"  => false,
        "mqtts" | "ssl" => true,
        other => {
            return Err(Error::Config(format!("broker.host: unsupported scheme {other:?}")));
        }
    };
    let tls = tls.unwrap_or(url_tls);
    let name = url
        .host_str()
        .ok_or_else(|| Error::Config(format!("broker.host {host:?} has no host")))?
        .to_string();
    let default_port = if tls { MQTTS_PORT } else { MQTT_PORT };
    let port = port.or(url.port()).unwrap_or(default_port);
    Ok((name, port, tls))
}
