//! Error types for the BIOS updater.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("MQTT client: {0}")]
    MqttClient(#[from] rumqttc::ClientError),

    #[error("MQTT connection: {0}")]
    MqttConnection(#[from] rumqttc::ConnectionError),

    #[error("MQTT: {0}")]
    Mqtt(String),

    #[error("Config: {0}")]
    Config(String),

    /// A configured mobo entry is unusable; the entry is skipped.
    #[error("Device: {0}")]
    Device(String),

    /// The vendor API answered with something we cannot extract a BIOS from.
    #[error("API: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, Error>;
