//! MQTT message channel for new-BIOS notifications.
//!
//! One connection per run: [`connect`] waits for the broker's CONNACK, a
//! background task drives the event loop while the updater publishes, and
//! [`MqttChannel::close`] disconnects and waits for queued publishes to go
//! out.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use rumqttc::{
    AsyncClient, ConnectReturnCode, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS, Transport,
};
use tokio::task::JoinHandle;

use crate::config::BrokerConfig;
use crate::error::{Error, Result};
use crate::notify::Publisher;

const KEEP_ALIVE:       Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT:  Duration = Duration::from_secs(15);
const CLOSE_TIMEOUT:    Duration = Duration::from_secs(10);
const REQUEST_CAPACITY: usize    = 16;

pub struct MqttChannel {
    client: AsyncClient,
    driver: JoinHandle<()>,
}

/// `bios-updater-` plus eight random hex digits.
fn default_client_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("bios-updater-{}", &id[..8])
}

/// Topics we publish on must not carry subscription wildcards.
pub fn valid_topic(topic: &str) -> bool {
    !topic.is_empty() && !topic.contains(['+', '#', '\0'])
}

/// Connect to the broker and wait until it accepts the session.
pub async fn connect(broker: &BrokerConfig) -> Result<MqttChannel> {
    let client_id = broker.client_id.clone().unwrap_or_else(default_client_id);
    let mut opts = MqttOptions::new(&client_id, &broker.host, broker.port);
    opts.set_credentials(&broker.username, &broker.password);
    opts.set_keep_alive(KEEP_ALIVE);
    if broker.tls {
        opts.set_transport(Transport::tls_with_default_config());
    }

    let (client, mut event_loop) = AsyncClient::new(opts, REQUEST_CAPACITY);

    info!(
        "MQTT: connecting to {}:{} as {client_id}{}",
        broker.host,
        broker.port,
        if broker.tls { " (TLS)" } else { "" }
    );
    tokio::time::timeout(CONNECT_TIMEOUT, wait_for_connack(&mut event_loop))
        .await
        .map_err(|_| {
            Error::Mqtt(format!(
                "no CONNACK from {}:{} within {}s",
                broker.host,
                broker.port,
                CONNECT_TIMEOUT.as_secs()
            ))
        })??;
    info!("MQTT: connected");

    let driver = tokio::spawn(drive(event_loop));
    Ok(MqttChannel { client, driver })
}

async fn wait_for_connack(event_loop: &mut EventLoop) -> Result<()> {
    loop {
        if let Event::Incoming(Packet::ConnAck(ack)) = event_loop.poll().await? {
            return match ack.code {
                ConnectReturnCode::Success => Ok(()),
                code => Err(Error::Mqtt(format!("broker refused connection: {code:?}"))),
            };
        }
    }
}

/// Poll until our DISCONNECT has been written or the connection drops.
async fn drive(mut event_loop: EventLoop) {
    loop {
        match event_loop.poll().await {
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                debug!("MQTT: disconnect sent");
                break;
            }
            Ok(event) => debug!("MQTT: {event:?}"),
            Err(e) => {
                warn!("MQTT: connection lost: {e}");
                break;
            }
        }
    }
}

impl MqttChannel {
    /// Disconnect, flushing anything still queued.
    pub async fn close(self) -> Result<()> {
        self.client.disconnect().await?;
        match tokio::time::timeout(CLOSE_TIMEOUT, self.driver).await {
            Ok(Ok(())) => info!("MQTT: closed"),
            Ok(Err(e)) => warn!("MQTT: event loop task failed: {e}"),
            Err(_)     => warn!("MQTT: close timed out after {}s", CLOSE_TIMEOUT.as_secs()),
        }
        Ok(())
    }
}

#[async_trait]
impl Publisher for MqttChannel {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        self.client
            .publish(topic, QoS::AtLeastOnce, false, payload)
            .await?;
        Ok(())
    }
}
