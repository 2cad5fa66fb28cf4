//! HTTP access to the vendor API and firmware downloads.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;

use crate::error::{Error, Result};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Everything the updater needs from the network.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url` and decode the body as JSON.  The HTTP status is not
    /// inspected; the caller validates the document itself.
    async fn get_json(&self, url: &str) -> Result<Value>;

    /// GET `url` as raw bytes.  Non-2xx responses are errors.
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`Fetcher`] backed by a shared `reqwest` client.
pub struct HttpFetcher {
    http: Client,
}

impl HttpFetcher {
    /// Every request made through this fetcher is bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(Error::Http)?;
        Ok(HttpFetcher { http })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get_json(&self, url: &str) -> Result<Value> {
        let resp = self.http.get(url).send().await?;
        debug!("GET {url} → {}", resp.status());
        Ok(resp.json::<Value>().await?)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self.http.get(url).send().await?.error_for_status()?;
        let bytes = resp.bytes().await?;
        debug!("GET {url} → {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::HashMap;
    use std::io;
    use std::sync::Mutex;

    use super::*;

    /// In-memory [`Fetcher`] that records every request.
    #[derive(Default)]
    pub(crate) struct FakeFetcher {
        json:  HashMap<String, Value>,
        bytes: HashMap<String, Vec<u8>>,
        pub(crate) json_requests:  Mutex<Vec<String>>,
        pub(crate) bytes_requests: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        pub(crate) fn with_json(mut self, url: &str, body: Value) -> Self {
            self.json.insert(url.to_string(), body);
            self
        }

        pub(crate) fn with_bytes(mut self, url: &str, body: &[u8]) -> Self {
            self.bytes.insert(url.to_string(), body.to_vec());
            self
        }

        pub(crate) fn json_count(&self) -> usize {
            self.json_requests.lock().unwrap().len()
        }

        pub(crate) fn download_count(&self) -> usize {
            self.bytes_requests.lock().unwrap().len()
        }
    }

    fn not_found(url: &str) -> Error {
        Error::Io(io::Error::new(io::ErrorKind::NotFound, format!("no route for {url}")))
    }

    #[async_trait]
    impl Fetcher for FakeFetcher {
        async fn get_json(&self, url: &str) -> Result<Value> {
            self.json_requests.lock().unwrap().push(url.to_string());
            self.json.get(url).cloned().ok_or_else(|| not_found(url))
        }

        async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
            self.bytes_requests.lock().unwrap().push(url.to_string());
            self.bytes.get(url).cloned().ok_or_else(|| not_found(url))
        }
    }
}
