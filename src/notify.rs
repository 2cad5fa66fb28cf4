//! New-BIOS notifications.
//!
//! Payload (JSON, `schema` bumps on incompatible changes):
//!
//! ```json
//! { "schema": 1,
//!   "mobo":     { "name": "X570", "currentVersion": 1105, "apiEndPoint": "..." },
//!   "lastBios": { "version": "1203", "title": "...", "releaseDate": "...",
//!                 "fileSize": "...", "downloadUrl": "...", "filePath": "...",
//!                 "description": "plain text", "htmlDescription": "<p>...</p>",
//!                 "notes": ["..."] },
//!   "checkedAt": "2020-05-14T08:00:00+00:00" }
//! ```

use std::path::Path;

use async_trait::async_trait;
use log::info;
use serde::Serialize;

use crate::api::Bios;
use crate::error::Result;
use crate::mobo::Mobo;
use crate::notes;

pub const SCHEMA_VERSION: u32 = 1;

/// A message channel notifications can be published on.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification<'a> {
    pub schema:     u32,
    pub mobo:       &'a Mobo,
    pub last_bios:  BiosPayload<'a>,
    pub checked_at: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BiosPayload<'a> {
    pub version:          &'a str,
    pub title:            &'a str,
    pub release_date:     &'a str,
    pub file_size:        &'a str,
    pub download_url:     &'a str,
    pub file_path:        String,
    pub description:      String,
    pub html_description: &'a str,
    pub notes:            Vec<String>,
}

impl<'a> Notification<'a> {
    pub fn new(mobo: &'a Mobo, bios: &'a Bios, file_path: &Path) -> Self {
        Notification {
            schema: SCHEMA_VERSION,
            mobo,
            last_bios: BiosPayload {
                version:          &bios.version,
                title:            &bios.title,
                release_date:     &bios.release_date,
                file_size:        &bios.file_size,
                download_url:     &bios.download_url,
                file_path:        file_path.display().to_string(),
                description:      notes::plain_description(&bios.description),
                html_description: &bios.description,
                notes:            notes::notes(&bios.description),
            },
            checked_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Publish a new-BIOS notification for `mobo` on `topic`.
pub async fn notify(
    publisher: &dyn Publisher,
    topic:     &str,
    mobo:      &Mobo,
    bios:      &Bios,
    file_path: &Path,
) -> Result<()> {
    let payload = Notification::new(mobo, bios, file_path).to_json()?;
    publisher.publish(topic, payload).await?;
    info!("notified {topic}: {} BIOS {}", mobo.name, bios.version);
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::fake::RecordingPublisher;
    use super::*;
    use serde_json::{json, Value};

    fn fixture() -> (Mobo, Bios) {
        let mobo = Mobo {
            name:            "X570".into(),
            current_version: 1105,
            api_end_point:   "http://api/x570".into(),
        };
        let bios = Bios {
            version:      "1203".into(),
            file_size:    "9.4 MBytes".into(),
            title:        "ROG STRIX X570-E GAMING BIOS 1203".into(),
            release_date: "2020/05/12".into(),
            description:  "<p>Improve  system stability.</p><p>Support M.2 RAID.</p>".into(),
            download_url: "http://cdn/X570-1203.zip".into(),
        };
        (mobo, bios)
    }

    #[test]
    fn payload_shape() {
        let (mobo, bios) = fixture();
        let bytes = Notification::new(&mobo, &bios, Path::new("/srv/bios/X570-1203.zip"))
            .to_json()
            .unwrap();
        let v: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(v["schema"], json!(1));
        assert_eq!(v["mobo"], json!({
            "name": "X570", "currentVersion": 1105, "apiEndPoint": "http://api/x570"
        }));
        let last = &v["lastBios"];
        assert_eq!(last["version"], "1203");
        assert_eq!(last["title"], "ROG STRIX X570-E GAMING BIOS 1203");
        assert_eq!(last["filePath"], "/srv/bios/X570-1203.zip");
        assert_eq!(last["description"], "Improve system stability.Support M.2 RAID.");
        assert_eq!(last["htmlDescription"], bios.description.as_str());
        assert_eq!(last["notes"], json!(["Improve system stability", "Support M2 RAID"]));
        assert!(v["checkedAt"].as_str().is_some_and(|s| !s.is_empty()));
    }

    #[tokio::test]
    async fn notify_publishes_on_topic() {
        let (mobo, bios) = fixture();
        let publisher = RecordingPublisher::default();
        notify(&publisher, "newBiosAlert", &mobo, &bios, Path::new("/tmp/x.zip"))
            .await
            .unwrap();

        let messages = publisher.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, "newBiosAlert");
    }

    #[tokio::test]
    async fn publish_failure_is_reported() {
        let (mobo, bios) = fixture();
        let publisher = RecordingPublisher::failing();
        assert!(notify(&publisher, "t", &mobo, &bios, Path::new("/tmp/x.zip")).await.is_err());
        assert_eq!(publisher.count(), 0);
    }
}
