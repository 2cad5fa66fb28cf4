//! Vendor support API response handling.
//!
//! The API answers with an envelope like
//!
//! ```json
//! { "Status": "SUCCESS",
//!   "Result": { "Obj": [ { "Files": [ { "Version": "1203", "FileSize": "9.4 MBytes",
//!       "Title": "...", "ReleaseDate": "2020/05/12", "Description": "<p>...</p>",
//!       "DownloadUrl": { "Global": "https://..." } } ] } ] } }
//! ```
//!
//! Only `Result.Obj[0].Files[0]` matters: it is the newest BIOS.  The payload
//! is untrusted, so it is decoded as a plain [`Value`] and every link of the
//! chain is checked before a [`Bios`] is built.

use serde_json::Value;

use crate::error::{Error, Result};

const STATUS_SUCCESS: &str = "SUCCESS";

/// The newest BIOS file the vendor offers for a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bios {
    /// Version as published; compared numerically by the update check.
    pub version:      String,
    /// Human readable size, e.g. "9.4 MBytes".
    pub file_size:    String,
    pub title:        String,
    pub release_date: String,
    /// Raw description, may contain HTML.
    pub description:  String,
    /// `DownloadUrl.Global`.
    pub download_url: String,
}

impl Bios {
    /// Extract the newest BIOS from a vendor API response.
    ///
    /// Fails with [`Error::Api`] naming the first missing link when the
    /// status is not `SUCCESS` or any of `Version`, `FileSize`,
    /// `Description`, `DownloadUrl`, `DownloadUrl.Global` is absent or empty.
    /// `Title` and `ReleaseDate` are informational and default to empty.
    pub fn from_response(resp: &Value) -> Result<Self> {
        if resp.get("Status").and_then(Value::as_str) != Some(STATUS_SUCCESS) {
            return Err(Error::Api(format!(
                "Status is {}, expected {STATUS_SUCCESS}",
                resp.get("Status").unwrap_or(&Value::Null)
            )));
        }

        let result = member(resp, "Result", "Result")?;
        let objs   = member(result, "Obj", "Result.Obj")?;
        let obj    = element(objs, "Result.Obj[0]")?;
        let files  = member(obj, "Files", "Result.Obj[0].Files")?;
        let file   = element(files, "Result.Obj[0].Files[0]")?;

        let version     = member(file, "Version", "Result.Obj[0].Files[0].Version")?;
        let file_size   = member(file, "FileSize", "Result.Obj[0].Files[0].FileSize")?;
        let description = member(file, "Description", "Result.Obj[0].Files[0].Description")?;
        let url         = member(file, "DownloadUrl", "Result.Obj[0].Files[0].DownloadUrl")?;
        let global      = member(url, "Global", "Result.Obj[0].Files[0].DownloadUrl.Global")?;

        Ok(Bios {
            version:      text(version),
            file_size:    text(file_size),
            title:        file.get("Title").map(text).unwrap_or_default(),
            release_date: file.get("ReleaseDate").map(text).unwrap_or_default(),
            description:  text(description),
            download_url: text(global),
        })
    }
}

fn member<'a>(v: &'a Value, key: &str, path: &str) -> Result<&'a Value> {
    v.get(key)
        .filter(|m| present(m))
        .ok_or_else(|| Error::Api(format!("{path} is missing")))
}

fn element<'a>(v: &'a Value, path: &str) -> Result<&'a Value> {
    v.as_array()
        .and_then(|a| a.first())
        .filter(|m| present(m))
        .ok_or_else(|| Error::Api(format!("{path} is missing")))
}

/// Presence in the loose sense the API needs: null, `false`, `0` and `""`
/// all count as absent.
fn present(v: &Value) -> bool {
    match v {
        Value::Null                     => false,
        Value::Bool(b)                  => *b,
        Value::Number(n)                => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s)                => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other            => other.to_string(),
    }
}
