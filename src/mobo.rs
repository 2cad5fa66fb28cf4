//! Configured motherboards.

use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};

/// A motherboard tracked for BIOS updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mobo {
    pub name: String,
    /// BIOS version currently flashed, as recorded in the config.
    pub current_version: u64,
    /// Vendor support API URL for this board.
    pub api_end_point: String,
}

impl Mobo {
    /// Build a mobo from one raw config entry.
    ///
    /// The entry must be an object with a non-empty `name`, a non-empty
    /// `apiEndPoint` and a non-zero `currentVersion`.  The version may be a
    /// JSON integer or a string holding one.
    pub fn from_entry(entry: &Value) -> Result<Self> {
        let obj = entry
            .as_object()
            .ok_or_else(|| Error::Device("entry is not an object".into()))?;

        let name = non_empty_str(obj.get("name"))
            .ok_or_else(|| Error::Device("name is missing".into()))?;

        let current_version = match obj.get("currentVersion") {
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
        .filter(|v| *v != 0)
        .ok_or_else(|| Error::Device(format!("{name}: currentVersion is missing or invalid")))?;

        let api_end_point = non_empty_str(obj.get("apiEndPoint"))
            .ok_or_else(|| Error::Device(format!("{name}: apiEndPoint is missing")))?;

        Ok(Mobo { name, current_version, api_end_point })
    }
}

fn non_empty_str(v: Option<&Value>) -> Option<String> {
    match v {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}
