use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single normalized value in a submission's data map.
///
/// Submitted payloads are narrowed per field type before they land here,
/// so the map only ever holds strings and booleans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Flag(bool),
    Text(String),
}

impl DataValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DataValue::Text(s) => Some(s),
            DataValue::Flag(_) => None,
        }
    }

}

impl std::fmt::Display for DataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataValue::Flag(b) => write!(f, "{}", b),
            DataValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One filled-out instance of a form definition.
///
/// References its definition by id only; a submission may outlive the
/// definition's deletion, which is an accepted and documented risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: Uuid,
    pub form_id: Uuid,
    pub date: DateTime<Utc>,
    pub data: BTreeMap<String, DataValue>,
    pub gdpr_consent: bool,
    #[serde(default)]
    pub approved: bool,
}

impl Submission {
    /// The captured signature image as a data URL, if one was drawn.
    pub fn signature_image(&self) -> Option<&str> {
        self.data
            .get(crate::services::registry::SIGNATURE_KEY)
            .and_then(|v| v.as_text())
            .filter(|s| !s.is_empty())
    }
}
