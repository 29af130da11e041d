use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The field types an operator can place on a form.
///
/// Each tag fixes the shape of the submitted value and the widget the
/// renderer mounts for it. Adding a type means adding one registry entry
/// plus one renderer case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldType {
    Text,
    Textarea,
    Checkbox,
    FullName,
    Address,
    Signature,
}

// One schema entry. The id is minted when the field is placed on the
// canvas and stays stable for the lifetime of the definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormField {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub name: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// A published form schema. Immutable after publish apart from the
/// submission counter; field order is render order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    pub id: Uuid,
    pub name: String,
    pub logo: Option<String>,
    pub components: Vec<FormField>,
    pub submissions: u64,
    pub created_at: DateTime<Utc>,
}
