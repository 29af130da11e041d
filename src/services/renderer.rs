use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::FormError;
use crate::models::common::FormUrls;
use crate::models::form::{FieldType, FormDefinition, FormField};
use crate::models::submission::{DataValue, Submission};
use crate::services::form_store::FormStore;
use crate::services::registry::{self, ValueShape};
use crate::services::reorder::FieldSequence;
use crate::services::submission_store::SubmissionStore;

/// Palette templates the compose canvas offers. Placing one clones the
/// template and mints a fresh field id.
pub fn palette() -> Vec<FormField> {
    vec![
        FormField {
            id: "text-1".to_string(),
            field_type: FieldType::Text,
            name: "text".to_string(),
            label: "Text".to_string(),
            placeholder: Some("Enter text...".to_string()),
        },
        FormField {
            id: "textarea-1".to_string(),
            field_type: FieldType::Textarea,
            name: "textarea".to_string(),
            label: "Long Text".to_string(),
            placeholder: Some("Enter text...".to_string()),
        },
        FormField {
            id: "fullname-1".to_string(),
            field_type: FieldType::FullName,
            name: "fullname".to_string(),
            label: "Full Name".to_string(),
            placeholder: Some("Enter your full name...".to_string()),
        },
        FormField {
            id: "checkbox-1".to_string(),
            field_type: FieldType::Checkbox,
            name: "consent-checkbox".to_string(),
            label: "GDPR Consent".to_string(),
            placeholder: None,
        },
        FormField {
            id: "address-1".to_string(),
            field_type: FieldType::Address,
            name: "address".to_string(),
            label: "Address".to_string(),
            placeholder: None,
        },
        FormField {
            id: "signature-1".to_string(),
            field_type: FieldType::Signature,
            name: "signature".to_string(),
            label: "Signature".to_string(),
            placeholder: None,
        },
    ]
}

/// Pre-publish scratch state for the compose canvas: form metadata plus
/// the reorderable field sequence. Lives entirely in the operator's
/// session and is not shared.
#[derive(Debug, Default)]
pub struct BuilderSession {
    pub name: String,
    pub logo: Option<String>,
    sequence: FieldSequence,
}

/// A published definition plus the links handed back to the operator.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedForm {
    pub form: FormDefinition,
    pub urls: FormUrls,
}

impl BuilderSession {
    pub fn new() -> Self {
        BuilderSession::default()
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    pub fn set_logo(&mut self, logo: Option<String>) {
        self.logo = logo;
    }

    pub fn add_field(&mut self, template: &FormField) -> FormField {
        self.sequence.insert_from_palette(template)
    }

    pub fn move_field(&mut self, current: usize, target: usize) -> Result<(), FormError> {
        self.sequence.move_item(current, target)
    }

    pub fn remove_field(&mut self, index: usize) -> Result<FormField, FormError> {
        self.sequence.remove_item(index)
    }

    pub fn fields(&self) -> &[FormField] {
        self.sequence.fields()
    }

    /// Commit the session through the form definition store.
    pub fn publish(self, forms: &FormStore) -> Result<PublishedForm, FormError> {
        let definition = forms.publish(&self.name, self.logo, self.sequence.into_fields())?;
        let urls = FormUrls::for_form(&definition.id);
        Ok(PublishedForm {
            form: definition,
            urls,
        })
    }
}

/// The input widget mounted for a field in fill mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Widget {
    TextInput,
    TextArea,
    ConsentCheckbox,
    LinkedTextInputs,
    AddressGroup,
    SignaturePad,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedInput {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedField {
    #[serde(flatten)]
    pub field: FormField,
    pub widget: Widget,
    pub required: bool,
    pub inputs: Vec<RenderedInput>,
}

/// A live input form reconstructed purely from a stored schema.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedForm {
    pub form_id: Uuid,
    pub name: String,
    pub logo: Option<String>,
    pub fields: Vec<RenderedField>,
}

/// Reconstruct the fill-mode input surface from a definition: one widget
/// per field in sequence order, with the submission keys each input
/// writes to.
pub fn render(definition: &FormDefinition) -> RenderedForm {
    let fields = definition
        .components
        .iter()
        .map(|field| {
            let descriptor = registry::describe(field.field_type);
            let widget = match field.field_type {
                FieldType::Text => Widget::TextInput,
                FieldType::Textarea => Widget::TextArea,
                FieldType::Checkbox => Widget::ConsentCheckbox,
                FieldType::FullName => Widget::LinkedTextInputs,
                FieldType::Address => Widget::AddressGroup,
                FieldType::Signature => Widget::SignaturePad,
            };
            let inputs = if descriptor.is_composite {
                registry::derived_keys(field)
                    .into_iter()
                    .zip(registry::subfields(field.field_type))
                    .map(|(key, (_, label))| RenderedInput {
                        key,
                        label: label.to_string(),
                    })
                    .collect()
            } else {
                vec![RenderedInput {
                    key: registry::derived_keys(field).remove(0),
                    label: field.label.clone(),
                }]
            };
            RenderedField {
                field: field.clone(),
                widget,
                required: registry::is_required(field.field_type),
                inputs,
            }
        })
        .collect();

    RenderedForm {
        form_id: definition.id,
        name: definition.name.clone(),
        logo: definition.logo.clone(),
        fields,
    }
}

/// A submitted value narrowed to the shape its field type declares.
/// The match in `normalize` is exhaustive, so a new field type cannot
/// be added without deciding its normalization rule.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    LongText(String),
    Consent(bool),
    FullName {
        first: String,
        last: String,
    },
    Address {
        country: String,
        state: String,
        city: String,
        address: String,
        zip_code: String,
    },
    Signature(String),
}

/// Normalize one field's raw submitted values into its typed shape.
pub fn normalize(field: &FormField, raw: &HashMap<String, Value>) -> FieldValue {
    let keys = registry::derived_keys(field);
    let text_at = |i: usize| coerce_text(raw.get(keys[i].as_str()));

    match registry::describe(field.field_type).value_shape {
        ValueShape::SingleLine => FieldValue::Text(text_at(0)),
        ValueShape::MultiLine => FieldValue::LongText(text_at(0)),
        ValueShape::Boolean => FieldValue::Consent(coerce_flag(raw.get(keys[0].as_str()))),
        ValueShape::NameParts => FieldValue::FullName {
            first: text_at(0),
            last: text_at(1),
        },
        ValueShape::AddressParts => FieldValue::Address {
            country: text_at(0),
            state: text_at(1),
            city: text_at(2),
            address: text_at(3),
            zip_code: text_at(4),
        },
        ValueShape::ImageDataUrl => {
            // An untouched canvas collapses to an empty string
            let value = text_at(0);
            if value.starts_with("data:image/") {
                FieldValue::Signature(value)
            } else {
                FieldValue::Signature(String::new())
            }
        }
    }
}

fn coerce_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

fn coerce_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => matches!(s.as_str(), "true" | "on" | "1"),
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    }
}

fn flatten(field: &FormField, value: FieldValue, data: &mut BTreeMap<String, DataValue>) {
    let keys = registry::derived_keys(field);
    match value {
        FieldValue::Text(s) | FieldValue::LongText(s) => {
            data.insert(keys[0].clone(), DataValue::Text(s));
        }
        FieldValue::Consent(b) => {
            data.insert(keys[0].clone(), DataValue::Flag(b));
        }
        FieldValue::FullName { first, last } => {
            data.insert(keys[0].clone(), DataValue::Text(first));
            data.insert(keys[1].clone(), DataValue::Text(last));
        }
        FieldValue::Address {
            country,
            state,
            city,
            address,
            zip_code,
        } => {
            let parts = [country, state, city, address, zip_code];
            for (key, part) in keys.iter().zip(parts) {
                data.insert(key.clone(), DataValue::Text(part));
            }
        }
        FieldValue::Signature(s) => {
            if !s.is_empty() {
                data.insert(keys[0].clone(), DataValue::Text(s));
            }
        }
    }
}

/// Who is filling the form, which decides what happens after a
/// successful submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitMode {
    PublicFill,
    InternalReview,
}

impl Default for SubmitMode {
    fn default() -> Self {
        SubmitMode::PublicFill
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "action", content = "url")]
pub enum PostSubmitAction {
    ResetForm,
    RedirectToSubmissions(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub submission: Submission,
    #[serde(flatten)]
    pub next: PostSubmitAction,
}

/// Fill-mode submission pipeline over the two stores.
#[derive(Clone)]
pub struct FormRenderer {
    forms: FormStore,
    submissions: SubmissionStore,
}

impl FormRenderer {
    pub fn new(forms: FormStore, submissions: SubmissionStore) -> Self {
        FormRenderer { forms, submissions }
    }

    /// Load a definition and reconstruct its input surface.
    pub fn render_form(&self, form_id: &Uuid) -> Result<RenderedForm, FormError> {
        let definition = self.forms.get(form_id)?;
        Ok(render(&definition))
    }

    /// Collect, validate, and normalize raw submitted values, persist the
    /// submission, and bump the definition's counter.
    ///
    /// A counter bump that fails rolls the stored submission back so the
    /// counter invariant holds: no increment without a persisted
    /// submission and vice versa.
    pub fn submit(
        &self,
        form_id: &Uuid,
        raw: &HashMap<String, Value>,
        mode: SubmitMode,
    ) -> Result<SubmissionOutcome, FormError> {
        let definition = self.forms.get(form_id)?;

        let missing = missing_required_fields(&definition, raw);
        if !missing.is_empty() {
            return Err(FormError::validation_fields(
                "missing required fields",
                missing,
            ));
        }

        let mut data = BTreeMap::new();
        let mut gdpr_consent = false;
        for field in &definition.components {
            let value = normalize(field, raw);
            if let FieldValue::Consent(true) = value {
                gdpr_consent = true;
            }
            flatten(field, value, &mut data);
        }

        let submission = Submission {
            id: Uuid::new_v4(),
            form_id: definition.id,
            date: Utc::now(),
            data,
            gdpr_consent,
            approved: false,
        };

        let submission = self.submissions.create(submission)?;

        if let Err(e) = self.forms.increment_submission_count(&definition.id) {
            error!(
                "Counter bump failed for form {}, rolling back submission {}: {}",
                definition.id, submission.id, e
            );
            self.submissions.discard(&definition.id, &submission.id)?;
            return Err(e);
        }

        info!(
            "Accepted submission {} for form '{}' ({})",
            submission.id, definition.name, definition.id
        );

        let next = match mode {
            SubmitMode::PublicFill => PostSubmitAction::ResetForm,
            SubmitMode::InternalReview => PostSubmitAction::RedirectToSubmissions(
                FormUrls::for_form(&definition.id).submissions_url,
            ),
        };

        Ok(SubmissionOutcome { submission, next })
    }
}

fn missing_required_fields(definition: &FormDefinition, raw: &HashMap<String, Value>) -> Vec<String> {
    let mut missing = Vec::new();
    for field in &definition.components {
        if !registry::is_required(field.field_type) {
            continue;
        }
        let incomplete = registry::derived_keys(field)
            .iter()
            .any(|key| coerce_text(raw.get(key.as_str())).trim().is_empty());
        if incomplete {
            missing.push(field.id.clone());
        }
    }
    missing
}
