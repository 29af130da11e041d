use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::FormError;
use crate::models::form::{FormDefinition, FormField};
use crate::services::registry;
use crate::services::storage::{Store, StoreError};

const FORM_KEY_PREFIX: &str = "form_";

pub fn form_key(id: &Uuid) -> String {
    format!("{}{}", FORM_KEY_PREFIX, id)
}

/// Persistence and lookup of form definitions.
///
/// Definitions are frozen at publish time and keyed by `form_{id}`. When
/// the backing store runs out of room, the oldest definitions are evicted
/// one at a time until the write fits; submissions are never evicted.
#[derive(Clone)]
pub struct FormStore {
    store: Arc<dyn Store>,
}

impl FormStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        FormStore { store }
    }

    /// Freeze the field sequence into a new published definition.
    ///
    /// Validates the form name, the logo (required, must be an image data
    /// URL), field id uniqueness, and that no two fields derive the same
    /// submission key — a collision would silently overwrite one field's
    /// submitted value with the other's.
    pub fn publish(
        &self,
        name: &str,
        logo: Option<String>,
        fields: Vec<FormField>,
    ) -> Result<FormDefinition, FormError> {
        if name.trim().is_empty() {
            return Err(FormError::validation_fields(
                "form name is required",
                vec!["name".to_string()],
            ));
        }

        let logo = match logo {
            Some(l) if l.starts_with("data:image/") => Some(l),
            Some(_) => {
                return Err(FormError::validation_fields(
                    "logo must be an image data URL",
                    vec!["logo".to_string()],
                ))
            }
            None => {
                return Err(FormError::validation_fields(
                    "logo is required",
                    vec!["logo".to_string()],
                ))
            }
        };

        validate_unique_ids(&fields)?;
        validate_derived_keys(&fields)?;

        let definition = FormDefinition {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            logo,
            components: fields,
            submissions: 0,
            created_at: Utc::now(),
        };

        self.write_with_eviction(&definition)?;

        info!(
            "Published form '{}' ({}) with {} fields",
            definition.name,
            definition.id,
            definition.components.len()
        );

        Ok(definition)
    }

    pub fn get(&self, id: &Uuid) -> Result<FormDefinition, FormError> {
        match self.store.get(&form_key(id)) {
            Ok(Some(raw)) => parse_definition(&raw),
            Ok(None) => Err(FormError::not_found("form", id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// All stored definitions, newest first (descending `createdAt`).
    pub fn list(&self) -> Result<Vec<FormDefinition>, FormError> {
        let mut forms = Vec::new();
        for key in self.store.keys()? {
            if !key.starts_with(FORM_KEY_PREFIX) {
                continue;
            }
            match self.store.get(&key)? {
                Some(raw) => forms.push(parse_definition(&raw)?),
                None => continue,
            }
        }
        forms.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(forms)
    }

    /// Delete a definition. Submissions are deliberately left in place:
    /// they may outlive their definition, and operators are told so.
    pub fn remove(&self, id: &Uuid) -> Result<(), FormError> {
        if self.store.get(&form_key(id))?.is_none() {
            return Err(FormError::not_found("form", id.to_string()));
        }
        self.store.delete(&form_key(id))?;
        info!("Removed form definition {}", id);
        Ok(())
    }

    /// Bump a definition's submission counter by one. A missing id is
    /// logged and ignored so the submission itself is unaffected.
    pub fn increment_submission_count(&self, id: &Uuid) -> Result<(), FormError> {
        let mut definition = match self.store.get(&form_key(id))? {
            Some(raw) => parse_definition(&raw)?,
            None => {
                warn!("Submission counter bump for missing form {}, ignoring", id);
                return Ok(());
            }
        };

        definition.submissions += 1;
        let raw = serialize_definition(&definition)?;
        self.store.set(&form_key(id), &raw)?;
        Ok(())
    }

    // Retry the write after evicting the oldest definition, until it
    // lands or nothing is left to evict.
    fn write_with_eviction(&self, definition: &FormDefinition) -> Result<(), FormError> {
        let key = form_key(&definition.id);
        let raw = serialize_definition(definition)?;

        loop {
            match self.store.set(&key, &raw) {
                Ok(()) => return Ok(()),
                Err(StoreError::CapacityExceeded) => {
                    let mut existing = self.list()?;
                    existing.retain(|f| f.id != definition.id);
                    let oldest = match existing.pop() {
                        Some(f) => f,
                        None => return Err(FormError::StorageExhausted),
                    };
                    warn!(
                        "Storage full, evicting oldest form '{}' ({}) from {}",
                        oldest.name, oldest.id, oldest.created_at
                    );
                    self.store.delete(&form_key(&oldest.id))?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn validate_unique_ids(fields: &[FormField]) -> Result<(), FormError> {
    let mut seen = HashMap::new();
    let mut duplicates = Vec::new();
    for field in fields {
        if seen.insert(field.id.as_str(), ()).is_some() {
            duplicates.push(field.id.clone());
        }
    }
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(FormError::validation_fields(
            "duplicate field ids",
            duplicates,
        ))
    }
}

fn validate_derived_keys(fields: &[FormField]) -> Result<(), FormError> {
    let mut owners: HashMap<String, &str> = HashMap::new();
    let mut colliding = Vec::new();
    for field in fields {
        for key in registry::derived_keys(field) {
            if let Some(first) = owners.insert(key.clone(), &field.id) {
                colliding.push(first.to_string());
                colliding.push(field.id.clone());
            }
        }
    }
    if colliding.is_empty() {
        Ok(())
    } else {
        colliding.dedup();
        Err(FormError::validation_fields(
            "fields derive colliding submission keys",
            colliding,
        ))
    }
}

fn serialize_definition(definition: &FormDefinition) -> Result<String, FormError> {
    serde_json::to_string(definition)
        .map_err(|e| FormError::Storage(format!("failed to serialize form record: {}", e)))
}

fn parse_definition(raw: &str) -> Result<FormDefinition, FormError> {
    serde_json::from_str(raw)
        .map_err(|e| FormError::Storage(format!("failed to parse form record: {}", e)))
}
