use tracing::{debug, error};
use uuid::Uuid;

use crate::errors::FormError;
use crate::models::form::FormField;

/// Ordered sequence of form fields backing the compose canvas.
///
/// This is a logical-reorder engine: the drag-and-drop UI is an external
/// collaborator that calls these operations in response to pointer events.
/// After any successful operation the sequence has no duplicate ids and
/// the relative order of untouched elements is preserved.
#[derive(Debug, Default, Clone)]
pub struct FieldSequence {
    fields: Vec<FormField>,
}

impl FieldSequence {
    pub fn new() -> Self {
        FieldSequence { fields: Vec::new() }
    }

    /// Rebuild a sequence from existing fields (the re-edit flow).
    /// Fails if the fields carry duplicate ids.
    pub fn from_fields(fields: Vec<FormField>) -> Result<Self, FormError> {
        let mut seen = std::collections::HashSet::new();
        for field in &fields {
            if !seen.insert(field.id.as_str()) {
                return Err(FormError::validation_fields(
                    format!("duplicate field id {}", field.id),
                    vec![field.id.clone()],
                ));
            }
        }
        Ok(FieldSequence { fields })
    }

    /// Clone a palette template, mint a fresh unique id, and insert at
    /// the head of the sequence (new fields appear on top of the canvas).
    pub fn insert_from_palette(&mut self, template: &FormField) -> FormField {
        let mut field = template.clone();
        field.id = self.mint_id();
        debug!(
            "placed {:?} field {} at head of sequence",
            field.field_type, field.id
        );
        self.fields.insert(0, field.clone());
        field
    }

    /// Remove the element at `current` and reinsert it at `target`.
    /// A no-op when the indices are equal.
    pub fn move_item(&mut self, current: usize, target: usize) -> Result<(), FormError> {
        let len = self.fields.len();
        if current >= len {
            error!("move_item called with out-of-range index {} (len {})", current, len);
            return Err(FormError::IndexOutOfRange { index: current, len });
        }
        if target >= len {
            error!("move_item called with out-of-range index {} (len {})", target, len);
            return Err(FormError::IndexOutOfRange { index: target, len });
        }
        if current == target {
            return Ok(());
        }
        let field = self.fields.remove(current);
        self.fields.insert(target, field);
        Ok(())
    }

    /// Remove and return the element at `index`.
    pub fn remove_item(&mut self, index: usize) -> Result<FormField, FormError> {
        let len = self.fields.len();
        if index >= len {
            error!("remove_item called with out-of-range index {} (len {})", index, len);
            return Err(FormError::IndexOutOfRange { index, len });
        }
        Ok(self.fields.remove(index))
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_fields(self) -> Vec<FormField> {
        self.fields
    }

    // Ids must never collide with anything already in the sequence.
    fn mint_id(&self) -> String {
        loop {
            let candidate = Uuid::new_v4().simple().to_string();
            if !self.fields.iter().any(|f| f.id == candidate) {
                return candidate;
            }
        }
    }
}
