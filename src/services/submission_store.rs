use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::errors::FormError;
use crate::models::submission::Submission;
use crate::services::form_store::form_key;
use crate::services::storage::{Store, StoreError};

pub fn submission_key(form_id: &Uuid, submission_id: &Uuid) -> String {
    format!("{}_submission_{}", form_id, submission_id)
}

fn submission_prefix(form_id: &Uuid) -> String {
    format!("{}_submission_", form_id)
}

/// Persistence and lookup of submission records, keyed by
/// `(form id, submission id)`.
#[derive(Clone)]
pub struct SubmissionStore {
    store: Arc<dyn Store>,
}

impl SubmissionStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        SubmissionStore { store }
    }

    /// Persist a submission. The referenced form definition must exist at
    /// write time; capacity exhaustion is propagated, never papered over
    /// with eviction.
    pub fn create(&self, submission: Submission) -> Result<Submission, FormError> {
        if self.store.get(&form_key(&submission.form_id))?.is_none() {
            return Err(FormError::validation_fields(
                format!("submission references unknown form {}", submission.form_id),
                vec!["formId".to_string()],
            ));
        }

        let raw = serde_json::to_string(&submission)
            .map_err(|e| FormError::Storage(format!("failed to serialize submission: {}", e)))?;

        match self
            .store
            .set(&submission_key(&submission.form_id, &submission.id), &raw)
        {
            Ok(()) => {}
            Err(StoreError::CapacityExceeded) => return Err(FormError::StorageExhausted),
            Err(e) => return Err(e.into()),
        }

        info!(
            "Stored submission {} for form {}",
            submission.id, submission.form_id
        );

        Ok(submission)
    }

    /// All submissions for a form, most recent first (descending `date`).
    pub fn list_by_form(&self, form_id: &Uuid) -> Result<Vec<Submission>, FormError> {
        let prefix = submission_prefix(form_id);
        let mut submissions = Vec::new();
        for key in self.store.keys()? {
            if !key.starts_with(&prefix) {
                continue;
            }
            match self.store.get(&key)? {
                Some(raw) => submissions.push(parse_submission(&raw)?),
                None => continue,
            }
        }
        submissions.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(submissions)
    }

    pub fn get(&self, form_id: &Uuid, submission_id: &Uuid) -> Result<Submission, FormError> {
        match self.store.get(&submission_key(form_id, submission_id))? {
            Some(raw) => parse_submission(&raw),
            None => Err(FormError::not_found("submission", submission_id.to_string())),
        }
    }

    /// Roll back a submission that was persisted but whose counter bump
    /// failed, so no partial write survives.
    pub fn discard(&self, form_id: &Uuid, submission_id: &Uuid) -> Result<(), FormError> {
        self.store
            .delete(&submission_key(form_id, submission_id))?;
        Ok(())
    }
}

fn parse_submission(raw: &str) -> Result<Submission, FormError> {
    serde_json::from_str(raw)
        .map_err(|e| FormError::Storage(format!("failed to parse submission record: {}", e)))
}
