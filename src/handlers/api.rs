use axum::{
    extract::{Json as ExtractJson, Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::FormError;
use crate::models::common::{FormUrls, PaginationParams};
use crate::models::form::{FormDefinition, FormField};
use crate::models::submission::Submission;
use crate::services::exporter::{self, ExportArtifact};
use crate::services::form_store::FormStore;
use crate::services::renderer::{
    FormRenderer, PublishedForm, RenderedForm, SubmissionOutcome, SubmitMode,
};
use crate::services::submission_store::SubmissionStore;

// AppState struct containing shared resources
pub struct AppState {
    pub forms: FormStore,
    pub submissions: SubmissionStore,
    pub renderer: FormRenderer,
}

// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

#[derive(Debug, Deserialize)]
pub struct PublishFormRequest {
    pub name: String,
    pub logo: Option<String>,
    #[serde(default)]
    pub components: Vec<FormField>,
}

// Publish a composed form definition
pub async fn publish_form(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<PublishFormRequest>,
) -> Result<(StatusCode, Json<PublishedForm>), FormError> {
    info!(
        "Received request to publish form '{}' with {} fields",
        request.name,
        request.components.len()
    );

    let form = state
        .forms
        .publish(&request.name, request.logo, request.components)?;
    let urls = FormUrls::for_form(&form.id);

    Ok((StatusCode::CREATED, Json(PublishedForm { form, urls })))
}

// List form definitions, newest first
pub async fn list_forms(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<Vec<FormDefinition>>, FormError> {
    info!(
        "Received request to list forms with page={}, page_size={}",
        params.page, params.page_size
    );

    let forms = state.forms.list()?;
    let start = params.page.saturating_sub(1) * params.page_size;
    let page = forms
        .into_iter()
        .skip(start)
        .take(params.page_size)
        .collect();

    Ok(Json(page))
}

// Fetch a single form definition
pub async fn get_form(
    State(state): State<Arc<AppState>>,
    Path(form_id): Path<Uuid>,
) -> Result<Json<FormDefinition>, FormError> {
    info!("Received request to fetch form {}", form_id);
    Ok(Json(state.forms.get(&form_id)?))
}

// Delete a form definition (submissions are kept, documented policy)
pub async fn delete_form(
    State(state): State<Arc<AppState>>,
    Path(form_id): Path<Uuid>,
) -> Result<StatusCode, FormError> {
    info!("Received request to delete form {}", form_id);
    state.forms.remove(&form_id)?;
    Ok(StatusCode::NO_CONTENT)
}

// Fill-mode rendering: reconstruct the input surface from the schema
pub async fn render_form(
    State(state): State<Arc<AppState>>,
    Path(form_id): Path<Uuid>,
) -> Result<Json<RenderedForm>, FormError> {
    info!("Received request to render form {}", form_id);
    Ok(Json(state.renderer.render_form(&form_id)?))
}

#[derive(Debug, Deserialize)]
pub struct SubmitFormRequest {
    #[serde(default)]
    pub values: HashMap<String, Value>,
    #[serde(default)]
    pub mode: SubmitMode,
}

// Accept a filled-out form
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    Path(form_id): Path<Uuid>,
    ExtractJson(request): ExtractJson<SubmitFormRequest>,
) -> Result<(StatusCode, Json<SubmissionOutcome>), FormError> {
    info!(
        "Received submission for form {} with {} values",
        form_id,
        request.values.len()
    );

    let outcome = state
        .renderer
        .submit(&form_id, &request.values, request.mode)?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

// List submissions for a form, most recent first
pub async fn list_submissions(
    State(state): State<Arc<AppState>>,
    Path(form_id): Path<Uuid>,
) -> Result<Json<Vec<Submission>>, FormError> {
    info!("Received request to list submissions for form {}", form_id);
    Ok(Json(state.submissions.list_by_form(&form_id)?))
}

// Fetch a single submission
pub async fn get_submission(
    State(state): State<Arc<AppState>>,
    Path((form_id, submission_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Submission>, FormError> {
    info!(
        "Received request to fetch submission {} of form {}",
        submission_id, form_id
    );
    Ok(Json(state.submissions.get(&form_id, &submission_id)?))
}

// Download the filled-form document for a submission
pub async fn export_document(
    State(state): State<Arc<AppState>>,
    Path((form_id, submission_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, FormError> {
    info!(
        "Received request to export filled-form document for submission {}",
        submission_id
    );

    let definition = state.forms.get(&form_id)?;
    let submission = state.submissions.get(&form_id, &submission_id)?;
    let artifact = exporter::export_filled_form(&definition, &submission);

    Ok(artifact_response(artifact))
}

// Download the audit-trail document for a submission
pub async fn export_audit(
    State(state): State<Arc<AppState>>,
    Path((form_id, submission_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, FormError> {
    info!(
        "Received request to export audit trail for submission {}",
        submission_id
    );

    let definition = state.forms.get(&form_id)?;
    let submission = state.submissions.get(&form_id, &submission_id)?;
    let artifact = exporter::export_audit_trail(&definition, &submission);

    Ok(artifact_response(artifact))
}

fn artifact_response(artifact: ExportArtifact) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(artifact.content_type),
    );
    if let Ok(disposition) = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        artifact.file_name
    )) {
        headers.insert(header::CONTENT_DISPOSITION, disposition);
    }

    for warning in &artifact.warnings {
        warn!("Export warning for {}: {}", artifact.file_name, warning);
    }
    if let Some(first) = artifact.warnings.first() {
        if let Ok(value) = HeaderValue::from_str(first) {
            headers.insert("x-export-warning", value);
        }
    }

    (headers, artifact.bytes).into_response()
}
