use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::models::form::FormDefinition;
use crate::models::submission::Submission;
use crate::services::pdf::{decode_png, Document, Page};
use crate::services::registry::{self, SIGNATURE_KEY};

/// One downloadable document produced by an export action.
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    pub warnings: Vec<String>,
}

/// Render the filled-form document: form name, submission timestamp, one
/// line per non-signature value, then the signature bitmap.
///
/// A malformed signature image degrades to a warning; the document is
/// still produced without it.
pub fn export_filled_form(definition: &FormDefinition, submission: &Submission) -> ExportArtifact {
    let mut page = Page::default();
    let mut warnings = Vec::new();

    page.draw_text(
        50.0,
        800.0,
        20.0,
        &format!("Form Submission: {}", definition.name),
    );
    page.draw_text(
        50.0,
        750.0,
        12.0,
        &format!("Submitted on: {}", format_time(&submission.date)),
    );

    let mut y = 700.0;
    for (key, value) in &submission.data {
        if key == SIGNATURE_KEY {
            continue;
        }
        let line = format!("{}: {}", label_for_key(definition, key), value);
        page.draw_text(50.0, y, 12.0, &line);
        y -= 20.0;
    }

    if let Some(data_url) = submission.signature_image() {
        match decode_signature(data_url) {
            Ok(image) => page.draw_image(image, 50.0, y - 100.0, 200.0, 100.0),
            Err(e) => {
                warn!(
                    "Skipping signature image for submission {}: {}",
                    submission.id, e
                );
                warnings.push(format!("signature image could not be embedded: {}", e));
            }
        }
    }

    let mut doc = Document::new();
    doc.add_page(page);

    info!(
        "Generated filled-form document for submission {}",
        submission.id
    );

    ExportArtifact {
        file_name: format!("submission_{}.pdf", submission.id),
        content_type: "application/pdf",
        bytes: doc.save(),
        warnings,
    }
}

/// Render the audit-trail document: form name, creation time, accessed
/// time, and submission time, in fixed order. Access time is not tracked
/// separately, so the submission time stands in for it.
pub fn export_audit_trail(definition: &FormDefinition, submission: &Submission) -> ExportArtifact {
    let mut page = Page::default();

    page.draw_text(50.0, 800.0, 20.0, "Audit Trail");

    let entries = [
        format!("Form Name: {}", definition.name),
        format!("Form Created: {}", format_time(&definition.created_at)),
        format!("Form Accessed: {}", format_time(&submission.date)),
        format!("Form Submitted: {}", format_time(&submission.date)),
    ];
    for (index, entry) in entries.iter().enumerate() {
        page.draw_text(50.0, 750.0 - (index as f64 * 30.0), 12.0, entry);
    }

    let mut doc = Document::new();
    doc.add_page(page);

    info!(
        "Generated audit-trail document for submission {}",
        submission.id
    );

    ExportArtifact {
        file_name: format!("audit_trail_{}.pdf", submission.id),
        content_type: "application/pdf",
        bytes: doc.save(),
        warnings: Vec::new(),
    }
}

/// Produce both artifacts. A degraded artifact (for example a skipped
/// signature image) never aborts its sibling.
pub fn export_all(definition: &FormDefinition, submission: &Submission) -> Vec<ExportArtifact> {
    vec![
        export_filled_form(definition, submission),
        export_audit_trail(definition, submission),
    ]
}

// Resolve a data-map key back to an operator-facing label using the
// schema the submission was captured against.
fn label_for_key(definition: &FormDefinition, key: &str) -> String {
    for field in &definition.components {
        let descriptor = registry::describe(field.field_type);
        let keys = registry::derived_keys(field);
        if descriptor.is_composite {
            for (derived, (_, sublabel)) in keys.iter().zip(registry::subfields(field.field_type)) {
                if derived == key {
                    return format!("{} ({})", field.label, sublabel);
                }
            }
        } else if keys[0] == key {
            return field.label.clone();
        }
    }
    key.to_string()
}

fn decode_signature(data_url: &str) -> Result<crate::services::pdf::PdfImage, String> {
    let payload = decode_data_url(data_url)?;
    decode_png(&payload)
}

fn decode_data_url(url: &str) -> Result<Vec<u8>, String> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| "not a data URL".to_string())?;
    let (metadata, payload) = rest
        .split_once(',')
        .ok_or_else(|| "malformed data URL".to_string())?;
    if !metadata.ends_with(";base64") {
        return Err("data URL is not base64 encoded".to_string());
    }
    BASE64
        .decode(payload)
        .map_err(|e| format!("invalid base64 payload: {}", e))
}

fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
