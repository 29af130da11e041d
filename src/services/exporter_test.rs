#[cfg(test)]
mod exporter_tests {
    use std::collections::BTreeMap;
    use std::io::Write;

    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use chrono::Utc;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use uuid::Uuid;

    use crate::models::form::{FieldType, FormDefinition, FormField};
    use crate::models::submission::{DataValue, Submission};
    use crate::services::exporter::{export_all, export_audit_trail, export_filled_form};

    // Minimal RGBA PNG, enough for the embedded decoder. Chunk CRCs are
    // left zeroed since the decoder does not verify them.
    fn tiny_png(width: u32, height: u32) -> Vec<u8> {
        let mut raw = Vec::new();
        for _ in 0..height {
            raw.push(0u8); // filter: none
            for _ in 0..width {
                raw.extend_from_slice(&[0, 0, 0, 255]);
            }
        }
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw).expect("zlib encode");
        let idat = encoder.finish().expect("zlib encode");

        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&width.to_be_bytes());
        ihdr.extend_from_slice(&height.to_be_bytes());
        ihdr.extend_from_slice(&[8, 6, 0, 0, 0]); // depth 8, RGBA

        let mut png = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];
        for (name, body) in [(b"IHDR", ihdr), (b"IDAT", idat), (b"IEND", Vec::new())] {
            png.extend_from_slice(&(body.len() as u32).to_be_bytes());
            png.extend_from_slice(name);
            png.extend_from_slice(&body);
            png.extend_from_slice(&[0, 0, 0, 0]); // crc, unchecked
        }
        png
    }

    fn signature_data_url() -> String {
        format!(
            "data:image/png;base64,{}",
            BASE64.encode(tiny_png(4, 2))
        )
    }

    fn field(id: &str, field_type: FieldType, name: &str, label: &str) -> FormField {
        FormField {
            id: id.to_string(),
            field_type,
            name: name.to_string(),
            label: label.to_string(),
            placeholder: None,
        }
    }

    fn definition() -> FormDefinition {
        FormDefinition {
            id: Uuid::new_v4(),
            name: "Intake".to_string(),
            logo: Some("data:image/png;base64,iVBORw0KGgo=".to_string()),
            components: vec![
                field("f1", FieldType::FullName, "fullname", "Full Name"),
                field("f2", FieldType::Checkbox, "consent", "GDPR Consent"),
                field("f3", FieldType::Signature, "signature", "Signature"),
            ],
            submissions: 1,
            created_at: Utc::now(),
        }
    }

    fn submission(definition: &FormDefinition, signature: Option<String>) -> Submission {
        let mut data = BTreeMap::new();
        data.insert("f1firstName".to_string(), DataValue::Text("Ada".to_string()));
        data.insert(
            "f1lastName".to_string(),
            DataValue::Text("Lovelace".to_string()),
        );
        data.insert("gdprConsent".to_string(), DataValue::Flag(true));
        if let Some(signature) = signature {
            data.insert("signature".to_string(), DataValue::Text(signature));
        }
        Submission {
            id: Uuid::new_v4(),
            form_id: definition.id,
            date: Utc::now(),
            data,
            gdpr_consent: true,
            approved: false,
        }
    }

    #[test]
    fn test_filled_form_document() {
        let definition = definition();
        let submission = submission(&definition, Some(signature_data_url()));

        let artifact = export_filled_form(&definition, &submission);

        assert_eq!(
            artifact.file_name,
            format!("submission_{}.pdf", submission.id)
        );
        assert_eq!(artifact.content_type, "application/pdf");
        assert!(artifact.warnings.is_empty());
        assert!(artifact.bytes.starts_with(b"%PDF-1.4"));
        assert!(artifact.bytes.ends_with(b"%%EOF\n"));

        // Value lines carry resolved labels, not raw keys; the signature
        // data URL never appears as text
        let text = String::from_utf8_lossy(&artifact.bytes).into_owned();
        assert!(text.contains("Form Submission: Intake"));
        assert!(text.contains("Full Name (First Name): Ada"));
        assert!(text.contains("Full Name (Last Name): Lovelace"));
        assert!(text.contains("GDPR Consent: true"));
        assert!(!text.contains("Signature: data:image"));
        // The signature bitmap is embedded as an image object
        assert!(text.contains("/Im0 Do"));
    }

    #[test]
    fn test_filled_form_without_signature() {
        let definition = definition();
        let submission = submission(&definition, None);

        let artifact = export_filled_form(&definition, &submission);
        assert!(artifact.warnings.is_empty());

        let text = String::from_utf8_lossy(&artifact.bytes).into_owned();
        assert!(!text.contains("/Im0 Do"));
    }

    #[test]
    fn test_malformed_signature_degrades_to_warning() {
        let definition = definition();
        let submission = submission(
            &definition,
            Some("data:image/png;base64,not-valid-base64!!!".to_string()),
        );

        let artifact = export_filled_form(&definition, &submission);

        // The document is still produced, minus the image
        assert!(artifact.bytes.starts_with(b"%PDF-1.4"));
        assert_eq!(artifact.warnings.len(), 1);
        assert!(artifact.warnings[0].contains("signature image"));
    }

    #[test]
    fn test_truncated_png_degrades_to_warning() {
        let definition = definition();
        let mut png = tiny_png(4, 2);
        png.truncate(20);
        let submission = submission(
            &definition,
            Some(format!("data:image/png;base64,{}", BASE64.encode(&png))),
        );

        let artifact = export_filled_form(&definition, &submission);
        assert!(artifact.bytes.starts_with(b"%PDF-1.4"));
        assert_eq!(artifact.warnings.len(), 1);
    }

    #[test]
    fn test_audit_trail_document() {
        let definition = definition();
        let submission = submission(&definition, None);

        let artifact = export_audit_trail(&definition, &submission);

        assert_eq!(
            artifact.file_name,
            format!("audit_trail_{}.pdf", submission.id)
        );
        assert!(artifact.warnings.is_empty());
        assert!(artifact.bytes.starts_with(b"%PDF-1.4"));

        let text = String::from_utf8_lossy(&artifact.bytes).into_owned();
        assert!(text.contains("Audit Trail"));
        assert!(text.contains("Form Name: Intake"));
        assert!(text.contains("Form Created:"));
        assert!(text.contains("Form Accessed:"));
        assert!(text.contains("Form Submitted:"));
    }

    #[test]
    fn test_export_all_produces_both_documents() {
        let definition = definition();
        let submission = submission(&definition, Some(signature_data_url()));

        let artifacts = export_all(&definition, &submission);
        assert_eq!(artifacts.len(), 2);
        assert!(artifacts[0].file_name.starts_with("submission_"));
        assert!(artifacts[1].file_name.starts_with("audit_trail_"));
        for artifact in &artifacts {
            assert!(artifact.bytes.starts_with(b"%PDF-1.4"));
        }
    }

    #[test]
    fn test_unknown_key_falls_back_to_raw_name() {
        let definition = definition();
        let mut submission = submission(&definition, None);
        submission
            .data
            .insert("orphaned".to_string(), DataValue::Text("x".to_string()));

        let artifact = export_filled_form(&definition, &submission);
        let text = String::from_utf8_lossy(&artifact.bytes).into_owned();
        assert!(text.contains("orphaned: x"));
    }
}
