#[cfg(test)]
mod serde_tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use serde_json::{json, Value};
    use uuid::Uuid;

    use crate::models::form::{FieldType, FormDefinition, FormField};
    use crate::models::submission::{DataValue, Submission};

    #[test]
    fn test_field_type_wire_tags() {
        for (variant, tag) in [
            (FieldType::Text, "\"text\""),
            (FieldType::Textarea, "\"textarea\""),
            (FieldType::Checkbox, "\"checkbox\""),
            (FieldType::FullName, "\"fullName\""),
            (FieldType::Address, "\"address\""),
            (FieldType::Signature, "\"signature\""),
        ] {
            assert_eq!(serde_json::to_string(&variant).unwrap(), tag);
            let parsed: FieldType = serde_json::from_str(tag).unwrap();
            assert_eq!(parsed, variant);
        }
    }

    #[test]
    fn test_form_field_uses_type_key() {
        let field = FormField {
            id: "f1".to_string(),
            field_type: FieldType::FullName,
            name: "fullname".to_string(),
            label: "Full Name".to_string(),
            placeholder: None,
        };

        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["type"], json!("fullName"));
        assert_eq!(value["label"], json!("Full Name"));
        // Absent placeholder is omitted entirely, matching stored payloads
        assert!(value.get("placeholder").is_none());

        let parsed: FormField = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, field);
    }

    #[test]
    fn test_form_definition_wire_keys() {
        let definition = FormDefinition {
            id: Uuid::new_v4(),
            name: "Intake".to_string(),
            logo: Some("data:image/png;base64,iVBORw0KGgo=".to_string()),
            components: vec![FormField {
                id: "f1".to_string(),
                field_type: FieldType::Text,
                name: "email".to_string(),
                label: "Email".to_string(),
                placeholder: Some("Enter text...".to_string()),
            }],
            submissions: 3,
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&definition).unwrap();
        assert!(value.get("components").is_some());
        assert_eq!(value["submissions"], json!(3));
        assert!(value.get("createdAt").is_some());
        assert!(value.get("created_at").is_none());

        let parsed: FormDefinition = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, definition);
    }

    #[test]
    fn test_data_value_is_untagged() {
        assert_eq!(
            serde_json::to_value(&DataValue::Flag(true)).unwrap(),
            json!(true)
        );
        assert_eq!(
            serde_json::to_value(&DataValue::Text("Ada".to_string())).unwrap(),
            json!("Ada")
        );

        let flag: DataValue = serde_json::from_value(json!(false)).unwrap();
        assert_eq!(flag, DataValue::Flag(false));
        let text: DataValue = serde_json::from_value(json!("true")).unwrap();
        assert_eq!(text, DataValue::Text("true".to_string()));
    }

    #[test]
    fn test_submission_wire_keys() {
        let mut data = BTreeMap::new();
        data.insert("f1firstName".to_string(), DataValue::Text("Ada".to_string()));
        data.insert("gdprConsent".to_string(), DataValue::Flag(true));
        let submission = Submission {
            id: Uuid::new_v4(),
            form_id: Uuid::new_v4(),
            date: Utc::now(),
            data,
            gdpr_consent: true,
            approved: false,
        };

        let value = serde_json::to_value(&submission).unwrap();
        assert!(value.get("formId").is_some());
        assert!(value.get("gdprConsent").is_some());
        assert_eq!(value["data"]["f1firstName"], json!("Ada"));
        assert_eq!(value["data"]["gdprConsent"], json!(true));

        let parsed: Submission = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, submission);
    }

    #[test]
    fn test_submission_approved_defaults_to_false() {
        // Records captured before moderation existed have no approved key
        let raw: Value = json!({
            "id": Uuid::new_v4(),
            "formId": Uuid::new_v4(),
            "date": Utc::now(),
            "data": { "email": "ada@example.com" },
            "gdprConsent": true
        });

        let parsed: Submission = serde_json::from_value(raw).unwrap();
        assert!(!parsed.approved);
        assert_eq!(
            parsed.data.get("email"),
            Some(&DataValue::Text("ada@example.com".to_string()))
        );
    }
}
