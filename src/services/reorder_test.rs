#[cfg(test)]
mod reorder_tests {
    use std::collections::HashSet;

    use crate::errors::FormError;
    use crate::models::form::{FieldType, FormField};
    use crate::services::renderer::palette;
    use crate::services::reorder::FieldSequence;

    fn template(field_type: FieldType, name: &str) -> FormField {
        FormField {
            id: format!("{}-template", name),
            field_type,
            name: name.to_string(),
            label: name.to_string(),
            placeholder: None,
        }
    }

    #[test]
    fn test_insert_mints_fresh_ids() {
        let mut sequence = FieldSequence::new();
        let text = template(FieldType::Text, "text");

        let first = sequence.insert_from_palette(&text);
        let second = sequence.insert_from_palette(&text);

        assert_ne!(first.id, text.id);
        assert_ne!(first.id, second.id);
        assert_eq!(first.field_type, FieldType::Text);
        assert_eq!(sequence.len(), 2);
    }

    #[test]
    fn test_insert_places_at_head() {
        let mut sequence = FieldSequence::new();
        let a = sequence.insert_from_palette(&template(FieldType::Text, "a"));
        let b = sequence.insert_from_palette(&template(FieldType::Checkbox, "b"));

        // Newest placement is on top of the canvas
        assert_eq!(sequence.fields()[0].id, b.id);
        assert_eq!(sequence.fields()[1].id, a.id);
    }

    #[test]
    fn test_move_item_reorders_and_preserves_rest() {
        let mut sequence = FieldSequence::new();
        let mut ids = Vec::new();
        for name in ["a", "b", "c", "d"] {
            ids.insert(0, sequence.insert_from_palette(&template(FieldType::Text, name)).id);
        }
        // Sequence is now d, c, b, a reading head-first; ids is head-first too
        let before: Vec<String> = sequence.fields().iter().map(|f| f.id.clone()).collect();

        sequence.move_item(0, 2).unwrap();

        let after: Vec<String> = sequence.fields().iter().map(|f| f.id.clone()).collect();
        assert_eq!(after[2], before[0]);
        // Untouched elements keep their relative order
        assert_eq!(after[0], before[1]);
        assert_eq!(after[1], before[2]);
        assert_eq!(after[3], before[3]);
    }

    #[test]
    fn test_move_item_same_index_is_noop() {
        let mut sequence = FieldSequence::new();
        for name in ["a", "b", "c"] {
            sequence.insert_from_palette(&template(FieldType::Text, name));
        }
        let before: Vec<String> = sequence.fields().iter().map(|f| f.id.clone()).collect();

        sequence.move_item(1, 1).unwrap();

        let after: Vec<String> = sequence.fields().iter().map(|f| f.id.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_move_item_out_of_range() {
        let mut sequence = FieldSequence::new();
        sequence.insert_from_palette(&template(FieldType::Text, "a"));

        let err = sequence.move_item(0, 1).unwrap_err();
        assert!(matches!(err, FormError::IndexOutOfRange { index: 1, len: 1 }));

        let err = sequence.move_item(5, 0).unwrap_err();
        assert!(matches!(err, FormError::IndexOutOfRange { index: 5, len: 1 }));
    }

    #[test]
    fn test_remove_item_returns_element() {
        let mut sequence = FieldSequence::new();
        sequence.insert_from_palette(&template(FieldType::Text, "a"));
        let top = sequence.insert_from_palette(&template(FieldType::Signature, "b"));

        let removed = sequence.remove_item(0).unwrap();
        assert_eq!(removed.id, top.id);
        assert_eq!(sequence.len(), 1);

        let err = sequence.remove_item(1).unwrap_err();
        assert!(matches!(err, FormError::IndexOutOfRange { index: 1, len: 1 }));
    }

    #[test]
    fn test_no_duplicate_ids_after_mixed_operations() {
        let mut sequence = FieldSequence::new();
        let templates = palette();

        for template in templates.iter().cycle().take(12) {
            sequence.insert_from_palette(template);
        }
        sequence.move_item(0, 7).unwrap();
        sequence.move_item(11, 3).unwrap();
        sequence.remove_item(5).unwrap();
        sequence.insert_from_palette(&templates[0]);

        let ids: HashSet<String> = sequence.fields().iter().map(|f| f.id.clone()).collect();
        assert_eq!(ids.len(), sequence.len());
        assert_eq!(sequence.len(), 12);
    }

    #[test]
    fn test_from_fields_rejects_duplicate_ids() {
        let mut a = template(FieldType::Text, "a");
        let mut b = template(FieldType::Text, "b");
        a.id = "same".to_string();
        b.id = "same".to_string();

        let err = FieldSequence::from_fields(vec![a, b]).unwrap_err();
        assert!(matches!(err, FormError::Validation { .. }));
    }
}
