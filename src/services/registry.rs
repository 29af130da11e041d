use crate::models::form::{FieldType, FormField};

/// Reserved data-map key written by checkbox fields (consent capture).
pub const GDPR_CONSENT_KEY: &str = "gdprConsent";

/// Reserved data-map key written by signature fields.
pub const SIGNATURE_KEY: &str = "signature";

/// The shape of the value a field type produces on submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    SingleLine,
    MultiLine,
    Boolean,
    NameParts,
    AddressParts,
    ImageDataUrl,
}

/// Rendering contract for a field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub value_shape: ValueShape,
    pub is_composite: bool,
    pub requires_canvas: bool,
}

/// Describe a field type's rendering contract and value shape.
///
/// Pure and stateless; the renderer uses this to decide which widget(s)
/// to mount and which normalization rule applies.
pub fn describe(field_type: FieldType) -> FieldDescriptor {
    match field_type {
        FieldType::Text => FieldDescriptor {
            value_shape: ValueShape::SingleLine,
            is_composite: false,
            requires_canvas: false,
        },
        FieldType::Textarea => FieldDescriptor {
            value_shape: ValueShape::MultiLine,
            is_composite: false,
            requires_canvas: false,
        },
        FieldType::Checkbox => FieldDescriptor {
            value_shape: ValueShape::Boolean,
            is_composite: false,
            requires_canvas: false,
        },
        FieldType::FullName => FieldDescriptor {
            value_shape: ValueShape::NameParts,
            is_composite: true,
            requires_canvas: false,
        },
        FieldType::Address => FieldDescriptor {
            value_shape: ValueShape::AddressParts,
            is_composite: true,
            requires_canvas: false,
        },
        FieldType::Signature => FieldDescriptor {
            value_shape: ValueShape::ImageDataUrl,
            is_composite: false,
            requires_canvas: true,
        },
    }
}

/// Subfield suffix and human label pairs for composite field types.
/// Empty for simple types.
pub fn subfields(field_type: FieldType) -> &'static [(&'static str, &'static str)] {
    match field_type {
        FieldType::FullName => &[("firstName", "First Name"), ("lastName", "Last Name")],
        FieldType::Address => &[
            ("country", "Country"),
            ("state", "State/Region"),
            ("city", "City"),
            ("address", "Address"),
            ("zipCode", "Zip/Code"),
        ],
        _ => &[],
    }
}

/// The submission keys a field writes, in render order.
///
/// Composite types derive `{field.id}{suffix}` keys. Checkbox and
/// signature fields write the reserved `gdprConsent` and `signature`
/// keys; two fields colliding on a key is rejected at publish time.
pub fn derived_keys(field: &FormField) -> Vec<String> {
    let descriptor = describe(field.field_type);
    if descriptor.is_composite {
        return subfields(field.field_type)
            .iter()
            .map(|(suffix, _)| format!("{}{}", field.id, suffix))
            .collect();
    }
    match field.field_type {
        FieldType::Checkbox => vec![GDPR_CONSENT_KEY.to_string()],
        FieldType::Signature => vec![SIGNATURE_KEY.to_string()],
        _ => vec![field.name.clone()],
    }
}

/// Whether a field must carry a non-empty value for the submission to be
/// accepted. Consent defaults to false and an untouched signature pad is
/// allowed to stay empty.
pub fn is_required(field_type: FieldType) -> bool {
    !matches!(field_type, FieldType::Checkbox | FieldType::Signature)
}
