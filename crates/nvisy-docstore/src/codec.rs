//! Conversion between fieldsets and backend attributes.

use nvisy_simpledb::Attribute;

use crate::field::{FieldValue, Fieldset};

/// Encodes a fieldset as one attribute per field, tagged with `identifier`.
///
/// `Null` fields encode to an attribute without values.
pub fn encode(identifier: &str, fieldset: &Fieldset) -> Vec<Attribute> {
    fieldset
        .iter()
        .map(|(name, value)| Attribute::new(identifier, name.as_str(), value.clone().into_values()))
        .collect()
}

/// Decodes attributes into a fieldset. A later attribute with the same name
/// replaces an earlier one.
pub fn decode(attributes: Vec<Attribute>) -> Fieldset {
    attributes
        .into_iter()
        .map(|attribute| (attribute.name, FieldValue::from_values(attribute.values)))
        .collect()
}
