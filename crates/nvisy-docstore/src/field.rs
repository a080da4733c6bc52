//! Field values and fieldsets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Ordered mapping of field names to values.
pub type Fieldset = BTreeMap<String, FieldValue>;

/// Value of a single document field.
///
/// Serializes as `null`, a string, or a list of strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// No value.
    #[default]
    Null,
    /// Exactly one value.
    Single(String),
    /// Several values, in order.
    Multi(Vec<String>),
}

impl FieldValue {
    /// Collapses stored values: none becomes `Null`, one becomes `Single`,
    /// more stay a list.
    pub fn from_values(mut values: Vec<String>) -> Self {
        match values.len() {
            0 => Self::Null,
            1 => Self::Single(values.remove(0)),
            _ => Self::Multi(values),
        }
    }

    /// Returns the values to store.
    pub fn into_values(self) -> Vec<String> {
        match self {
            Self::Null => Vec::new(),
            Self::Single(value) => vec![value],
            Self::Multi(values) => values,
        }
    }

    /// Returns the value if the field holds exactly one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Single(value) => Some(value),
            _ => None,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_owned())
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multi(values)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Multi(values.into_iter().map(str::to_owned).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse() {
        assert_eq!(FieldValue::from_values(vec![]), FieldValue::Null);
        assert_eq!(
            FieldValue::from_values(vec!["a".into()]),
            FieldValue::Single("a".into())
        );
        assert_eq!(
            FieldValue::from_values(vec!["a".into(), "b".into()]),
            FieldValue::Multi(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_serde_shape() {
        let fields = Fieldset::from([
            ("a".to_string(), FieldValue::Null),
            ("b".to_string(), FieldValue::from("x")),
            ("c".to_string(), FieldValue::from(vec!["y", "z"])),
        ]);

        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json, serde_json::json!({ "a": null, "b": "x", "c": ["y", "z"] }));

        let back: Fieldset = serde_json::from_value(json).unwrap();
        assert_eq!(back, fields);
    }

    #[test]
    fn test_option_conversion() {
        assert!(FieldValue::from(None::<&str>).is_null());
        assert_eq!(FieldValue::from(Some("x")).as_str(), Some("x"));
    }
}
