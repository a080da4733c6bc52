//! Documents and result sets.

use derive_more::{Deref, From};
use nvisy_simpledb::Item;
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::field::{FieldValue, Fieldset};
use crate::{Error, Result};

/// Mapping key that carries the document identifier.
pub const KEY_FIELD: &str = "_id";

/// Fallback identifier key, used when [`KEY_FIELD`] is absent.
pub const ITEM_NAME_FIELD: &str = "ItemName";

/// A stored document: an identifier and its fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    id: String,
    #[serde(default)]
    fields: Fieldset,
}

impl Document {
    /// Creates a document.
    pub fn new(id: impl Into<String>, fields: Fieldset) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Creates a document from a mapping that carries its identifier.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the mapping has no usable identifier.
    pub fn from_mapping(mapping: Fieldset) -> Result<Self> {
        let (id, fields) = split_mapping(mapping)?;
        Ok(Self::new(id, fields))
    }

    /// Creates a document from a JSON object, as [`Document::from_mapping`].
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let mapping: Fieldset = serde_json::from_value(value).map_err(|e| {
            Error::invalid_argument(format!("document must be an object of strings: {e}"))
                .with_source(e)
        })?;
        Self::from_mapping(mapping)
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn fields(&self) -> &Fieldset {
        &self.fields
    }

    /// Returns a field value.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Returns a copy of the document with `name` set to `value`.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Splits the document into its identifier and fields.
    pub fn into_parts(self) -> (String, Fieldset) {
        (self.id, self.fields)
    }

    /// Returns the fields with the identifier stored under [`KEY_FIELD`].
    pub fn into_mapping(self) -> Fieldset {
        let mut mapping = self.fields;
        mapping.insert(KEY_FIELD.to_owned(), FieldValue::Single(self.id));
        mapping
    }
}

/// Extracts the identifier from a mapping and returns it with the remaining
/// fields.
///
/// The identifier is read from [`KEY_FIELD`], or from [`ITEM_NAME_FIELD`]
/// when the former is absent, and removed from the returned fields. When both
/// keys are present, [`ITEM_NAME_FIELD`] stays an ordinary field.
///
/// # Errors
///
/// Returns `InvalidArgument` if neither key is present or the identifier is
/// not a single non-empty value.
pub fn split_mapping(mut mapping: Fieldset) -> Result<(String, Fieldset)> {
    let (key, value) = match mapping.remove(KEY_FIELD) {
        Some(value) => (KEY_FIELD, value),
        None => match mapping.remove(ITEM_NAME_FIELD) {
            Some(value) => (ITEM_NAME_FIELD, value),
            None => {
                return Err(Error::invalid_argument(format!(
                    "mapping has neither a '{KEY_FIELD}' nor an '{ITEM_NAME_FIELD}' key"
                )));
            }
        },
    };

    match value {
        FieldValue::Single(id) if !id.is_empty() => Ok((id, mapping)),
        _ => Err(Error::invalid_argument(format!(
            "'{key}' must hold a single non-empty value"
        ))),
    }
}

/// Builds a result row from a backend item.
pub trait FromItem: Sized {
    fn from_item(item: Item) -> Self;
}

impl FromItem for Document {
    fn from_item(item: Item) -> Self {
        Self::new(item.name, codec::decode(item.attributes))
    }
}

/// Raw rows carry the identifier under [`KEY_FIELD`].
impl FromItem for Fieldset {
    fn from_item(item: Item) -> Self {
        Document::from_item(item).into_mapping()
    }
}

/// Ordered rows of a listing or query, in backend order.
#[derive(Debug, Clone, PartialEq, Eq, Deref, From)]
pub struct DocumentSet<T = Document>(Vec<T>);

impl<T> DocumentSet<T> {
    /// Returns the rows.
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T> Default for DocumentSet<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> FromIterator<T> for DocumentSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for DocumentSet<T> {
    type IntoIter = std::vec::IntoIter<T>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a DocumentSet<T> {
    type IntoIter = std::slice::Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
