//! Wire-level data types shared by all backends.

use serde::{Deserialize, Serialize};

/// A named, multi-valued attribute of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Name of the item the attribute belongs to.
    pub item_name: String,
    /// Attribute name.
    pub name: String,
    /// Attribute values, in the order they were supplied or returned.
    #[serde(default)]
    pub values: Vec<String>,
}

impl Attribute {
    /// Creates an attribute with the given values.
    pub fn new<I, V>(item_name: impl Into<String>, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            item_name: item_name.into(),
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a single-valued attribute.
    pub fn single(
        item_name: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::new(item_name, name, [value.into()])
    }

    /// Returns true if the attribute carries no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An item returned by a select, with its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Item name (the document identifier).
    pub name: String,
    /// Attributes of the item.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl Item {
    /// Creates an item from its name and attributes.
    pub fn new(name: impl Into<String>, attributes: Vec<Attribute>) -> Self {
        Self {
            name: name.into(),
            attributes,
        }
    }
}

/// One page of results with an optional continuation token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Results in provider order.
    pub items: Vec<T>,
    /// Token to request the next page, if there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// Creates a page.
    pub fn new(items: Vec<T>, next_token: Option<String>) -> Self {
        Self { items, next_token }
    }

    /// Creates a final page with no continuation.
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }

    /// Returns true if no further pages are available.
    #[inline]
    pub fn is_last(&self) -> bool {
        self.next_token.is_none()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::last(Vec::new())
    }
}
