//! Polymorphic operation inputs.

use crate::document::{Document, split_mapping};
use crate::field::Fieldset;
use crate::query::Query;
use crate::{Error, Result};

/// A document reference accepted by document operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentInput {
    /// Identifier only.
    ById(String),
    /// A full document.
    ByDocument(Document),
    /// A mapping that carries the identifier under its key field.
    ByMapping(Fieldset),
}

impl DocumentInput {
    /// Resolves to a full document. An identifier alone carries no fields.
    pub(crate) fn into_document(self) -> Result<Document> {
        match self {
            Self::ById(id) => Err(Error::invalid_argument(format!(
                "expected a document or mapping, got only the identifier '{id}'"
            ))),
            Self::ByDocument(document) => Ok(document),
            Self::ByMapping(mapping) => Document::from_mapping(mapping),
        }
    }

    /// Resolves to the identifier and, when the input carries them, its fields.
    pub(crate) fn into_parts(self) -> Result<(String, Option<Fieldset>)> {
        match self {
            Self::ById(id) if id.is_empty() => {
                Err(Error::invalid_argument("document identifier is empty"))
            }
            Self::ById(id) => Ok((id, None)),
            Self::ByDocument(document) => {
                let (id, fields) = document.into_parts();
                Ok((id, Some(fields)))
            }
            Self::ByMapping(mapping) => {
                let (id, fields) = split_mapping(mapping)?;
                Ok((id, Some(fields)))
            }
        }
    }

    /// Resolves to the identifier only.
    pub(crate) fn into_id(self) -> Result<String> {
        self.into_parts().map(|(id, _)| id)
    }
}

impl From<&str> for DocumentInput {
    fn from(id: &str) -> Self {
        Self::ById(id.to_owned())
    }
}

impl From<String> for DocumentInput {
    fn from(id: String) -> Self {
        Self::ById(id)
    }
}

impl From<Document> for DocumentInput {
    fn from(document: Document) -> Self {
        Self::ByDocument(document)
    }
}

impl From<&Document> for DocumentInput {
    fn from(document: &Document) -> Self {
        Self::ByDocument(document.clone())
    }
}

impl From<Fieldset> for DocumentInput {
    fn from(mapping: Fieldset) -> Self {
        Self::ByMapping(mapping)
    }
}

/// A select expression, either raw or built.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryInput {
    /// Expression sent to the backend as written.
    Raw(String),
    /// Builder rendered against the target collection.
    Builder(Query),
}

impl From<&str> for QueryInput {
    fn from(expression: &str) -> Self {
        Self::Raw(expression.to_owned())
    }
}

impl From<String> for QueryInput {
    fn from(expression: String) -> Self {
        Self::Raw(expression)
    }
}

impl From<Query> for QueryInput {
    fn from(query: Query) -> Self {
        Self::Builder(query)
    }
}

impl From<&Query> for QueryInput {
    fn from(query: &Query) -> Self {
        Self::Builder(query.clone())
    }
}
