#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for document store operations.
pub const TRACING_TARGET: &str = "nvisy_docstore";

pub mod codec;
mod document;
mod error;
mod field;
mod input;
mod options;
mod query;
mod store;

pub use document::{Document, DocumentSet, FromItem, ITEM_NAME_FIELD, KEY_FIELD, split_mapping};
pub use error::{BoxedError, Error, ErrorKind, Result};
pub use field::{FieldValue, Fieldset};
pub use input::{DocumentInput, QueryInput};
pub use nvisy_simpledb::{HttpBackend, MemoryBackend, SimpleDbBackend, SimpleDbConfig};
pub use options::{Merge, UpdateOptions};
pub use query::{Direction, Query};
pub use store::DocumentStore;
