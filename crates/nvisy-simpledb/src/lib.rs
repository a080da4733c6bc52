#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for HTTP client operations.
///
/// Use this target for request signing, request dispatch, and response decoding.
pub const TRACING_TARGET_CLIENT: &str = "nvisy_simpledb::client";

/// Tracing target for in-memory backend operations.
pub const TRACING_TARGET_MEMORY: &str = "nvisy_simpledb::memory";

mod backend;
mod config;
mod error;
mod types;

pub mod http;
pub mod memory;

pub use backend::SimpleDbBackend;
pub use config::SimpleDbConfig;
pub use error::{Error, Result};
pub use http::HttpBackend;
pub use memory::MemoryBackend;
pub use types::{Attribute, Item, Page};
