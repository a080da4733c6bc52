//! In-memory SimpleDB backend.
//!
//! Keeps domains in process memory and evaluates select expressions locally.
//! Useful for tests and for running without service credentials.

mod backend;
mod select;

pub use backend::MemoryBackend;
