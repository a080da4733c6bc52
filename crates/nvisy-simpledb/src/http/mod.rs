//! HTTP backend for the SimpleDB query API.

mod client;
mod response;
mod signer;

pub use client::HttpBackend;
pub use signer::API_VERSION;
