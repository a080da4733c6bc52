//! Signature version 2 request signing.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::Url;

type HmacSha256 = Hmac<Sha256>;

/// SimpleDB API version sent with every request.
pub const API_VERSION: &str = "2009-04-15";

/// Signs SimpleDB query API requests.
#[derive(Clone)]
pub(crate) struct Signer {
    access_key: String,
    secret_key: String,
}

impl Signer {
    pub fn new(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Adds the common parameters to `params` and returns the signed form body.
    pub fn sign(
        &self,
        action: &str,
        mut params: BTreeMap<String, String>,
        endpoint: &Url,
        timestamp: &str,
    ) -> String {
        params.insert("Action".into(), action.into());
        params.insert("AWSAccessKeyId".into(), self.access_key.clone());
        params.insert("SignatureMethod".into(), "HmacSHA256".into());
        params.insert("SignatureVersion".into(), "2".into());
        params.insert("Timestamp".into(), timestamp.into());
        params.insert("Version".into(), API_VERSION.into());

        let canonical = canonical_query(&params);
        let string_to_sign = format!(
            "POST\n{}\n{}\n{}",
            host_header(endpoint),
            endpoint.path(),
            canonical
        );

        let signature = self.signature(&string_to_sign);
        format!("{canonical}&Signature={}", percent_encode(&signature))
    }

    fn signature(&self, string_to_sign: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(string_to_sign.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

/// Joins parameters sorted by byte order of their names.
pub(crate) fn canonical_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// RFC 3986 encoding: only `A-Z a-z 0-9 - _ . ~` stay literal.
pub(crate) fn percent_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
        .replace('*', "%2A")
        .replace("%7E", "~")
}

fn host_header(endpoint: &Url) -> String {
    let host = endpoint.host_str().unwrap_or_default().to_ascii_lowercase();
    match endpoint.port() {
        Some(port) => format!("{host}:{port}"),
        None => host,
    }
}
