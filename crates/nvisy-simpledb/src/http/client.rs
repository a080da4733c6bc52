//! SimpleDB query API backend over reqwest.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::response::{self, XmlNode};
use super::signer::Signer;
use crate::backend::SimpleDbBackend;
use crate::config::SimpleDbConfig;
use crate::types::{Attribute, Item, Page};
use crate::{Result, TRACING_TARGET_CLIENT};

/// Inner state shared by clones of the backend.
struct HttpBackendInner {
    http: Client,
    endpoint: Url,
    signer: Signer,
    config: SimpleDbConfig,
}

/// SimpleDB backend that talks to the query API over HTTPS.
///
/// Requests are form-encoded `POST`s signed with signature version 2.
/// Cloning is cheap; clones share the underlying HTTP client.
#[derive(Clone)]
pub struct HttpBackend {
    inner: Arc<HttpBackendInner>,
}

impl HttpBackend {
    /// Creates a backend with its own HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: &SimpleDbConfig) -> Result<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(format!("nvisy/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Self::with_http_client(config, http)
    }

    /// Creates a backend on top of an existing HTTP client.
    ///
    /// Use this to inject transport settings such as proxies or TLS roots.
    pub fn with_http_client(config: &SimpleDbConfig, http: Client) -> Result<Self> {
        config.validate()?;
        let endpoint = config.endpoint_url()?;

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            endpoint = %endpoint,
            consistent_read = config.consistent_read,
            "SimpleDB client initialized"
        );

        let inner = HttpBackendInner {
            http,
            endpoint,
            signer: Signer::new(&config.access_key, &config.secret_key),
            config: config.clone(),
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &SimpleDbConfig {
        &self.inner.config
    }

    /// Signs and sends one action, returning the decoded response document.
    async fn call(&self, action: &str, params: BTreeMap<String, String>) -> Result<XmlNode> {
        let started_at = Instant::now();
        let timestamp = jiff::Timestamp::now()
            .strftime("%Y-%m-%dT%H:%M:%SZ")
            .to_string();
        let body = self
            .inner
            .signer
            .sign(action, params, &self.inner.endpoint, &timestamp);

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            action,
            "Sending SimpleDB request"
        );

        let reply = self
            .inner
            .http
            .post(self.inner.endpoint.clone())
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded; charset=utf-8",
            )
            .body(body)
            .send()
            .await?;

        let status = reply.status();
        let text = reply.text().await?;
        let elapsed = started_at.elapsed();

        if !status.is_success() {
            let err = response::parse_error(status.as_u16(), &text);
            tracing::warn!(
                target: TRACING_TARGET_CLIENT,
                action,
                status = status.as_u16(),
                error = %err,
                elapsed_ms = elapsed.as_millis(),
                "SimpleDB request failed"
            );
            return Err(err);
        }

        tracing::debug!(
            target: TRACING_TARGET_CLIENT,
            action,
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis(),
            "SimpleDB request completed"
        );

        response::parse(&text)
    }

    fn consistent_read(&self, params: &mut BTreeMap<String, String>) {
        if self.inner.config.consistent_read {
            params.insert("ConsistentRead".into(), "true".into());
        }
    }
}

/// Builds the numbered `Attribute.N.*` parameters of a put.
///
/// Each value gets its own index. Attributes without values are left to
/// [`clear_params`].
pub(crate) fn put_params(
    domain: &str,
    item: &str,
    attributes: &[Attribute],
    replace: &BTreeSet<String>,
) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    params.insert("DomainName".to_string(), domain.to_string());
    params.insert("ItemName".to_string(), item.to_string());

    let entries = attributes
        .iter()
        .flat_map(|attr| attr.values.iter().map(move |value| (attr, value)));

    for (index, (attr, value)) in entries.enumerate() {
        params.insert(format!("Attribute.{index}.Name"), attr.name.clone());
        params.insert(format!("Attribute.{index}.Value"), value.clone());
        if replace.contains(&attr.name) {
            params.insert(format!("Attribute.{index}.Replace"), "true".to_string());
        }
    }

    params
}

/// Builds `DeleteAttributes` parameters that remove every value of the
/// named attributes. Returns `None` when there is nothing to remove, since a
/// delete without names removes the whole item.
pub(crate) fn clear_params(
    domain: &str,
    item: &str,
    attributes: &[Attribute],
    replace: &BTreeSet<String>,
) -> Option<BTreeMap<String, String>> {
    let names: BTreeSet<&str> = attributes
        .iter()
        .filter(|attr| attr.is_empty() && replace.contains(&attr.name))
        .map(|attr| attr.name.as_str())
        .collect();

    if names.is_empty() {
        return None;
    }

    let mut params = item_params(domain, item);
    for (index, name) in names.into_iter().enumerate() {
        params.insert(format!("Attribute.{index}.Name"), name.to_string());
    }
    Some(params)
}

fn domain_params(domain: &str) -> BTreeMap<String, String> {
    BTreeMap::from([("DomainName".to_string(), domain.to_string())])
}

fn item_params(domain: &str, item: &str) -> BTreeMap<String, String> {
    let mut params = domain_params(domain);
    params.insert("ItemName".to_string(), item.to_string());
    params
}

#[async_trait]
impl SimpleDbBackend for HttpBackend {
    async fn create_domain(&self, domain: &str) -> Result<()> {
        self.call("CreateDomain", domain_params(domain)).await?;
        Ok(())
    }

    async fn delete_domain(&self, domain: &str) -> Result<()> {
        self.call("DeleteDomain", domain_params(domain)).await?;
        Ok(())
    }

    async fn list_domains(
        &self,
        max_domains: Option<u32>,
        next_token: Option<&str>,
    ) -> Result<Page<String>> {
        let mut params = BTreeMap::new();
        if let Some(max) = max_domains {
            params.insert("MaxNumberOfDomains".to_string(), max.to_string());
        }
        if let Some(token) = next_token {
            params.insert("NextToken".to_string(), token.to_string());
        }

        let root = self.call("ListDomains", params).await?;
        response::parse_domains(&root)
    }

    async fn get_attributes(&self, domain: &str, item: &str) -> Result<Vec<Attribute>> {
        let mut params = item_params(domain, item);
        self.consistent_read(&mut params);

        let root = self.call("GetAttributes", params).await?;
        response::parse_attributes(item, &root)
    }

    async fn put_attributes(
        &self,
        domain: &str,
        item: &str,
        attributes: Vec<Attribute>,
        replace: &BTreeSet<String>,
    ) -> Result<()> {
        if attributes.iter().any(|attr| !attr.is_empty()) {
            let params = put_params(domain, item, &attributes, replace);
            self.call("PutAttributes", params).await?;
        }

        // Replacing with no values clears the attribute.
        if let Some(params) = clear_params(domain, item, &attributes, replace) {
            self.call("DeleteAttributes", params).await?;
        }
        Ok(())
    }

    async fn delete_attributes(&self, domain: &str, item: &str) -> Result<()> {
        self.call("DeleteAttributes", item_params(domain, item)).await?;
        Ok(())
    }

    async fn select(&self, expression: &str, next_token: Option<&str>) -> Result<Page<Item>> {
        let mut params = BTreeMap::new();
        params.insert("SelectExpression".to_string(), expression.to_string());
        if let Some(token) = next_token {
            params.insert("NextToken".to_string(), token.to_string());
        }
        self.consistent_read(&mut params);

        let root = self.call("Select", params).await?;
        response::parse_select(&root)
    }
}

impl std::fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBackend")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
