//! Backend trait for SimpleDB-compatible stores.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;

use crate::Result;
use crate::types::{Attribute, Item, Page};

/// Trait for SimpleDB-compatible attribute stores.
///
/// Every method is a single request/response round trip. Implementations
/// do not retry.
#[async_trait]
pub trait SimpleDbBackend: Send + Sync {
    /// Creates a domain. Creating an existing domain is backend-defined.
    async fn create_domain(&self, domain: &str) -> Result<()>;

    /// Deletes a domain and every item in it.
    async fn delete_domain(&self, domain: &str) -> Result<()>;

    /// Lists domain names, one page at a time.
    async fn list_domains(
        &self,
        max_domains: Option<u32>,
        next_token: Option<&str>,
    ) -> Result<Page<String>>;

    /// Returns every attribute of an item. An unknown item yields no attributes.
    async fn get_attributes(&self, domain: &str, item: &str) -> Result<Vec<Attribute>>;

    /// Writes attributes of an item.
    ///
    /// Attributes named in `replace` overwrite stored values, and a replaced
    /// attribute without values is removed. The others are added to the
    /// values already stored.
    async fn put_attributes(
        &self,
        domain: &str,
        item: &str,
        attributes: Vec<Attribute>,
        replace: &BTreeSet<String>,
    ) -> Result<()>;

    /// Deletes every attribute of an item.
    async fn delete_attributes(&self, domain: &str, item: &str) -> Result<()>;

    /// Runs a select expression and returns one page of items.
    async fn select(&self, expression: &str, next_token: Option<&str>) -> Result<Page<Item>>;
}

#[async_trait]
impl<T> SimpleDbBackend for Arc<T>
where
    T: SimpleDbBackend + ?Sized,
{
    async fn create_domain(&self, domain: &str) -> Result<()> {
        (**self).create_domain(domain).await
    }

    async fn delete_domain(&self, domain: &str) -> Result<()> {
        (**self).delete_domain(domain).await
    }

    async fn list_domains(
        &self,
        max_domains: Option<u32>,
        next_token: Option<&str>,
    ) -> Result<Page<String>> {
        (**self).list_domains(max_domains, next_token).await
    }

    async fn get_attributes(&self, domain: &str, item: &str) -> Result<Vec<Attribute>> {
        (**self).get_attributes(domain, item).await
    }

    async fn put_attributes(
        &self,
        domain: &str,
        item: &str,
        attributes: Vec<Attribute>,
        replace: &BTreeSet<String>,
    ) -> Result<()> {
        (**self)
            .put_attributes(domain, item, attributes, replace)
            .await
    }

    async fn delete_attributes(&self, domain: &str, item: &str) -> Result<()> {
        (**self).delete_attributes(domain, item).await
    }

    async fn select(&self, expression: &str, next_token: Option<&str>) -> Result<Page<Item>> {
        (**self).select(expression, next_token).await
    }
}
