//! Domain storage for the in-memory backend.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::select::{Attributes, SelectExpression};
use crate::backend::SimpleDbBackend;
use crate::types::{Attribute, Item, Page};
use crate::{Error, Result, TRACING_TARGET_MEMORY};

type Domain = BTreeMap<String, Attributes>;

/// Default number of domains returned per `list_domains` page.
const DEFAULT_PAGE_SIZE: u32 = 100;

/// SimpleDB backend that keeps everything in process memory.
///
/// Attribute values behave as sets: adding a value that is already stored
/// is a no-op. Items without attributes do not exist. Clones share storage.
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    domains: Arc<RwLock<BTreeMap<String, Domain>>>,
    page_size: u32,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self {
            domains: Arc::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets how many domains `list_domains` returns when no maximum is given.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    #[cfg(test)]
    pub(crate) async fn item_count(&self, domain: &str) -> Option<usize> {
        self.domains.read().await.get(domain).map(BTreeMap::len)
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_offset(next_token: Option<&str>) -> Result<usize> {
    next_token.map_or(Ok(0), |token| {
        token.parse().map_err(|_| {
            Error::service(
                "InvalidNextToken",
                format!("The specified next token is not valid: {token}"),
            )
        })
    })
}

fn require_name(parameter: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::service(
            "InvalidParameterValue",
            format!("Value () for parameter {parameter} is invalid"),
        ));
    }
    Ok(())
}

#[async_trait]
impl SimpleDbBackend for MemoryBackend {
    async fn create_domain(&self, domain: &str) -> Result<()> {
        require_name("DomainName", domain)?;
        let mut domains = self.domains.write().await;
        domains.entry(domain.to_string()).or_default();

        tracing::debug!(target: TRACING_TARGET_MEMORY, domain, "Domain created");
        Ok(())
    }

    async fn delete_domain(&self, domain: &str) -> Result<()> {
        let removed = self.domains.write().await.remove(domain);

        tracing::debug!(
            target: TRACING_TARGET_MEMORY,
            domain,
            existed = removed.is_some(),
            "Domain deleted"
        );
        Ok(())
    }

    async fn list_domains(
        &self,
        max_domains: Option<u32>,
        next_token: Option<&str>,
    ) -> Result<Page<String>> {
        let offset = parse_offset(next_token)?;
        let size = max_domains.unwrap_or(self.page_size).max(1) as usize;

        let domains = self.domains.read().await;
        let names: Vec<String> = domains.keys().skip(offset).take(size).cloned().collect();
        let end = offset + names.len();
        let next = (end < domains.len()).then(|| end.to_string());

        Ok(Page::new(names, next))
    }

    async fn get_attributes(&self, domain: &str, item: &str) -> Result<Vec<Attribute>> {
        let domains = self.domains.read().await;
        let stored = domains
            .get(domain)
            .ok_or_else(|| Error::no_such_domain(domain))?;

        let attributes = stored
            .get(item)
            .map(|attrs| {
                attrs
                    .iter()
                    .map(|(name, values)| Attribute::new(item, name.as_str(), values.iter().cloned()))
                    .collect()
            })
            .unwrap_or_default();

        Ok(attributes)
    }

    async fn put_attributes(
        &self,
        domain: &str,
        item: &str,
        attributes: Vec<Attribute>,
        replace: &BTreeSet<String>,
    ) -> Result<()> {
        require_name("ItemName", item)?;
        let mut domains = self.domains.write().await;
        let stored = domains
            .get_mut(domain)
            .ok_or_else(|| Error::no_such_domain(domain))?;
        let entry = stored.entry(item.to_string()).or_default();

        for attribute in &attributes {
            if replace.contains(&attribute.name) {
                entry.remove(&attribute.name);
            }
        }

        for attribute in attributes {
            let values = entry.entry(attribute.name).or_default();
            for value in attribute.values {
                if !values.contains(&value) {
                    values.push(value);
                }
            }
        }

        entry.retain(|_, values| !values.is_empty());
        let count = entry.len();
        if entry.is_empty() {
            stored.remove(item);
        }

        tracing::debug!(
            target: TRACING_TARGET_MEMORY,
            domain,
            item,
            attributes = count,
            "Attributes stored"
        );
        Ok(())
    }

    async fn delete_attributes(&self, domain: &str, item: &str) -> Result<()> {
        let mut domains = self.domains.write().await;
        let stored = domains
            .get_mut(domain)
            .ok_or_else(|| Error::no_such_domain(domain))?;
        stored.remove(item);

        tracing::debug!(target: TRACING_TARGET_MEMORY, domain, item, "Item deleted");
        Ok(())
    }

    async fn select(&self, expression: &str, next_token: Option<&str>) -> Result<Page<Item>> {
        let select = SelectExpression::parse(expression)?;
        let offset = parse_offset(next_token)?;

        let domains = self.domains.read().await;
        let domain = domains
            .get(&select.domain)
            .ok_or_else(|| Error::no_such_domain(&select.domain))?;

        let (items, next) = select.evaluate(domain, offset);

        tracing::debug!(
            target: TRACING_TARGET_MEMORY,
            expression,
            returned = items.len(),
            has_more = next.is_some(),
            "Select evaluated"
        );

        Ok(Page::new(items, next.map(|n| n.to_string())))
    }
}
