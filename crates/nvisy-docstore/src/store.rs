//! Collection and document operations over a SimpleDB backend.

use std::collections::BTreeSet;

use nvisy_simpledb::{HttpBackend, Item, SimpleDbBackend, SimpleDbConfig};

use crate::codec;
use crate::document::{Document, DocumentSet, FromItem, KEY_FIELD};
use crate::field::Fieldset;
use crate::input::{DocumentInput, QueryInput};
use crate::options::UpdateOptions;
use crate::query::Query;
use crate::{Error, Result, TRACING_TARGET};

/// Document store backed by a SimpleDB-compatible attribute store.
///
/// Collections are domains and documents are items. The store holds no state
/// besides the backend and never retries; each operation is one backend
/// round trip, except [`replace_document`](Self::replace_document) (two) and
/// [`list_collections`](Self::list_collections) (one per page).
#[derive(Debug, Clone)]
pub struct DocumentStore<B = HttpBackend> {
    backend: B,
}

impl DocumentStore<HttpBackend> {
    /// Connects to the SimpleDB query API.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if credentials or the endpoint are invalid.
    pub fn connect(config: &SimpleDbConfig) -> Result<Self> {
        let backend = HttpBackend::new(config).map_err(connect_error)?;
        Ok(Self::new(backend))
    }

    /// Connects to the SimpleDB query API over an existing HTTP client.
    pub fn connect_with_transport(config: &SimpleDbConfig, http: reqwest::Client) -> Result<Self> {
        let backend = HttpBackend::with_http_client(config, http).map_err(connect_error)?;
        Ok(Self::new(backend))
    }
}

fn connect_error(err: nvisy_simpledb::Error) -> Error {
    if err.is_config() {
        Error::invalid_argument(err.message()).with_source(err)
    } else {
        err.into()
    }
}

fn require_collection(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_argument("collection name is empty"));
    }
    Ok(())
}

/// Stored fields may not shadow the identifier key of raw rows.
fn require_fields(fields: &Fieldset) -> Result<()> {
    if fields.contains_key(KEY_FIELD) {
        return Err(Error::invalid_argument(format!(
            "field name '{KEY_FIELD}' is reserved for the document identifier"
        )));
    }
    Ok(())
}

impl<B: SimpleDbBackend> DocumentStore<B> {
    /// Creates a store over the given backend.
    pub fn new(backend: B) -> Self {
        tracing::info!(target: TRACING_TARGET, "Document store initialized");
        Self { backend }
    }

    /// Returns the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Starts a new query.
    pub fn select(&self) -> Query {
        Query::new()
    }

    /// Creates a collection.
    ///
    /// Creating an existing collection behaves as the backend does: it
    /// either succeeds or fails with the backend's error.
    pub async fn create_collection(&self, name: &str) -> Result<()> {
        require_collection(name)?;
        tracing::debug!(target: TRACING_TARGET, collection = %name, "Creating collection");
        self.backend.create_domain(name).await?;
        Ok(())
    }

    /// Deletes a collection and every document in it.
    pub async fn delete_collection(&self, name: &str) -> Result<()> {
        require_collection(name)?;
        tracing::debug!(target: TRACING_TARGET, collection = %name, "Deleting collection");
        self.backend.delete_domain(name).await?;
        Ok(())
    }

    /// Lists every collection name, following backend pages to the end.
    pub async fn list_collections(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut next_token: Option<String> = None;
        let mut seen = BTreeSet::new();

        loop {
            let page = self
                .backend
                .list_domains(None, next_token.as_deref())
                .await?;
            names.extend(page.items);

            match page.next_token {
                Some(token) if !seen.insert(token.clone()) => {
                    return Err(Error::runtime(format!(
                        "backend returned list token '{token}' more than once"
                    )));
                }
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        tracing::debug!(
            target: TRACING_TARGET,
            count = names.len(),
            "Listed collections"
        );
        Ok(names)
    }

    /// Returns every document of a collection.
    pub async fn list_documents<T: FromItem>(&self, collection: &str) -> Result<DocumentSet<T>> {
        self.query(collection, self.select().select("*")).await
    }

    /// Writes a document, replacing every field it carries.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the input is a bare identifier, a
    /// mapping without an identifier, or carries a field named `_id`.
    pub async fn insert_document(
        &self,
        collection: &str,
        document: impl Into<DocumentInput>,
    ) -> Result<Document> {
        require_collection(collection)?;
        let document = document.into().into_document()?;
        require_fields(document.fields())?;
        self.put(collection, &document, &UpdateOptions::default())
            .await?;
        Ok(document)
    }

    /// Deletes a document and writes it again with the given fields.
    ///
    /// The two steps are not atomic. If the write fails the document stays
    /// deleted and the write error is returned.
    pub async fn replace_document(
        &self,
        collection: &str,
        document: impl Into<DocumentInput>,
    ) -> Result<Document> {
        require_collection(collection)?;
        let document = document.into().into_document()?;
        require_fields(document.fields())?;

        self.backend
            .delete_attributes(collection, document.id())
            .await?;

        if let Err(err) = self
            .put(collection, &document, &UpdateOptions::default())
            .await
        {
            tracing::warn!(
                target: TRACING_TARGET,
                collection = %collection,
                document = %document.id(),
                error = %err,
                "Document deleted but not rewritten"
            );
            return Err(err);
        }

        Ok(document)
    }

    /// Updates fields of a document.
    ///
    /// With `fieldset` unset, the fields come from `target`, which must then
    /// be a document or a mapping. `options.merge` decides per field whether
    /// new values replace or join the stored ones.
    pub async fn update_document(
        &self,
        collection: &str,
        target: impl Into<DocumentInput>,
        fieldset: Option<Fieldset>,
        options: UpdateOptions,
    ) -> Result<Document> {
        require_collection(collection)?;
        let (id, own_fields) = target.into().into_parts()?;
        let fields = fieldset.or(own_fields).ok_or_else(|| {
            Error::invalid_argument(format!("no fields given to update document '{id}'"))
        })?;
        require_fields(&fields)?;

        let document = Document::new(id, fields);
        self.put(collection, &document, &options).await?;
        Ok(document)
    }

    /// Deletes a document.
    pub async fn delete_document(
        &self,
        collection: &str,
        target: impl Into<DocumentInput>,
    ) -> Result<()> {
        require_collection(collection)?;
        let id = target.into().into_id()?;

        tracing::debug!(
            target: TRACING_TARGET,
            collection = %collection,
            document = %id,
            "Deleting document"
        );
        self.backend.delete_attributes(collection, &id).await?;
        Ok(())
    }

    /// Fetches a document. Returns `None` if it has no stored fields.
    pub async fn fetch_document<T: FromItem>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<T>> {
        require_collection(collection)?;
        if id.is_empty() {
            return Err(Error::invalid_argument("document identifier is empty"));
        }

        let attributes = self.backend.get_attributes(collection, id).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            collection = %collection,
            document = %id,
            found = !attributes.is_empty(),
            "Fetched document"
        );

        if attributes.is_empty() {
            return Ok(None);
        }
        Ok(Some(T::from_item(Item::new(id, attributes))))
    }

    /// Runs a query against a collection and returns one page of rows.
    ///
    /// Raw expressions are sent as written; builders are rendered with
    /// `collection` as their default source.
    pub async fn query<T: FromItem>(
        &self,
        collection: &str,
        query: impl Into<QueryInput>,
    ) -> Result<DocumentSet<T>> {
        let expression = match query.into() {
            QueryInput::Raw(expression) => expression,
            QueryInput::Builder(query) => query.assemble(collection)?,
        };

        let page = self.backend.select(&expression, None).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            collection = %collection,
            expression = %expression,
            rows = page.items.len(),
            truncated = !page.is_last(),
            "Query executed"
        );

        Ok(page.items.into_iter().map(T::from_item).collect())
    }

    async fn put(
        &self,
        collection: &str,
        document: &Document,
        options: &UpdateOptions,
    ) -> Result<()> {
        let replace = options.merge.replaced_fields(document.fields());
        let attributes = codec::encode(document.id(), document.fields());

        tracing::debug!(
            target: TRACING_TARGET,
            collection = %collection,
            document = %document.id(),
            fields = attributes.len(),
            replaced = replace.len(),
            "Writing document"
        );

        self.backend
            .put_attributes(collection, document.id(), attributes, &replace)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use nvisy_simpledb::{Attribute, MemoryBackend, Page};

    use super::*;
    use crate::error::ErrorKind;
    use crate::field::FieldValue;
    use crate::options::Merge;
    use crate::query::Direction;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        CreateDomain(String),
        ListDomains(Option<String>),
        Put {
            item: String,
            attributes: Vec<Attribute>,
            replace: BTreeSet<String>,
        },
        Delete(String),
        Select(String),
    }

    /// Records calls and forwards them to a memory backend, optionally failing
    /// some of them.
    #[derive(Default)]
    struct RecordingBackend {
        inner: MemoryBackend,
        calls: Mutex<Vec<Call>>,
        fail_puts: bool,
        fail_creates_of_existing: bool,
        domain_page_size: Option<u32>,
        repeat_domain_token: bool,
    }

    impl RecordingBackend {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl SimpleDbBackend for RecordingBackend {
        async fn create_domain(&self, domain: &str) -> nvisy_simpledb::Result<()> {
            let existed = self.calls().contains(&Call::CreateDomain(domain.to_string()));
            self.record(Call::CreateDomain(domain.to_string()));
            if existed && self.fail_creates_of_existing {
                return Err(nvisy_simpledb::Error::service(
                    "DomainAlreadyExists",
                    format!("domain {domain} already exists"),
                ));
            }
            self.inner.create_domain(domain).await
        }

        async fn delete_domain(&self, domain: &str) -> nvisy_simpledb::Result<()> {
            self.inner.delete_domain(domain).await
        }

        async fn list_domains(
            &self,
            max_domains: Option<u32>,
            next_token: Option<&str>,
        ) -> nvisy_simpledb::Result<Page<String>> {
            self.record(Call::ListDomains(next_token.map(str::to_string)));
            if self.repeat_domain_token {
                return Ok(Page::new(vec!["orders".to_string()], Some("again".to_string())));
            }
            self.inner
                .list_domains(max_domains.or(self.domain_page_size), next_token)
                .await
        }

        async fn get_attributes(
            &self,
            domain: &str,
            item: &str,
        ) -> nvisy_simpledb::Result<Vec<Attribute>> {
            self.inner.get_attributes(domain, item).await
        }

        async fn put_attributes(
            &self,
            domain: &str,
            item: &str,
            attributes: Vec<Attribute>,
            replace: &BTreeSet<String>,
        ) -> nvisy_simpledb::Result<()> {
            self.record(Call::Put {
                item: item.to_string(),
                attributes: attributes.clone(),
                replace: replace.clone(),
            });
            if self.fail_puts {
                return Err(nvisy_simpledb::Error::service("ServiceUnavailable", "try later"));
            }
            self.inner
                .put_attributes(domain, item, attributes, replace)
                .await
        }

        async fn delete_attributes(&self, domain: &str, item: &str) -> nvisy_simpledb::Result<()> {
            self.record(Call::Delete(item.to_string()));
            self.inner.delete_attributes(domain, item).await
        }

        async fn select(
            &self,
            expression: &str,
            next_token: Option<&str>,
        ) -> nvisy_simpledb::Result<Page<Item>> {
            self.record(Call::Select(expression.to_string()));
            self.inner.select(expression, next_token).await
        }
    }

    fn order() -> Document {
        Document::new("o-1", Fieldset::new())
            .with_field("color", "red")
            .with_field("size", "M")
    }

    async fn store_with(
        backend: RecordingBackend,
    ) -> (DocumentStore<Arc<RecordingBackend>>, Arc<RecordingBackend>) {
        let backend = Arc::new(backend);
        let store = DocumentStore::new(backend.clone());
        store.create_collection("orders").await.unwrap();
        (store, backend)
    }

    async fn memory_store() -> DocumentStore<MemoryBackend> {
        let store = DocumentStore::new(MemoryBackend::new());
        store.create_collection("orders").await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_insert_and_fetch() {
        let store = memory_store().await;
        let doc = order().with_field("tags", vec!["gift", "new"]);
        store.insert_document("orders", &doc).await.unwrap();

        let fetched: Document = store.fetch_document("orders", "o-1").await.unwrap().unwrap();
        assert_eq!(fetched, doc);

        let row: Fieldset = store.fetch_document("orders", "o-1").await.unwrap().unwrap();
        assert_eq!(row["_id"], FieldValue::from("o-1"));
    }

    #[tokio::test]
    async fn test_fetch_missing_returns_none() {
        let store = memory_store().await;
        let fetched = store.fetch_document::<Document>("orders", "nope").await.unwrap();
        assert!(fetched.is_none());
    }

    #[tokio::test]
    async fn test_insert_replaces_every_field() {
        let (store, backend) = store_with(RecordingBackend::default()).await;
        store.insert_document("orders", order()).await.unwrap();

        let calls = backend.calls();
        let Some(Call::Put { replace, .. }) = calls.last() else {
            panic!("expected a put, got {calls:?}");
        };
        assert_eq!(replace, &BTreeSet::from(["color".to_string(), "size".to_string()]));
    }

    #[tokio::test]
    async fn test_insert_rejects_bare_identifier() {
        let store = memory_store().await;
        let err = store.insert_document("orders", "o-1").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_insert_from_mapping() {
        let store = memory_store().await;
        let mapping = Fieldset::from([
            ("ItemName".to_string(), FieldValue::from("o-9")),
            ("color".to_string(), FieldValue::from("blue")),
        ]);
        let doc = store.insert_document("orders", mapping).await.unwrap();
        assert_eq!(doc.id(), "o-9");

        let fetched = store.fetch_document::<Document>("orders", "o-9").await.unwrap();
        assert_eq!(fetched.map(|d| d.fields().len()), Some(1));
    }

    #[tokio::test]
    async fn test_update_merges_named_fields() {
        let (store, backend) = store_with(RecordingBackend::default()).await;
        let fields = Fieldset::from([
            ("color".to_string(), FieldValue::from("red")),
            ("size".to_string(), FieldValue::from("M")),
        ]);
        let options = UpdateOptions::new()
            .with_merge(BTreeMap::from([("color".to_string(), true)]));

        store
            .update_document("orders", "o-1", Some(fields), options)
            .await
            .unwrap();

        let calls = backend.calls();
        let Some(Call::Put { item, replace, attributes }) = calls.last() else {
            panic!("expected a put, got {calls:?}");
        };
        assert_eq!(item, "o-1");
        assert_eq!(replace, &BTreeSet::from(["size".to_string()]));
        assert_eq!(attributes.len(), 2);
    }

    #[tokio::test]
    async fn test_update_merge_adds_values() {
        let store = memory_store().await;
        store.insert_document("orders", order()).await.unwrap();

        let more = Fieldset::from([
            ("color".to_string(), FieldValue::from("blue")),
            ("size".to_string(), FieldValue::from("L")),
        ]);
        store
            .update_document(
                "orders",
                "o-1",
                Some(more),
                UpdateOptions::new().with_merge(Merge::fields(["color"])),
            )
            .await
            .unwrap();

        let doc: Document = store.fetch_document("orders", "o-1").await.unwrap().unwrap();
        assert_eq!(doc.get("color"), Some(&FieldValue::from(vec!["red", "blue"])));
        assert_eq!(doc.get("size"), Some(&FieldValue::from("L")));
    }

    #[tokio::test]
    async fn test_update_without_fields_fails() {
        let store = memory_store().await;
        let err = store
            .update_document("orders", "o-1", None, UpdateOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[tokio::test]
    async fn test_update_takes_fields_from_document() {
        let store = memory_store().await;
        store
            .update_document("orders", order(), None, UpdateOptions::default())
            .await
            .unwrap();

        let fetched = store.fetch_document::<Document>("orders", "o-1").await.unwrap();
        assert_eq!(fetched, Some(order()));
    }

    #[tokio::test]
    async fn test_replace_deletes_then_inserts() {
        let (store, backend) = store_with(RecordingBackend::default()).await;
        store
            .insert_document("orders", order().with_field("stale", "x"))
            .await
            .unwrap();

        let before = backend.calls().len();
        store.replace_document("orders", order()).await.unwrap();
        let calls = backend.calls().split_off(before);

        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], Call::Delete("o-1".to_string()));
        assert_eq!(
            calls[1],
            Call::Put {
                item: "o-1".to_string(),
                attributes: codec::encode("o-1", order().fields()),
                replace: BTreeSet::from(["color".to_string(), "size".to_string()]),
            }
        );

        let fetched = store.fetch_document::<Document>("orders", "o-1").await.unwrap();
        assert_eq!(fetched, Some(order()));
    }

    #[tokio::test]
    async fn test_replace_is_not_atomic() {
        let backend = RecordingBackend {
            fail_puts: true,
            ..Default::default()
        };
        backend.inner.create_domain("orders").await.unwrap();
        backend
            .inner
            .put_attributes(
                "orders",
                "o-1",
                codec::encode("o-1", order().fields()),
                &BTreeSet::new(),
            )
            .await
            .unwrap();
        let (store, backend) = store_with(backend).await;

        let err = store.replace_document("orders", order()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Runtime);
        assert_eq!(err.code(), Some("ServiceUnavailable"));

        let fetched = store.fetch_document::<Document>("orders", "o-1").await.unwrap();
        assert!(fetched.is_none());
        assert!(backend.calls().contains(&Call::Delete("o-1".to_string())));
    }

    #[tokio::test]
    async fn test_create_collection_twice_succeeds_on_memory() {
        let store = memory_store().await;
        store.create_collection("orders").await.unwrap();
        assert_eq!(store.list_collections().await.unwrap(), vec!["orders"]);
    }

    #[tokio::test]
    async fn test_create_collection_twice_surfaces_backend_fault() {
        let backend = RecordingBackend {
            fail_creates_of_existing: true,
            ..Default::default()
        };
        let (store, _) = store_with(backend).await;

        let err = store.create_collection("orders").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Runtime);
        assert_eq!(err.code(), Some("DomainAlreadyExists"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn test_empty_collection_name() {
        let store = memory_store().await;
        let err = store.create_collection("").await.unwrap_err();
        assert!(err.is_invalid_argument());
        let err = store.delete_collection("").await.unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[tokio::test]
    async fn test_list_collections_follows_pages() {
        let backend = RecordingBackend {
            domain_page_size: Some(2),
            ..Default::default()
        };
        let (store, backend) = store_with(backend).await;
        for name in ["a", "b", "c", "d"] {
            store.create_collection(name).await.unwrap();
        }

        let names = store.list_collections().await.unwrap();
        assert_eq!(names, vec!["a", "b", "c", "d", "orders"]);

        let pages = backend
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::ListDomains(_)))
            .count();
        assert_eq!(pages, 3);
    }

    #[tokio::test]
    async fn test_list_collections_stops_on_repeated_token() {
        let backend = RecordingBackend {
            repeat_domain_token: true,
            ..Default::default()
        };
        let (store, backend) = store_with(backend).await;

        let err = store.list_collections().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Runtime);

        let pages = backend
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::ListDomains(_)))
            .count();
        assert_eq!(pages, 2);
    }

    #[tokio::test]
    async fn test_identifier_key_is_not_a_field_name() {
        let (store, backend) = store_with(RecordingBackend::default()).await;
        store.insert_document("orders", order()).await.unwrap();
        let shadowing = order().with_field("_id", "external-42");

        let err = store.insert_document("orders", &shadowing).await.unwrap_err();
        assert!(err.is_invalid_argument());

        let before = backend.calls().len();
        let err = store.replace_document("orders", &shadowing).await.unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(backend.calls().len(), before);

        let fields = Fieldset::from([("_id".to_string(), FieldValue::from("external-42"))]);
        let err = store
            .update_document("orders", "o-1", Some(fields), UpdateOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_invalid_argument());

        let doc: Document = store.fetch_document("orders", "o-1").await.unwrap().unwrap();
        let row: Fieldset = store.fetch_document("orders", "o-1").await.unwrap().unwrap();
        assert_eq!(doc.get("_id"), None);
        assert_eq!(row["_id"], FieldValue::from("o-1"));
    }

    #[tokio::test]
    async fn test_update_with_null_clears_field() {
        let store = memory_store().await;
        store.insert_document("orders", order()).await.unwrap();

        let fields = Fieldset::from([("color".to_string(), FieldValue::Null)]);
        store
            .update_document("orders", "o-1", Some(fields), UpdateOptions::default())
            .await
            .unwrap();

        let doc: Document = store.fetch_document("orders", "o-1").await.unwrap().unwrap();
        assert_eq!(doc.get("color"), None);
        assert_eq!(doc.get("size"), Some(&FieldValue::from("M")));
    }

    #[tokio::test]
    async fn test_delete_collection() {
        let store = memory_store().await;
        store.delete_collection("orders").await.unwrap();
        assert!(store.list_collections().await.unwrap().is_empty());

        let err = store.list_documents::<Document>("orders").await.unwrap_err();
        assert_eq!(err.code(), Some("NoSuchDomain"));
    }

    #[tokio::test]
    async fn test_delete_document_accepts_any_input() {
        let store = memory_store().await;
        store.insert_document("orders", order()).await.unwrap();

        store.delete_document("orders", "o-1").await.unwrap();
        assert!(store.fetch_document::<Document>("orders", "o-1").await.unwrap().is_none());

        store.insert_document("orders", order()).await.unwrap();
        store.delete_document("orders", order().into_mapping()).await.unwrap();
        assert!(store.fetch_document::<Document>("orders", "o-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_and_query() {
        let store = memory_store().await;
        for (id, color) in [("o-1", "red"), ("o-2", "blue"), ("o-3", "red")] {
            let doc = Document::new(id, Fieldset::new()).with_field("color", color);
            store.insert_document("orders", doc).await.unwrap();
        }

        let all = store.list_documents::<Document>("orders").await.unwrap();
        assert_eq!(all.len(), 3);

        let query = store
            .select()
            .filter("color = ?", &["red"])
            .order_by("color", Direction::Asc);
        let red = store.query::<Document>("orders", &query).await.unwrap();
        let ids: Vec<_> = red.iter().map(Document::id).collect();
        assert_eq!(ids, vec!["o-1", "o-3"]);

        let rows = store
            .query::<Fieldset>("orders", "select * from orders where itemName() = 'o-2'")
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["_id"], FieldValue::from("o-2"));
        assert_eq!(rows[0]["color"], FieldValue::from("blue"));
    }

    #[tokio::test]
    async fn test_query_sends_rendered_expression() {
        let (store, backend) = store_with(RecordingBackend::default()).await;
        let query = store.select().select("*").from("orders").filter_id("o-1");
        store.query::<Document>("orders", query).await.unwrap();

        assert_eq!(
            backend.calls().last(),
            Some(&Call::Select(
                "select * from orders where (itemName() = 'o-1')".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_invalid_query_is_runtime_error() {
        let store = memory_store().await;
        let err = store
            .query::<Document>("orders", "select * frm orders")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Runtime);
        assert_eq!(err.code(), Some("InvalidQueryExpression"));
    }

    #[test]
    fn test_connect_requires_credentials() {
        let err = DocumentStore::connect(&SimpleDbConfig::new("", "")).unwrap_err();
        assert!(err.is_invalid_argument());

        let config = SimpleDbConfig::new("key", "secret");
        assert!(DocumentStore::connect(&config).is_ok());
        assert!(DocumentStore::connect_with_transport(&config, reqwest::Client::new()).is_ok());
    }
}
