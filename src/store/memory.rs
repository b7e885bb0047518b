use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use super::{Document, DocumentStore, FieldValue, Fields, Query, StoreError};

/// Process-local document store used for tests, demos, and local development.
///
/// Queries follow the hosted store's semantics: equality filters must match exactly, and
/// ordering by a field drops documents that do not carry that field.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    sequence: AtomicU64,
    read_calls: AtomicUsize,
    write_calls: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a JSON object of `{ "collection": [ { "id": .., ..fields } ] }`.
    pub fn from_seed_json(seed: Value) -> Result<Self, StoreError> {
        let Value::Object(collections) = seed else {
            return Err(StoreError::InvalidSeed(
                "seed root must be an object keyed by collection".to_string(),
            ));
        };

        let store = Self::new();
        for (collection, documents) in collections {
            let Value::Array(documents) = documents else {
                return Err(StoreError::InvalidSeed(format!(
                    "collection '{collection}' must be an array of documents"
                )));
            };

            for (index, document) in documents.into_iter().enumerate() {
                let Value::Object(mut object) = document else {
                    return Err(StoreError::InvalidSeed(format!(
                        "{collection}[{index}] must be an object"
                    )));
                };
                let id = match object.remove("id") {
                    Some(Value::String(id)) if !id.is_empty() => id,
                    _ => {
                        return Err(StoreError::InvalidSeed(format!(
                            "{collection}[{index}] is missing a string 'id'"
                        )))
                    }
                };
                let fields = object
                    .into_iter()
                    .map(|(key, value)| (key, FieldValue::from(value)))
                    .collect();
                store.insert(&collection, Document::new(id, fields));
            }
        }

        Ok(store)
    }

    pub fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let raw = std::fs::read_to_string(path)?;
        let seed: Value = serde_json::from_str(&raw)
            .map_err(|err| StoreError::InvalidSeed(format!("seed is not valid JSON: {err}")))?;
        Self::from_seed_json(seed)
    }

    /// Insert or replace a document by id.
    pub fn insert(&self, collection: &str, document: Document) {
        let mut guard = self.lock();
        let documents = guard.entry(collection.to_string()).or_default();
        match documents.iter_mut().find(|existing| existing.id == document.id) {
            Some(existing) => *existing = document,
            None => documents.push(document),
        }
    }

    /// Snapshot of a collection in insertion order.
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.lock().get(collection).cloned().unwrap_or_default()
    }

    /// Make every subsequent read fail with [`StoreError::Unavailable`].
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent create fail with [`StoreError::Unavailable`].
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    /// Number of create calls received, including rejected ones.
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Document>>> {
        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads disabled".to_string()));
        }
        Ok(())
    }
}

fn matches_filters(document: &Document, query: &Query) -> bool {
    query
        .filters
        .iter()
        .all(|filter| document.field(&filter.field) == Some(&filter.value))
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn run_query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.check_reads()?;

        let mut documents: Vec<Document> = self
            .lock()
            .get(&query.collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| matches_filters(document, query))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(field) = &query.order_by {
            documents.retain(|document| document.field(field).is_some());
            documents.sort_by(|a, b| match (a.field(field), b.field(field)) {
                (Some(left), Some(right)) => left.compare(right),
                _ => std::cmp::Ordering::Equal,
            });
        }

        if let Some(limit) = query.limit {
            documents.truncate(limit);
        }

        Ok(documents)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.check_reads()?;

        Ok(self
            .lock()
            .get(collection)
            .and_then(|documents| documents.iter().find(|document| document.id == id))
            .cloned())
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("{collection}-{sequence:06}");
        self.insert(collection, Document::new(id.clone(), fields));
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn market(id: &str, name: &str, city: Option<&str>, active: bool) -> Document {
        let mut fields = Fields::new();
        fields.insert("name".to_string(), name.into());
        if let Some(city) = city {
            fields.insert("city".to_string(), city.into());
        }
        fields.insert("isActive".to_string(), active.into());
        Document::new(id, fields)
    }

    fn seeded() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.insert("markets", market("m3", "Grant Park Market", Some("Atlanta"), true));
        store.insert("markets", market("m1", "Decatur Farmers Market", Some("Decatur"), true));
        store.insert("markets", market("m2", "Closed Market", Some("Atlanta"), false));
        store.insert("markets", market("m4", "Marietta Square", Some("Marietta"), true));
        store
    }

    #[tokio::test]
    async fn run_query_filters_orders_and_limits() {
        let store = seeded();
        let query = Query::collection("markets")
            .where_eq("isActive", true)
            .order_by("name")
            .limit(2);

        let ids: Vec<String> = store
            .run_query(&query)
            .await
            .expect("query succeeds")
            .into_iter()
            .map(|document| document.id)
            .collect();

        assert_eq!(ids, vec!["m1", "m3"]);
    }

    #[tokio::test]
    async fn order_by_drops_documents_missing_the_field() {
        let store = seeded();
        let mut fields = Fields::new();
        fields.insert("isActive".to_string(), true.into());
        store.insert("markets", Document::new("unnamed", fields));

        let documents = store
            .run_query(&Query::collection("markets").order_by("name"))
            .await
            .expect("query succeeds");

        assert!(documents.iter().all(|document| document.id != "unnamed"));
        assert_eq!(documents.len(), 4);
    }

    #[tokio::test]
    async fn create_assigns_sequential_ids() {
        let store = InMemoryStore::new();
        let first = store
            .create("vendor_applications", Fields::new())
            .await
            .expect("create succeeds");
        let second = store
            .create("vendor_applications", Fields::new())
            .await
            .expect("create succeeds");

        assert_eq!(first, "vendor_applications-000001");
        assert_eq!(second, "vendor_applications-000002");
        assert_eq!(store.documents("vendor_applications").len(), 2);
        assert_eq!(store.write_calls(), 2);
    }

    #[tokio::test]
    async fn failure_injection_rejects_reads_and_writes() {
        let store = seeded();
        store.fail_reads(true);
        store.fail_writes(true);

        assert!(matches!(
            store.run_query(&Query::collection("markets")).await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.get("markets", "m1").await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.create("vendor_applications", Fields::new()).await,
            Err(StoreError::Unavailable(_))
        ));
        assert_eq!(store.write_calls(), 1);
        assert!(store.documents("vendor_applications").is_empty());
    }

    #[test]
    fn seed_json_requires_ids() {
        let store = InMemoryStore::from_seed_json(json!({
            "markets": [{ "id": "m1", "name": "Grant Park Market", "isActive": true }]
        }))
        .expect("seed loads");
        assert_eq!(store.documents("markets").len(), 1);

        let missing = InMemoryStore::from_seed_json(json!({ "markets": [{ "name": "x" }] }));
        assert!(matches!(missing, Err(StoreError::InvalidSeed(_))));
    }
}
