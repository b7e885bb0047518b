//! Document store abstraction shared by the listing queries and the application workflow.
//!
//! The hosted database is consumed through three operations: a filtered/ordered query, a
//! point read, and a create. Backends are injected as `Arc<S>` so tests and local development
//! can swap the hosted store for [`InMemoryStore`].

pub mod document;
pub mod firestore;
pub mod memory;

use async_trait::async_trait;

pub use document::{Document, FieldValue, Fields};
pub use firestore::FirestoreStore;
pub use memory::InMemoryStore;

/// Equality predicate applied to a single top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: FieldValue,
}

/// Query over one collection: equality filters joined with AND, an optional ascending
/// order-by field, and an optional result limit.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<FieldFilter>,
    pub order_by: Option<String>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.filters.push(FieldFilter {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Storage seam for the hosted document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Return a snapshot of the documents matching `query`.
    async fn run_query(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Fetch a single document, `None` when it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Create a new document with a store-assigned id and return that id.
    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;
}

/// Error enumeration for document store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response from document store: {0}")]
    UnexpectedResponse(String),
    #[error("document '{id}' could not be decoded: {source}")]
    Decode {
        id: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("document store unavailable: {0}")]
    Unavailable(String),
    #[error("invalid document path: {0}")]
    InvalidPath(String),
    #[error("invalid seed data: {0}")]
    InvalidSeed(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
