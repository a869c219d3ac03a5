use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Errors from the document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid document path segment: {0:?}")]
    InvalidPath(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Document at {0} is not a JSON object")]
    NotAnObject(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

const MAX_SEGMENT_BYTES: usize = 1500;

fn check_segment(segment: &str) -> Result<(), StoreError> {
    let valid = !segment.is_empty()
        && segment.len() <= MAX_SEGMENT_BYTES
        && segment != "."
        && segment != ".."
        && !segment.contains('/');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidPath(segment.to_string()))
    }
}

/// Slash-separated path naming a collection, e.g. `users/u1/pets`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

/// Path naming one document, e.g. `users/u1/pets/p1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentPath {
    collection: CollectionPath,
    id: String,
}

impl CollectionPath {
    pub fn root(name: &'static str) -> Self {
        debug_assert!(check_segment(name).is_ok());
        Self(name.to_string())
    }

    /// A document inside this collection. Ids come from clients, so they are checked.
    pub fn doc(&self, id: &str) -> Result<DocumentPath, StoreError> {
        check_segment(id)?;
        Ok(DocumentPath {
            collection: self.clone(),
            id: id.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl DocumentPath {
    pub fn collection(&self, name: &'static str) -> CollectionPath {
        debug_assert!(check_segment(name).is_ok());
        CollectionPath(format!("{}/{}/{}", self.collection.0, self.id, name))
    }

    pub fn parent(&self) -> &CollectionPath {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection.0, self.id)
    }
}

/// Fresh document id for a create.
pub fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Single-field predicates. Time comparisons parse the stored RFC 3339 string.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq { field: String, value: Value },
    AtOrAfter { field: String, at: DateTime<Utc> },
    AtOrBefore { field: String, at: DateTime<Utc> },
}

/// Ordering on a timestamp field. Documents lacking the field are left out of the result.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

/// Collection query: conjunction of filters, optional time ordering and limit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn at_or_after(mut self, field: &str, at: DateTime<Utc>) -> Self {
        self.filters.push(Filter::AtOrAfter {
            field: field.to_string(),
            at,
        });
        self
    }

    pub fn at_or_before(mut self, field: &str, at: DateTime<Utc>) -> Self {
        self.filters.push(Filter::AtOrBefore {
            field: field.to_string(),
            at,
        });
        self
    }

    pub fn order_by_time(mut self, field: &str, descending: bool) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            descending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Hierarchical document store. Documents are JSON objects addressed by path.
///
/// `merge` and `update` write only the given top-level fields; a `null` value removes
/// the field. `merge` creates the document when absent, `update` fails with `NotFound`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Value>, StoreError>;

    /// Replace the whole document.
    async fn set(&self, path: &DocumentPath, document: Value) -> Result<(), StoreError>;

    async fn merge(&self, path: &DocumentPath, fields: Map<String, Value>) -> Result<(), StoreError>;

    async fn update(&self, path: &DocumentPath, fields: Map<String, Value>) -> Result<(), StoreError>;

    /// Remove one document. Deleting a missing document is not an error, and
    /// documents in nested collections are left in place.
    async fn delete(&self, path: &DocumentPath) -> Result<(), StoreError>;

    async fn query(&self, collection: &CollectionPath, query: &Query) -> Result<Vec<Value>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;

    /// Release connections on shutdown.
    async fn close(&self) {}
}

/// Drop top-level nulls so absent fields stay absent.
pub(crate) fn strip_top_level_nulls(path: &DocumentPath, document: Value) -> Result<Map<String, Value>, StoreError> {
    match document {
        Value::Object(map) => Ok(map.into_iter().filter(|(_, v)| !v.is_null()).collect()),
        _ => Err(StoreError::NotAnObject(path.to_string())),
    }
}

pub(crate) fn parse_time(value: &Value) -> Option<DateTime<Utc>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}
