//! Document store access
//!
//! The shared catalog lives in a hosted document database. Everything above
//! this module talks to it through [`DocumentStore`], which exposes only the
//! collection-query and document-mutation primitives the platform needs.

pub mod error;
pub mod firestore;
#[cfg(test)]
pub mod memory;
pub mod wire;

use std::collections::BTreeMap;
use std::future::Future;

pub use error::StoreError;
pub use firestore::FirestoreClient;

/// Collection holding video records
pub const VIDEOS: &str = "videos";
/// Collection holding quiz questions
pub const QUIZZES: &str = "quizzes";
/// Collection holding the admin allow-list
pub const ADMINS: &str = "admins";

/// Field values of a document, keyed by field name
pub type Fields = BTreeMap<String, Value>;

/// A single field value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Array(Vec<Value>),
    Map(Fields),
}

impl Value {
    /// Borrow the value as text, if it is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret the value as a non-negative integer.
    ///
    /// Accepts integers, integral doubles and numeric strings, since older
    /// writers did not always normalize numbers before persisting them.
    pub fn as_index(&self) -> Option<u64> {
        match self {
            Value::Integer(i) => u64::try_from(*i).ok(),
            Value::Double(d) if d.fract() == 0.0 && *d >= 0.0 => Some(*d as u64),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// A document as returned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Store-assigned identifier (last path segment)
    pub id: String,
    /// Field values
    pub fields: Fields,
}

impl Document {
    /// Read a string field, treating a missing or non-string field as empty
    pub fn text(&self, field: &str) -> String {
        self.fields.get(field).and_then(Value::as_str).unwrap_or_default().to_string()
    }
}

/// Address of a single document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentRef {
    pub collection: String,
    pub id: String,
}

impl DocumentRef {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self { collection: collection.into(), id: id.into() }
    }
}

/// A set of deletes applied by the store as one all-or-nothing unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    deletes: Vec<DocumentRef>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a delete of the given document
    pub fn delete(&mut self, doc: DocumentRef) -> &mut Self {
        self.deletes.push(doc);
        self
    }

    /// Documents queued for deletion, in insertion order
    pub fn deletes(&self) -> &[DocumentRef] {
        &self.deletes
    }

    pub fn len(&self) -> usize {
        self.deletes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deletes.is_empty()
    }
}

/// The primitives the platform needs from the hosted document database
pub trait DocumentStore {
    /// Fetch every document in a collection
    fn list(&self, collection: &str) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Fetch a single document, `None` if it does not exist
    fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<Option<Document>, StoreError>> + Send;

    /// Fetch the documents whose `field` equals `value`
    fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> impl Future<Output = Result<Vec<Document>, StoreError>> + Send;

    /// Insert a new document and return its store-assigned identifier
    fn create(
        &self,
        collection: &str,
        fields: Fields,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    /// Overwrite the given fields of an existing document
    fn update(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete a single document. Deleting a missing document succeeds.
    fn delete(&self, collection: &str, id: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Apply every write in the batch atomically
    fn commit(&self, batch: WriteBatch) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Attach (or drop) the signed-in principal's ID token to later requests
    fn set_id_token(&self, _token: Option<String>) {}
}
