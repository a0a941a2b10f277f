//! In-memory document store used by tests

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::error::StoreError;
use super::{Document, DocumentStore, Fields, Value, WriteBatch};

#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<BTreeMap<String, BTreeMap<String, Fields>>>,
    next_id: AtomicUsize,
    writes: AtomicUsize,
    reads: AtomicUsize,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
    id_token: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a document with a known identifier
    pub fn insert(&self, collection: &str, id: &str, fields: Fields) {
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    pub fn contains(&self, collection: &str, id: &str) -> bool {
        self.collections.lock().unwrap().get(collection).is_some_and(|docs| docs.contains_key(id))
    }

    pub fn count(&self, collection: &str) -> usize {
        self.collections.lock().unwrap().get(collection).map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn fields(&self, collection: &str, id: &str) -> Option<Fields> {
        self.collections.lock().unwrap().get(collection).and_then(|docs| docs.get(id).cloned())
    }

    /// Number of mutations attempted so far (including failed ones)
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of reads and queries issued so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Make every subsequent mutation fail without touching data
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent read or query fail
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn id_token(&self) -> Option<String> {
        self.id_token.lock().unwrap().clone()
    }

    fn begin_write(&self) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Simulated);
        }
        Ok(())
    }

    fn snapshot(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Simulated);
        }
        Ok(self
            .collections
            .lock()
            .unwrap()
            .get(collection)
            .map(|docs| {
                docs.iter().map(|(id, fields)| Document { id: id.clone(), fields: fields.clone() }).collect()
            })
            .unwrap_or_default())
    }
}

impl DocumentStore for MemoryStore {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.snapshot(collection)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        Ok(self.snapshot(collection)?.into_iter().find(|doc| doc.id == id))
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .snapshot(collection)?
            .into_iter()
            .filter(|doc| doc.fields.get(field) == Some(&value))
            .collect())
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError> {
        self.begin_write()?;
        let id = format!("doc{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.insert(collection, &id, fields);
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.begin_write()?;
        let mut collections = self.collections.lock().unwrap();
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        doc.extend(fields);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.begin_write()?;
        if let Some(docs) = self.collections.lock().unwrap().get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        self.begin_write()?;
        let mut collections = self.collections.lock().unwrap();
        for doc in batch.deletes() {
            if let Some(docs) = collections.get_mut(&doc.collection) {
                docs.remove(&doc.id);
            }
        }
        Ok(())
    }

    fn set_id_token(&self, token: Option<String>) {
        *self.id_token.lock().unwrap() = token;
    }
}
