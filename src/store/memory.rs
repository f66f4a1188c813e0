//! In-memory document store for tests

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{Document, DocumentStore, Fields, StoreError};

/// Documents keyed by their full slash-joined path (`users/u1/accounts/main`)
#[derive(Default)]
pub struct MemoryStore {
    documents: BTreeMap<String, Fields>,
    fail_with: Option<String>,
    requests: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document; `value` must be a JSON object
    pub fn with_document(mut self, path: &str, value: serde_json::Value) -> Self {
        let fields = match value {
            serde_json::Value::Object(map) => map,
            other => panic!("document must be an object, got {other}"),
        };
        self.documents.insert(path.to_string(), fields);
        self
    }

    /// Make every call fail with a status error carrying `message`
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Paths requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn record(&self, path: String) -> Result<(), StoreError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(path);
        }
        match &self.fail_with {
            Some(message) => Err(StoreError::Status {
                status: 503,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.record(collection.to_string())?;

        let prefix = format!("{}/", collection);
        Ok(self
            .documents
            .iter()
            .filter_map(|(path, fields)| {
                let id = path.strip_prefix(&prefix)?;
                // direct children only
                (!id.contains('/')).then(|| Document::new(id, fields.clone()))
            })
            .collect())
    }

    async fn get_document(&self, path: &[&str]) -> Result<Option<Fields>, StoreError> {
        let key = path.join("/");
        self.record(key.clone())?;
        Ok(self.documents.get(&key).cloned())
    }
}

/// Lets a test keep a handle on the store it hands to a viewer
#[async_trait]
impl DocumentStore for Arc<MemoryStore> {
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        (**self).list_documents(collection).await
    }

    async fn get_document(&self, path: &[&str]) -> Result<Option<Fields>, StoreError> {
        (**self).get_document(path).await
    }
}
