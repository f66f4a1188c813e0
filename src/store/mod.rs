//! Remote document store
//!
//! The rest of the viewer only sees the [`DocumentStore`] trait. The real
//! implementation talks to the Firestore REST API; tests use [`MemoryStore`].

mod firestore;
#[cfg(test)]
mod memory;
mod service_account;
mod token;

use async_trait::async_trait;
use thiserror::Error;

pub use firestore::FirestoreClient;
#[cfg(test)]
pub use memory::MemoryStore;
pub use service_account::ServiceAccountKey;

/// Decoded fields of a document
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// A document returned by a collection listing
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Errors that can occur talking to the document store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Credential error: {0}")]
    Credentials(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Read-only access to a document database
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// List every document in a top-level collection
    async fn list_documents(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Fetch one document by its path segments; `None` if it does not exist
    async fn get_document(&self, path: &[&str]) -> Result<Option<Fields>, StoreError>;
}
