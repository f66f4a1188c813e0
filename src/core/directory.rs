//! User directory - the in-memory index of the `users` collection

use std::collections::HashMap;

use crate::store::{DocumentStore, Fields, StoreError};

/// Top-level collection holding one document per user
pub const USERS_COLLECTION: &str = "users";

/// One user as loaded at startup
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub document_id: String,
    pub fields: Fields,
    /// The `name` field, or the document id when there is no string name
    pub display_name: String,
}

impl UserRecord {
    pub fn new(document_id: String, fields: Fields) -> Self {
        let display_name = fields
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| document_id.clone());

        Self {
            document_id,
            fields,
            display_name,
        }
    }
}

/// Read-only index of users, kept in enumeration order
#[derive(Debug, Default)]
pub struct DirectoryIndex {
    records: Vec<UserRecord>,
    by_id: HashMap<String, usize>,
}

impl DirectoryIndex {
    /// Enumerate the users collection once and index it
    pub async fn load(store: &dyn DocumentStore) -> Result<Self, StoreError> {
        let documents = store.list_documents(USERS_COLLECTION).await?;
        let index = Self::from_records(
            documents
                .into_iter()
                .map(|doc| UserRecord::new(doc.id, doc.fields)),
        );

        tracing::info!("Loaded {} users", index.len());
        for name in index.duplicate_names() {
            tracing::warn!(
                "Display name {:?} is shared by several users; selecting it shows the first one",
                name
            );
        }

        Ok(index)
    }

    pub fn from_records(records: impl IntoIterator<Item = UserRecord>) -> Self {
        let mut index = Self::default();
        for record in records {
            // A repeated id replaces the earlier record in place.
            match index.by_id.get(&record.document_id) {
                Some(&pos) => index.records[pos] = record,
                None => {
                    index.by_id.insert(record.document_id.clone(), index.records.len());
                    index.records.push(record);
                }
            }
        }
        index
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, document_id: &str) -> Option<&UserRecord> {
        self.by_id.get(document_id).map(|&pos| &self.records[pos])
    }

    /// Display names for the dropdown: sorted, duplicates kept
    pub fn display_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .records
            .iter()
            .map(|r| r.display_name.clone())
            .collect();
        names.sort();
        names
    }

    /// Map a display name back to a document id.
    ///
    /// Linear scan; the first record in enumeration order wins when several
    /// users share a display name.
    pub fn resolve(&self, display_name: &str) -> Option<&str> {
        self.records
            .iter()
            .find(|r| r.display_name == display_name)
            .map(|r| r.document_id.as_str())
    }

    fn duplicate_names(&self) -> Vec<&str> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in &self.records {
            *counts.entry(record.display_name.as_str()).or_default() += 1;
        }
        let mut dups: Vec<&str> = counts
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(name, _)| name)
            .collect();
        dups.sort_unstable();
        dups
    }
}
