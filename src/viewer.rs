//! Application context
//!
//! Owns the store handle and the user directory, runs startup, and turns each
//! dropdown selection into label text plus an optional dialog.

use crate::core::{present, BalanceOutcome, DirectoryIndex, ViewerError};
use crate::settings::Settings;
use crate::store::{DocumentStore, FirestoreClient};

/// Severity of a dialog shown to the operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A modal message for the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
    /// Dismissing this notice ends the program
    pub fatal: bool,
}

impl Notice {
    pub fn info(title: &str, message: &str) -> Self {
        Self {
            kind: NoticeKind::Info,
            title: title.to_string(),
            message: message.to_string(),
            fatal: false,
        }
    }
}

impl From<&ViewerError> for Notice {
    fn from(err: &ViewerError) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: err.title().to_string(),
            message: err.to_string(),
            fatal: err.is_fatal(),
        }
    }
}

/// Result of one selection: the new label and, on failure, a dialog
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub outcome: BalanceOutcome,
    pub notice: Option<Notice>,
}

/// The running viewer
pub struct Viewer {
    store: Box<dyn DocumentStore>,
    directory: DirectoryIndex,
    currency: String,
}

impl Viewer {
    /// Connect to the database and load the user directory.
    ///
    /// Only a failed connection is an error; a failed load yields an empty
    /// viewer plus a notice.
    pub async fn start(settings: &Settings) -> Result<(Self, Option<Notice>), ViewerError> {
        let client = FirestoreClient::connect(settings)
            .await
            .map_err(ViewerError::Initialization)?;

        Ok(Self::with_store(Box::new(client), &settings.currency_suffix).await)
    }

    /// Load the directory through an already connected store
    pub async fn with_store(store: Box<dyn DocumentStore>, currency: &str) -> (Self, Option<Notice>) {
        let (directory, notice) = match DirectoryIndex::load(store.as_ref()).await {
            Ok(directory) if directory.is_empty() => {
                (directory, Some(Notice::info("Information", "No users found.")))
            }
            Ok(directory) => (directory, None),
            Err(e) => {
                let err = ViewerError::Load(e);
                tracing::error!("{}", err);
                (DirectoryIndex::default(), Some(Notice::from(&err)))
            }
        };

        let viewer = Self {
            store,
            directory,
            currency: currency.to_string(),
        };
        (viewer, notice)
    }

    /// Dropdown entries, sorted
    pub fn display_names(&self) -> Vec<String> {
        self.directory.display_names()
    }

    #[cfg(test)]
    pub fn directory(&self) -> &DirectoryIndex {
        &self.directory
    }

    /// Resolve a selected display name and look up its balance
    pub async fn select(&self, display_name: &str) -> Selection {
        tracing::debug!("Selected {:?}", display_name);

        let Some(document_id) = self.directory.resolve(display_name) else {
            tracing::warn!("No user matches display name {:?}", display_name);
            return Selection {
                outcome: BalanceOutcome::UserNotFound,
                notice: None,
            };
        };

        if let Some(record) = self.directory.get(document_id) {
            tracing::debug!(
                "Resolved {:?} to {} ({} fields)",
                display_name,
                record.document_id,
                record.fields.len()
            );
        }

        match present(self.store.as_ref(), document_id, &self.currency).await {
            Ok(outcome) => Selection {
                outcome,
                notice: None,
            },
            Err(e) => {
                let err = ViewerError::Query(e);
                tracing::error!("Balance lookup for {} failed: {}", document_id, err);
                Selection {
                    outcome: BalanceOutcome::QueryError,
                    notice: Some(Notice::from(&err)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::store::MemoryStore;
    use serde_json::json;

    fn scenario_store() -> MemoryStore {
        MemoryStore::new()
            .with_document("users/u1", json!({"name": "Alice"}))
            .with_document("users/u2", json!({}))
            .with_document("users/u2/accounts/main", json!({"balance": 50000}))
    }

    #[tokio::test]
    async fn test_scenario_select_user_without_name() {
        let (viewer, notice) = Viewer::with_store(Box::new(scenario_store()), "KRW").await;
        assert!(notice.is_none());
        assert_eq!(viewer.display_names(), vec!["Alice", "u2"]);

        let selection = viewer.select("u2").await;
        assert_eq!(selection.outcome.to_string(), "Balance: 50,000 KRW");
        assert!(selection.notice.is_none());
    }

    #[tokio::test]
    async fn test_missing_account_is_not_an_error() {
        let (viewer, _) = Viewer::with_store(Box::new(scenario_store()), "KRW").await;

        let selection = viewer.select("Alice").await;
        assert_eq!(selection.outcome, BalanceOutcome::AccountNotFound);
        assert!(selection.notice.is_none());
    }

    #[tokio::test]
    async fn test_reselecting_same_user_queries_again() {
        let store = Arc::new(scenario_store());
        let (viewer, _) = Viewer::with_store(Box::new(store.clone()), "KRW").await;

        let first = viewer.select("u2").await;
        let second = viewer.select("u2").await;
        assert_eq!(first, second);
        assert_eq!(
            store.requests(),
            vec!["users", "users/u2/accounts/main", "users/u2/accounts/main"]
        );
    }

    #[tokio::test]
    async fn test_unknown_display_name() {
        let (viewer, _) = Viewer::with_store(Box::new(scenario_store()), "KRW").await;

        let selection = viewer.select("Mallory").await;
        assert_eq!(selection.outcome.to_string(), "Balance: user not found");
        assert!(selection.notice.is_none());
    }

    #[tokio::test]
    async fn test_empty_directory_reports_info() {
        let (viewer, notice) = Viewer::with_store(Box::new(MemoryStore::new()), "KRW").await;
        assert!(viewer.display_names().is_empty());

        let notice = notice.unwrap();
        assert_eq!(notice.kind, NoticeKind::Info);
        assert!(!notice.fatal);
    }

    #[tokio::test]
    async fn test_load_failure_leaves_viewer_usable() {
        let store = MemoryStore::failing("permission denied");
        let (viewer, notice) = Viewer::with_store(Box::new(store), "KRW").await;

        assert!(viewer.directory().is_empty());
        let notice = notice.unwrap();
        assert_eq!(notice.kind, NoticeKind::Error);
        assert_eq!(notice.title, "Data Load Error");
        assert!(notice.message.contains("permission denied"));
        assert!(!notice.fatal);

        let selection = viewer.select("anyone").await;
        assert_eq!(selection.outcome, BalanceOutcome::UserNotFound);
    }

    #[tokio::test]
    async fn test_query_failure_sets_placeholder_and_dialog() {
        // Directory loaded from one store, lookups served by a failing one.
        let directory = DirectoryIndex::load(&scenario_store()).await.unwrap();
        let viewer = Viewer {
            store: Box::new(MemoryStore::failing("deadline exceeded")),
            directory,
            currency: "KRW".to_string(),
        };

        let selection = viewer.select("u2").await;
        assert_eq!(selection.outcome.to_string(), "Balance: query error");
        let notice = selection.notice.unwrap();
        assert_eq!(notice.title, "Account Lookup Error");
        assert!(notice.message.contains("deadline exceeded"));
    }

    #[tokio::test]
    async fn test_start_without_credentials_is_fatal() {
        let err = Viewer::start(&Settings::default()).await.err().unwrap();
        assert!(err.is_fatal());
        let notice = Notice::from(&err);
        assert!(notice.fatal);
        assert!(notice.message.contains("credential_path is not configured"));
    }
}
