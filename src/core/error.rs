//! Viewer error categories
//!
//! Every store failure is mapped to one of these at the `Viewer` boundary.
//! The store's message is kept verbatim for the operator.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ViewerError {
    /// Credentials or endpoint unusable; the viewer cannot continue
    #[error("Failed to initialize the database client: {0}")]
    Initialization(#[source] StoreError),

    /// The user list could not be loaded
    #[error("Failed to load users: {0}")]
    Load(#[source] StoreError),

    /// A balance lookup failed
    #[error("Failed to fetch account information: {0}")]
    Query(#[source] StoreError),
}

impl ViewerError {
    /// Dialog title for this category
    pub fn title(&self) -> &'static str {
        match self {
            ViewerError::Initialization(_) => "Initialization Error",
            ViewerError::Load(_) => "Data Load Error",
            ViewerError::Query(_) => "Account Lookup Error",
        }
    }

    /// Whether the viewer must exit after reporting this error
    pub fn is_fatal(&self) -> bool {
        matches!(self, ViewerError::Initialization(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_keeps_store_error() {
        let err = ViewerError::Query(StoreError::Status {
            status: 403,
            message: "Missing or insufficient permissions.".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Failed to fetch account information: Server returned 403: Missing or insufficient permissions."
        );
        assert_eq!(err.title(), "Account Lookup Error");
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_only_initialization_is_fatal() {
        let init = ViewerError::Initialization(StoreError::Credentials("bad key".to_string()));
        let load = ViewerError::Load(StoreError::Parse("truncated".to_string()));
        assert!(init.is_fatal());
        assert!(!load.is_fatal());
    }
}
