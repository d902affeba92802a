use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Bill, BillPatch, NewBill, UserSettings};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    /// The server answered with `success: false` or a non-2xx status.
    #[error("{0}")]
    Remote(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl RepositoryError {
    /// Network-level failures the user can retry; business errors are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout { .. })
    }
}

/// The remote store for bills and per-user settings.
///
/// Every call is a network round trip with no transactional guarantee.
/// Callers mutate their own state only after a call returns `Ok`.
#[async_trait]
pub trait WattRentRepository: Send + Sync {
    // Bills
    async fn create_bill(
        &self,
        bill: NewBill,
    ) -> Result<Bill, RepositoryError>;

    async fn list_bills(&self) -> Result<Vec<Bill>, RepositoryError>;

    async fn get_bill(
        &self,
        id: &str,
    ) -> Result<Bill, RepositoryError>;

    async fn update_bill(
        &self,
        id: &str,
        patch: &BillPatch,
    ) -> Result<Bill, RepositoryError>;

    async fn delete_bill(
        &self,
        id: &str,
    ) -> Result<(), RepositoryError>;

    // Settings
    async fn get_settings(
        &self,
        user_id: &str,
    ) -> Result<UserSettings, RepositoryError>;

    async fn save_settings(
        &self,
        settings: &UserSettings,
    ) -> Result<(), RepositoryError>;

    async fn update_previous_reading(
        &self,
        user_id: &str,
        reading: f64,
    ) -> Result<(), RepositoryError>;

    async fn clear_settings(
        &self,
        user_id: &str,
    ) -> Result<(), RepositoryError>;

    // Connectivity
    async fn health(&self) -> Result<String, RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_operation_and_deadline() {
        let error = RepositoryError::Timeout {
            operation: "get settings",
            after: Duration::from_secs(10),
        };

        assert_eq!(error.to_string(), "get settings timed out after 10s");
    }

    #[test]
    fn remote_error_displays_server_text_verbatim() {
        let error = RepositoryError::Remote("用戶ID不能為空".to_string());

        assert_eq!(error.to_string(), "用戶ID不能為空");
    }

    #[test]
    fn only_network_failures_are_transient() {
        assert!(RepositoryError::Connection("refused".into()).is_transient());
        assert!(
            RepositoryError::Timeout {
                operation: "x",
                after: Duration::from_secs(1)
            }
            .is_transient()
        );
        assert!(!RepositoryError::Remote("nope".into()).is_transient());
        assert!(!RepositoryError::NotFound.is_transient());
    }
}
