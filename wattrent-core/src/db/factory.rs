use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::repository::{RepositoryError, WattRentRepository};

/// Which backend to talk to and how to reach it.
///
/// `backend` selects a registered [`RepositoryFactory`] by name; the
/// factory alone interprets `connection`.
///
/// | backend  | connection examples                      |
/// |----------|------------------------------------------|
/// | `http`   | `http://localhost:8080/api/v1`           |
/// | `memory` | ignored                                  |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub backend: String,
    /// Base URL for `http`.
    pub connection: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            backend: "http".to_string(),
            connection: "http://localhost:8080/api/v1".to_string(),
        }
    }
}

/// Builds a [`WattRentRepository`] for one backend.
#[async_trait]
pub trait RepositoryFactory: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// Build a ready-to-use repository.  No network traffic is required
    /// here; connectivity problems surface on the first real call.
    async fn create(
        &self,
        config: &BackendConfig,
    ) -> Result<Arc<dyn WattRentRepository>, RepositoryError>;
}

/// Factories keyed by backend name.
pub struct RepositoryRegistry {
    factories: HashMap<&'static str, Box<dyn RepositoryFactory>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// A later factory with the same name wins.
    pub fn register(
        &mut self,
        factory: Box<dyn RepositoryFactory>,
    ) {
        self.factories.insert(factory.backend_name(), factory);
    }

    /// Names of every registered backend, sorted alphabetically.
    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.factories.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Fails with [`RepositoryError::Configuration`] for an unknown
    /// backend; otherwise returns whatever the factory returns.
    pub async fn create(
        &self,
        config: &BackendConfig,
    ) -> Result<Arc<dyn WattRentRepository>, RepositoryError> {
        let factory = self
            .factories
            .get(config.backend.as_str())
            .ok_or_else(|| {
                RepositoryError::Configuration(format!(
                    "unknown backend '{}'; available: {:?}",
                    config.backend,
                    self.available_backends()
                ))
            })?;

        factory.create(config).await
    }
}

impl Default for RepositoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}
