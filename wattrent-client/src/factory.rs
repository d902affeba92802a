use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use wattrent_core::db::factory::{BackendConfig, RepositoryFactory};
use wattrent_core::db::repository::{RepositoryError, WattRentRepository};

use crate::client::HttpRepository;

/// [`RepositoryFactory`] for the `"http"` backend.
///
/// `connection` is the API base URL.
pub struct HttpRepositoryFactory;

#[async_trait]
impl RepositoryFactory for HttpRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "http"
    }

    async fn create(
        &self,
        config: &BackendConfig,
    ) -> Result<Arc<dyn WattRentRepository>, RepositoryError> {
        let repo = HttpRepository::new(config.connection.as_str())?;
        info!(base_url = %repo.base_url(), "HTTP repository ready");
        Ok(Arc::new(repo))
    }
}
