use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, info};

use wattrent_client::HttpRepositoryFactory;
use wattrent_core::db::{
    LocalStore, MemoryLocalStore, MemoryRepositoryFactory, RepositoryRegistry, WattRentRepository,
};
use wattrent_core::recognition::MeterRecognizer;
use wattrent_store_sqlite::SqliteLocalStore;

use crate::bill_workflow::BillWorkflow;
use crate::capture::CaptureFlow;
use crate::config::AppConfig;
use crate::i18n::{ActiveLanguage, resolve_initial_language};
use crate::navigation::Navigation;
use crate::settings_session::SettingsSession;

/// Every backend this build knows about.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(HttpRepositoryFactory));
    registry.register(Box::new(MemoryRepositoryFactory));
    registry
}

/// Shared handles every surface is built from.
pub struct AppContext {
    pub config: AppConfig,
    pub repo: Arc<dyn WattRentRepository>,
    pub local: Arc<dyn LocalStore>,
    pub language: ActiveLanguage,
    pub navigation: Rc<RefCell<Navigation>>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        repo: Arc<dyn WattRentRepository>,
        local: Arc<dyn LocalStore>,
        language: ActiveLanguage,
    ) -> Self {
        Self {
            config,
            repo,
            local,
            language,
            navigation: Rc::new(RefCell::new(Navigation::default())),
        }
    }

    /// Connects the configured backend and local store and settles the
    /// display language.
    pub async fn bootstrap(config: AppConfig) -> anyhow::Result<Self> {
        debug!(backend = %config.backend, url = %config.api_base_url, "creating repository");
        let repo = build_registry()
            .create(&config.backend_config())
            .await
            .context("failed to create repository")?;

        let local: Arc<dyn LocalStore> = match &config.local_db {
            Some(path) => Arc::new(
                SqliteLocalStore::open(path)
                    .await
                    .context("failed to open local store")?,
            ),
            None => Arc::new(MemoryLocalStore::new()),
        };

        let locale = std::env::var("LANG").ok();
        let language = resolve_initial_language(local.as_ref(), locale.as_deref()).await;
        info!(%language, user_id = %config.user_id, "application ready");

        Ok(Self::new(config, repo, local, ActiveLanguage::new(language)))
    }

    pub fn settings_session(&self) -> SettingsSession {
        SettingsSession::new(
            self.config.user_id.clone(),
            Arc::clone(&self.repo),
            Arc::clone(&self.local),
            self.language.clone(),
            Rc::clone(&self.navigation),
        )
    }

    pub fn bill_workflow(&self) -> BillWorkflow {
        BillWorkflow::new(
            self.config.user_id.clone(),
            Arc::clone(&self.repo),
            Arc::clone(&self.local),
            self.language.clone(),
        )
    }

    pub fn capture_flow(
        &self,
        recognizer: Arc<dyn MeterRecognizer>,
    ) -> CaptureFlow {
        CaptureFlow::new(recognizer, Arc::clone(&self.local), self.language.clone())
    }
}
