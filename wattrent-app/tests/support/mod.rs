#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use wattrent_app::app::AppContext;
use wattrent_app::config::AppConfig;
use wattrent_app::i18n::ActiveLanguage;
use wattrent_core::db::{LocalStore, MemoryLocalStore, MemoryRepository, RepositoryError, WattRentRepository};
use wattrent_core::{Bill, BillPatch, Language, NewBill, UserSettings};

// ── flaky repository ────────────────────────────────────────────────────

/// In-memory repository whose calls can be made to fail on demand.
#[derive(Default)]
pub struct FlakyRepository {
    pub inner: MemoryRepository,
    fail_create_bill: AtomicBool,
    fail_update_bill: AtomicBool,
    fail_get_settings: AtomicBool,
    fail_save_settings: AtomicBool,
    fail_update_reading: AtomicBool,
    calls: AtomicUsize,
}

impl FlakyRepository {
    pub fn fail_create_bill(&self, on: bool) {
        self.fail_create_bill.store(on, Ordering::SeqCst);
    }

    pub fn fail_update_bill(&self, on: bool) {
        self.fail_update_bill.store(on, Ordering::SeqCst);
    }

    pub fn fail_get_settings(&self, on: bool) {
        self.fail_get_settings.store(on, Ordering::SeqCst);
    }

    pub fn fail_save_settings(&self, on: bool) {
        self.fail_save_settings.store(on, Ordering::SeqCst);
    }

    pub fn fail_update_reading(&self, on: bool) {
        self.fail_update_reading.store(on, Ordering::SeqCst);
    }

    /// Number of repository calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn outage() -> RepositoryError {
    RepositoryError::Connection("simulated outage".to_string())
}

#[async_trait]
impl WattRentRepository for FlakyRepository {
    async fn create_bill(&self, bill: NewBill) -> Result<Bill, RepositoryError> {
        self.record();
        if self.fail_create_bill.load(Ordering::SeqCst) {
            return Err(RepositoryError::Remote("建立帳單失敗".to_string()));
        }
        self.inner.create_bill(bill).await
    }

    async fn list_bills(&self) -> Result<Vec<Bill>, RepositoryError> {
        self.record();
        self.inner.list_bills().await
    }

    async fn get_bill(&self, id: &str) -> Result<Bill, RepositoryError> {
        self.record();
        self.inner.get_bill(id).await
    }

    async fn update_bill(&self, id: &str, patch: &BillPatch) -> Result<Bill, RepositoryError> {
        self.record();
        if self.fail_update_bill.load(Ordering::SeqCst) {
            return Err(outage());
        }
        self.inner.update_bill(id, patch).await
    }

    async fn delete_bill(&self, id: &str) -> Result<(), RepositoryError> {
        self.record();
        self.inner.delete_bill(id).await
    }

    async fn get_settings(&self, user_id: &str) -> Result<UserSettings, RepositoryError> {
        self.record();
        if self.fail_get_settings.load(Ordering::SeqCst) {
            return Err(outage());
        }
        self.inner.get_settings(user_id).await
    }

    async fn save_settings(&self, settings: &UserSettings) -> Result<(), RepositoryError> {
        self.record();
        if self.fail_save_settings.load(Ordering::SeqCst) {
            return Err(RepositoryError::Remote("儲存設定失敗".to_string()));
        }
        self.inner.save_settings(settings).await
    }

    async fn update_previous_reading(&self, user_id: &str, reading: f64) -> Result<(), RepositoryError> {
        self.record();
        if self.fail_update_reading.load(Ordering::SeqCst) {
            return Err(outage());
        }
        self.inner.update_previous_reading(user_id, reading).await
    }

    async fn clear_settings(&self, user_id: &str) -> Result<(), RepositoryError> {
        self.record();
        self.inner.clear_settings(user_id).await
    }

    async fn health(&self) -> Result<String, RepositoryError> {
        self.record();
        self.inner.health().await
    }
}

// ── harness ─────────────────────────────────────────────────────────────

pub struct Harness {
    pub repo: Arc<FlakyRepository>,
    pub local: Arc<MemoryLocalStore>,
    pub ctx: AppContext,
}

/// English UI, memory stores, and `settings` stored remotely if given.
pub async fn harness(settings: Option<UserSettings>) -> Harness {
    let inner = match settings {
        Some(settings) => MemoryRepository::default().with_settings(settings).await,
        None => MemoryRepository::default(),
    };
    let repo = Arc::new(FlakyRepository {
        inner,
        ..FlakyRepository::default()
    });
    let local = Arc::new(MemoryLocalStore::new());

    let dyn_repo: Arc<dyn WattRentRepository> = repo.clone();
    let dyn_local: Arc<dyn LocalStore> = local.clone();
    let ctx = AppContext::new(
        AppConfig {
            backend: "memory".to_string(),
            ..AppConfig::default()
        },
        dyn_repo,
        dyn_local,
        ActiveLanguage::new(Language::En),
    );

    Harness { repo, local, ctx }
}

/// previous 1500, rate 4.5, rent 8000, landlord 王先生.
pub fn january_settings() -> UserSettings {
    UserSettings {
        previous_meter_reading: 1500.0,
        landlord_name: Some("王先生".to_string()),
        ..UserSettings::default()
    }
}
