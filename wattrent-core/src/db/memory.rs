//! Process-local backend with the same observable behaviour as the server.
//!
//! Used for offline demos (`--backend memory`) and as the collaborator in
//! session tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::factory::{BackendConfig, RepositoryFactory};
use super::repository::{RepositoryError, WattRentRepository};
use crate::calculations::compose_message;
use crate::models::{Bill, BillPatch, Language, NewBill, UserSettings, DEFAULT_USER_ID};

#[derive(Default)]
struct MemoryState {
    bills: HashMap<String, Bill>,
    settings: HashMap<String, UserSettings>,
}

/// In-memory [`WattRentRepository`].
///
/// Bills are owned by a single configured user. Settings missing for a
/// user read back as the system defaults, like the server does.
pub struct MemoryRepository {
    user_id: String,
    state: RwLock<MemoryState>,
}

impl MemoryRepository {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            state: RwLock::new(MemoryState::default()),
        }
    }

    /// Seeds stored settings, bypassing validation.
    pub async fn with_settings(
        self,
        settings: UserSettings,
    ) -> Self {
        self.state
            .write()
            .await
            .settings
            .insert(settings.user_id.clone(), settings);
        self
    }

    pub async fn bill_count(&self) -> usize {
        self.state.read().await.bills.len()
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new(DEFAULT_USER_ID)
    }
}

#[async_trait]
impl WattRentRepository for MemoryRepository {
    async fn create_bill(
        &self,
        bill: NewBill,
    ) -> Result<Bill, RepositoryError> {
        let mut created = Bill {
            id: Uuid::new_v4().to_string(),
            user_id: self.user_id.clone(),
            meter_reading_id: bill
                .meter_reading_id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            meter_reading: bill.meter_reading,
            previous_reading: bill.previous_reading,
            electricity_usage: bill.electricity_usage,
            electricity_rate: bill.electricity_rate,
            electricity_cost: bill.electricity_cost,
            rent: bill.rent,
            total_amount: bill.total_amount,
            period: bill.period,
            created_at: Utc::now(),
            paid_at: None,
            message: bill.message,
        };
        if created.message.is_none() {
            created.message = Some(compose_message(&created, Language::ZhTw, None));
        }

        debug!(id = %created.id, "memory: bill created");
        self.state
            .write()
            .await
            .bills
            .insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn list_bills(&self) -> Result<Vec<Bill>, RepositoryError> {
        let state = self.state.read().await;
        let mut bills: Vec<Bill> = state
            .bills
            .values()
            .filter(|bill| bill.user_id == self.user_id)
            .cloned()
            .collect();
        // Newest first
        bills.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bills)
    }

    async fn get_bill(
        &self,
        id: &str,
    ) -> Result<Bill, RepositoryError> {
        self.state
            .read()
            .await
            .bills
            .get(id)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn update_bill(
        &self,
        id: &str,
        patch: &BillPatch,
    ) -> Result<Bill, RepositoryError> {
        let mut state = self.state.write().await;
        let bill = state.bills.get_mut(id).ok_or(RepositoryError::NotFound)?;
        bill.apply(patch);
        Ok(bill.clone())
    }

    async fn delete_bill(
        &self,
        id: &str,
    ) -> Result<(), RepositoryError> {
        self.state
            .write()
            .await
            .bills
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn get_settings(
        &self,
        user_id: &str,
    ) -> Result<UserSettings, RepositoryError> {
        if user_id.is_empty() {
            return Err(RepositoryError::Remote("user id must not be empty".to_string()));
        }
        Ok(self
            .state
            .read()
            .await
            .settings
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| UserSettings::system_defaults(user_id)))
    }

    async fn save_settings(
        &self,
        settings: &UserSettings,
    ) -> Result<(), RepositoryError> {
        if settings.user_id.is_empty() {
            return Err(RepositoryError::Remote("user id must not be empty".to_string()));
        }
        self.state
            .write()
            .await
            .settings
            .insert(settings.user_id.clone(), settings.clone());
        Ok(())
    }

    async fn update_previous_reading(
        &self,
        user_id: &str,
        reading: f64,
    ) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        state
            .settings
            .entry(user_id.to_string())
            .or_insert_with(|| UserSettings::system_defaults(user_id))
            .previous_meter_reading = reading;
        Ok(())
    }

    async fn clear_settings(
        &self,
        user_id: &str,
    ) -> Result<(), RepositoryError> {
        self.state.write().await.settings.remove(user_id);
        Ok(())
    }

    async fn health(&self) -> Result<String, RepositoryError> {
        Ok("in-memory backend ready".to_string())
    }
}

/// [`RepositoryFactory`] for the `"memory"` backend.
///
/// The connection string is ignored; every call to `create` starts empty.
pub struct MemoryRepositoryFactory;

#[async_trait]
impl RepositoryFactory for MemoryRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        _config: &BackendConfig,
    ) -> Result<Arc<dyn WattRentRepository>, RepositoryError> {
        Ok(Arc::new(MemoryRepository::default()))
    }
}
