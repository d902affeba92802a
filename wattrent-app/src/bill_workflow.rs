//! History and submission of bills.
//!
//! The local list only changes after the server has accepted a call.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use wattrent_core::calculations::{BillInput, calculate_bill, period_label, share_message};
use wattrent_core::db::{LocalCache, LocalStore, WattRentRepository};
use wattrent_core::{Bill, BillPatch, MeterReading, UserSettings};

use crate::error::AppError;
use crate::i18n::ActiveLanguage;

pub struct BillWorkflow {
    user_id: String,
    repo: Arc<dyn WattRentRepository>,
    local: Arc<dyn LocalStore>,
    language: ActiveLanguage,
    bills: Vec<Bill>,
}

impl BillWorkflow {
    pub fn new(
        user_id: impl Into<String>,
        repo: Arc<dyn WattRentRepository>,
        local: Arc<dyn LocalStore>,
        language: ActiveLanguage,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            repo,
            local,
            language,
            bills: Vec::new(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Bills as last delivered by the server, newest first.
    pub fn bills(&self) -> &[Bill] {
        &self.bills
    }

    pub async fn refresh(&mut self) -> Result<&[Bill], AppError> {
        self.bills = self.repo.list_bills().await?;
        debug!(count = self.bills.len(), "bills refreshed");
        Ok(&self.bills)
    }

    /// Settings to calculate with: remote, else the local cache, else
    /// the system defaults.
    pub async fn seed_settings(&self) -> UserSettings {
        match self.repo.get_settings(&self.user_id).await {
            Ok(settings) => return settings,
            Err(error) => warn!(%error, "remote settings unavailable, trying local cache"),
        }
        match self.local.cached_settings().await {
            Ok(Some(settings)) => settings,
            Ok(None) => UserSettings::system_defaults(&self.user_id),
            Err(error) => {
                warn!(%error, "local settings cache unreadable");
                UserSettings::system_defaults(&self.user_id)
            }
        }
    }

    /// Input for `current_reading` using the seeded rate, rent and
    /// previous reading.
    pub async fn seed_input(
        &self,
        current_reading: f64,
    ) -> BillInput {
        let settings = self.seed_settings().await;
        BillInput {
            current_reading,
            previous_reading: settings.previous_meter_reading,
            electricity_rate: settings.default_electricity_rate,
            rent: settings.default_rent,
        }
    }

    /// Calculates and persists a bill. Settings are left untouched.
    pub async fn submit(
        &mut self,
        input: &BillInput,
        reading: Option<&MeterReading>,
        today: NaiveDate,
    ) -> Result<Bill, AppError> {
        let mut draft = calculate_bill(input, period_label(today, self.language.get()))?;
        if let Some(reading) = reading {
            draft = draft.with_meter_reading(reading);
        }

        let bill = self.repo.create_bill(draft).await?;
        info!(id = %bill.id, total = bill.total_amount, period = %bill.period, "bill created");
        self.bills.insert(0, bill.clone());
        Ok(bill)
    }

    /// Unpaid → paid also advances the stored previous reading to this
    /// bill's reading. Paid → unpaid never moves it back.
    pub async fn toggle_paid(
        &mut self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<Bill, AppError> {
        let was_paid = match self.find(id) {
            Some(bill) => bill.is_paid(),
            None => self.repo.get_bill(id).await?.is_paid(),
        };
        let patch = if was_paid {
            BillPatch::mark_unpaid()
        } else {
            BillPatch::mark_paid(now)
        };

        let updated = self.repo.update_bill(id, &patch).await?;
        info!(id, paid = updated.is_paid(), "payment status changed");
        match self.bills.iter_mut().find(|bill| bill.id == id) {
            Some(slot) => *slot = updated.clone(),
            None => self.bills.insert(0, updated.clone()),
        }

        if !was_paid {
            self.advance_previous_reading(updated.meter_reading).await;
        }
        Ok(updated)
    }

    pub async fn delete(
        &mut self,
        id: &str,
    ) -> Result<(), AppError> {
        self.repo.delete_bill(id).await?;
        self.bills.retain(|bill| bill.id != id);
        info!(id, "bill deleted");
        Ok(())
    }

    /// The bill's stored message, or one composed in the active language.
    pub async fn share_message(
        &self,
        id: &str,
    ) -> Result<String, AppError> {
        let bill = match self.find(id) {
            Some(bill) => bill.clone(),
            None => self.repo.get_bill(id).await?,
        };
        let landlord = match self.local.cached_settings().await {
            Ok(settings) => settings.and_then(|settings| settings.landlord_name),
            Err(error) => {
                warn!(%error, "local settings cache unreadable");
                None
            }
        };
        Ok(share_message(&bill, self.language.get(), landlord.as_deref()))
    }

    fn find(
        &self,
        id: &str,
    ) -> Option<&Bill> {
        self.bills.iter().find(|bill| bill.id == id)
    }

    /// Failures are logged only; the payment itself already succeeded.
    async fn advance_previous_reading(
        &self,
        reading: f64,
    ) {
        if let Err(error) = self.repo.update_previous_reading(&self.user_id, reading).await {
            warn!(%error, reading, "could not advance previous meter reading");
            return;
        }
        debug!(reading, "previous meter reading advanced");

        match self.local.cached_settings().await {
            Ok(Some(mut cached)) => {
                cached.previous_meter_reading = reading;
                if let Err(error) = self.local.cache_settings(&cached).await {
                    warn!(%error, "could not update cached previous reading");
                }
            }
            Ok(None) => {}
            Err(error) => warn!(%error, "local settings cache unreadable"),
        }
    }
}

