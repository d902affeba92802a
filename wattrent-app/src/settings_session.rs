//! Settings surface: a text draft reconciled against a confirmed baseline.
//!
//! The baseline is whatever the server last confirmed (or the system
//! defaults when it could not be reached). The draft is dirty while any
//! field differs from it. Everything that needs the current answer reads
//! through the shared [`SettingsState`] cell, never a copy.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use tracing::{debug, info, warn};

use wattrent_core::db::{LocalCache, LocalStore, WattRentRepository};
use wattrent_core::{UiPreferences, UserSettings};

use crate::advisory::Advisory;
use crate::error::{AppError, Field, ValidationError};
use crate::i18n::ActiveLanguage;
use crate::navigation::{Navigation, Surface};
use crate::utils::{number_text, parse_field, same_number};

/// Editable copy of the settings, numbers held as typed text.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsDraft {
    pub electricity_rate: String,
    pub rent: String,
    pub previous_reading: String,
    pub landlord_name: String,
    pub payment_method: String,
    pub preferences: UiPreferences,
}

impl SettingsDraft {
    pub fn from_settings(
        settings: &UserSettings,
        preferences: UiPreferences,
    ) -> Self {
        Self {
            electricity_rate: number_text(settings.default_electricity_rate),
            rent: number_text(settings.default_rent),
            previous_reading: number_text(settings.previous_meter_reading),
            landlord_name: settings.landlord_name_or_empty().to_string(),
            payment_method: settings.payment_method_or_empty().to_string(),
            preferences,
        }
    }

    /// Validates the numbers; blank text fields become `None`.
    pub fn to_settings(
        &self,
        user_id: &str,
    ) -> Result<UserSettings, ValidationError> {
        let optional = |text: &str| {
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        };
        Ok(UserSettings {
            user_id: user_id.to_string(),
            default_electricity_rate: parse_field(Field::ElectricityRate, &self.electricity_rate)?,
            default_rent: parse_field(Field::Rent, &self.rent)?,
            previous_meter_reading: parse_field(Field::PreviousReading, &self.previous_reading)?,
            landlord_name: optional(&self.landlord_name),
            payment_method: optional(&self.payment_method),
        })
    }

    /// True when any field differs. Numbers compare by value.
    pub fn differs_from(
        &self,
        other: &Self,
    ) -> bool {
        !same_number(&self.electricity_rate, &other.electricity_rate)
            || !same_number(&self.rent, &other.rent)
            || !same_number(&self.previous_reading, &other.previous_reading)
            || self.landlord_name != other.landlord_name
            || self.payment_method != other.payment_method
            || self.preferences != other.preferences
    }
}

#[derive(Debug, Clone)]
pub struct SettingsState {
    draft: SettingsDraft,
    baseline: Option<SettingsDraft>,
    confirmed: Option<UserSettings>,
}

impl SettingsState {
    fn new(user_id: &str) -> Self {
        Self {
            draft: SettingsDraft::from_settings(
                &UserSettings::system_defaults(user_id),
                UiPreferences::default(),
            ),
            baseline: None,
            confirmed: None,
        }
    }

    fn reset_to(
        &mut self,
        settings: UserSettings,
        preferences: UiPreferences,
    ) {
        let draft = SettingsDraft::from_settings(&settings, preferences);
        self.baseline = Some(draft.clone());
        self.draft = draft;
        self.confirmed = Some(settings);
    }

    pub fn draft(&self) -> &SettingsDraft {
        &self.draft
    }

    /// Nothing is dirty before the first load.
    pub fn is_dirty(&self) -> bool {
        self.baseline
            .as_ref()
            .is_some_and(|baseline| self.draft.differs_from(baseline))
    }
}

/// Answers "may we leave settings?" from the live state.
#[derive(Clone)]
pub struct LeaveGuard {
    state: Rc<RefCell<SettingsState>>,
}

impl LeaveGuard {
    pub fn blocks_leaving(&self) -> bool {
        self.state.borrow().is_dirty()
    }
}

/// The user's answer to the unsaved-changes dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveChoice {
    Discard,
    SaveAndLeave,
    Stay,
}

pub struct SettingsSession {
    user_id: String,
    repo: Arc<dyn WattRentRepository>,
    local: Arc<dyn LocalStore>,
    language: ActiveLanguage,
    navigation: Rc<RefCell<Navigation>>,
    state: Rc<RefCell<SettingsState>>,
}

impl SettingsSession {
    pub fn new(
        user_id: impl Into<String>,
        repo: Arc<dyn WattRentRepository>,
        local: Arc<dyn LocalStore>,
        language: ActiveLanguage,
        navigation: Rc<RefCell<Navigation>>,
    ) -> Self {
        let user_id = user_id.into();
        let state = Rc::new(RefCell::new(SettingsState::new(&user_id)));
        Self {
            user_id,
            repo,
            local,
            language,
            navigation,
            state,
        }
    }

    pub fn leave_guard(&self) -> LeaveGuard {
        LeaveGuard {
            state: Rc::clone(&self.state),
        }
    }

    /// Registers the leave guard with navigation, then loads.
    pub async fn mount(&self) {
        self.navigation
            .borrow_mut()
            .mount_settings_guard(self.leave_guard());
        self.load().await;
    }

    pub fn draft(&self) -> SettingsDraft {
        self.state.borrow().draft.clone()
    }

    pub fn confirmed(&self) -> Option<UserSettings> {
        self.state.borrow().confirmed.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.state.borrow().is_dirty()
    }

    pub fn edit(
        &self,
        change: impl FnOnce(&mut SettingsDraft),
    ) {
        change(&mut self.state.borrow_mut().draft);
    }

    /// Fetches remote settings. Failure is logged and the system
    /// defaults are shown instead; the user sees no dialog.
    pub async fn load(&self) {
        let settings = match self.repo.get_settings(&self.user_id).await {
            Ok(settings) => {
                if let Err(error) = self.local.cache_settings(&settings).await {
                    warn!(%error, "could not cache settings locally");
                }
                settings
            }
            Err(error) => {
                warn!(%error, user_id = %self.user_id, "settings fetch failed, using defaults");
                UserSettings::system_defaults(&self.user_id)
            }
        };
        let preferences = self.stored_preferences().await;
        self.state.borrow_mut().reset_to(settings, preferences);
        debug!(user_id = %self.user_id, "settings loaded");
    }

    /// Drops edits: remote state, else the last baseline, else defaults.
    pub async fn discard(&self) {
        let fallback = self.state.borrow().confirmed.clone();
        let settings = match self.repo.get_settings(&self.user_id).await {
            Ok(settings) => settings,
            Err(error) => {
                warn!(%error, "settings re-fetch failed on discard");
                fallback.unwrap_or_else(|| UserSettings::system_defaults(&self.user_id))
            }
        };
        let preferences = self.stored_preferences().await;
        self.state.borrow_mut().reset_to(settings, preferences);
        info!("settings edits discarded");
    }

    /// Validates, persists remotely, applies local-only changes, then
    /// re-fetches so the baseline is what the server actually holds.
    pub async fn save(&self) -> Result<(), AppError> {
        let (settings, preferences) = {
            let state = self.state.borrow();
            (state.draft.to_settings(&self.user_id)?, state.draft.preferences)
        };

        self.repo.save_settings(&settings).await?;

        if preferences.language != self.language.get() {
            if let Err(error) = self.local.set_language(preferences.language).await {
                warn!(%error, "could not persist language");
            }
            self.language.set(preferences.language);
            info!(language = %preferences.language, "display language changed");
        }
        if let Err(error) = self.local.set_ui_preferences(&preferences).await {
            warn!(%error, "could not persist UI preferences");
        }

        let confirmed = match self.repo.get_settings(&self.user_id).await {
            Ok(confirmed) => confirmed,
            Err(error) => {
                warn!(%error, "confirmation fetch failed, keeping submitted values");
                settings
            }
        };
        if let Err(error) = self.local.cache_settings(&confirmed).await {
            warn!(%error, "could not cache settings locally");
        }
        self.state.borrow_mut().reset_to(confirmed, preferences);
        info!(user_id = %self.user_id, "settings saved");
        Ok(())
    }

    /// Saves, then moves to `target`. On failure the user is put back on
    /// settings with the edits intact.
    pub async fn save_and_leave(
        &self,
        target: Surface,
    ) -> Result<(), Advisory> {
        match self.save().await {
            Ok(()) => {
                self.navigation.borrow_mut().force(target);
                Ok(())
            }
            Err(err) => {
                self.navigation.borrow_mut().force(Surface::Settings);
                Err(Advisory::from_error(&err, self.language.get()))
            }
        }
    }

    pub async fn resolve_leave(
        &self,
        choice: LeaveChoice,
        pending: Surface,
    ) -> Result<(), Advisory> {
        match choice {
            LeaveChoice::Stay => Ok(()),
            LeaveChoice::Discard => {
                self.discard().await;
                self.navigation.borrow_mut().force(pending);
                Ok(())
            }
            LeaveChoice::SaveAndLeave => self.save_and_leave(pending).await,
        }
    }

    /// Deletes the remote settings and local cache, then reloads defaults.
    pub async fn clear(&self) -> Result<(), AppError> {
        self.repo.clear_settings(&self.user_id).await?;
        self.local.clear_cached_data().await?;
        info!(user_id = %self.user_id, "settings cleared");
        self.load().await;
        Ok(())
    }

    async fn stored_preferences(&self) -> UiPreferences {
        let mut preferences = match self.local.ui_preferences().await {
            Ok(stored) => stored.unwrap_or_default(),
            Err(error) => {
                warn!(%error, "could not read UI preferences");
                UiPreferences::default()
            }
        };
        preferences.language = self.language.get();
        preferences
    }
}
