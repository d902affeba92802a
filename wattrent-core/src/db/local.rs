//! Device-local key-value cache.
//!
//! The remote store is the source of truth; what lives here is a cache of
//! the last confirmed settings plus preferences that never leave the
//! device.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::warn;

use crate::models::{Language, UiPreferences, UserSettings};

pub const USER_SETTINGS_KEY: &str = "user_settings";
pub const LANGUAGE_KEY: &str = "user_language";
pub const UI_PREFERENCES_KEY: &str = "ui_preferences";
pub const LATEST_READING_KEY: &str = "latest_reading";

#[derive(Debug, Error)]
pub enum LocalStoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupt value for '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw string storage, one value per key.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>, LocalStoreError>;

    async fn set(
        &self,
        key: &str,
        value: &str,
    ) -> Result<(), LocalStoreError>;

    async fn remove(
        &self,
        keys: &[&str],
    ) -> Result<(), LocalStoreError>;
}

async fn get_json<T: DeserializeOwned>(
    store: &(impl LocalStore + ?Sized),
    key: &str,
) -> Result<Option<T>, LocalStoreError> {
    match store.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| LocalStoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

async fn set_json<T: Serialize>(
    store: &(impl LocalStore + ?Sized),
    key: &str,
    value: &T,
) -> Result<(), LocalStoreError> {
    let raw = serde_json::to_string(value).map_err(|source| LocalStoreError::Corrupt {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw).await
}

/// Typed accessors over a [`LocalStore`].
///
/// Implemented for every store, so callers holding `dyn LocalStore` get
/// them for free.
#[async_trait]
pub trait LocalCache: LocalStore {
    /// Last settings confirmed by the server, merged over the defaults.
    async fn cached_settings(&self) -> Result<Option<UserSettings>, LocalStoreError> {
        get_json(self, USER_SETTINGS_KEY).await
    }

    async fn cache_settings(
        &self,
        settings: &UserSettings,
    ) -> Result<(), LocalStoreError> {
        set_json(self, USER_SETTINGS_KEY, settings).await
    }

    /// Stored display language; unknown tags read as unset.
    async fn language(&self) -> Result<Option<Language>, LocalStoreError> {
        let stored = self.get(LANGUAGE_KEY).await?;
        Ok(stored.and_then(|tag| {
            let language = Language::parse(&tag);
            if language.is_none() {
                warn!(tag = %tag, "ignoring unsupported stored language");
            }
            language
        }))
    }

    async fn set_language(
        &self,
        language: Language,
    ) -> Result<(), LocalStoreError> {
        self.set(LANGUAGE_KEY, language.as_tag()).await
    }

    async fn ui_preferences(&self) -> Result<Option<UiPreferences>, LocalStoreError> {
        get_json(self, UI_PREFERENCES_KEY).await
    }

    async fn set_ui_preferences(
        &self,
        preferences: &UiPreferences,
    ) -> Result<(), LocalStoreError> {
        set_json(self, UI_PREFERENCES_KEY, preferences).await
    }

    async fn latest_reading(&self) -> Result<Option<f64>, LocalStoreError> {
        let stored = self.get(LATEST_READING_KEY).await?;
        Ok(stored.and_then(|raw| raw.trim().parse().ok()))
    }

    async fn set_latest_reading(
        &self,
        reading: f64,
    ) -> Result<(), LocalStoreError> {
        self.set(LATEST_READING_KEY, &reading.to_string()).await
    }

    /// Drops the settings cache and latest reading; language and UI
    /// preferences survive.
    async fn clear_cached_data(&self) -> Result<(), LocalStoreError> {
        self.remove(&[USER_SETTINGS_KEY, LATEST_READING_KEY]).await
    }
}

impl<T: LocalStore + ?Sized> LocalCache for T {}

/// [`LocalStore`] backed by a `HashMap`; nothing survives the process.
#[derive(Default)]
pub struct MemoryLocalStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryLocalStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalStore for MemoryLocalStore {
    async fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>, LocalStoreError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
    ) -> Result<(), LocalStoreError> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(
        &self,
        keys: &[&str],
    ) -> Result<(), LocalStoreError> {
        let mut values = self.values.write().await;
        for key in keys {
            values.remove(*key);
        }
        Ok(())
    }
}
