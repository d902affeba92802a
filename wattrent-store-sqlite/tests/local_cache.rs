use pretty_assertions::assert_eq;
use tempfile::TempDir;

use wattrent_core::db::LocalCache;
use wattrent_core::{Language, UiPreferences, UserSettings};
use wattrent_store_sqlite::SqliteLocalStore;

#[tokio::test]
async fn cached_values_survive_reopening_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wattrent.db");
    let settings = UserSettings {
        default_rent: 9500.0,
        landlord_name: Some("陳小姐".to_string()),
        ..UserSettings::default()
    };

    {
        let store = SqliteLocalStore::open(&path).await.unwrap();
        store.cache_settings(&settings).await.unwrap();
        store.set_language(Language::ZhTw).await.unwrap();
        store
            .set_ui_preferences(&UiPreferences {
                notifications_enabled: false,
                auto_backup: true,
                language: Language::ZhTw,
            })
            .await
            .unwrap();
        store.pool().close().await;
    }

    let reopened = SqliteLocalStore::open(&path).await.unwrap();

    assert_eq!(reopened.cached_settings().await.unwrap(), Some(settings));
    assert_eq!(reopened.language().await.unwrap(), Some(Language::ZhTw));
    let prefs = reopened.ui_preferences().await.unwrap().unwrap();
    assert!(!prefs.notifications_enabled);
    assert!(prefs.auto_backup);
}

#[tokio::test]
async fn clear_cached_data_keeps_preferences() {
    let store = SqliteLocalStore::in_memory().await.unwrap();
    store.cache_settings(&UserSettings::default()).await.unwrap();
    store.set_latest_reading(1650.0).await.unwrap();
    store.set_language(Language::En).await.unwrap();

    store.clear_cached_data().await.unwrap();

    assert_eq!(store.cached_settings().await.unwrap(), None);
    assert_eq!(store.latest_reading().await.unwrap(), None);
    assert_eq!(store.language().await.unwrap(), Some(Language::En));
}
