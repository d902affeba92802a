mod support;

use pretty_assertions::assert_eq;

use wattrent_app::AdvisoryKind;
use wattrent_app::error::AppError;
use wattrent_app::navigation::{NavigationOutcome, Surface};
use wattrent_app::settings_session::{LeaveChoice, SettingsDraft};
use wattrent_core::db::{LocalCache, WattRentRepository};
use wattrent_core::{Language, UiPreferences, UserSettings};

use support::harness;

fn stored(rent: f64) -> UserSettings {
    UserSettings {
        default_rent: rent,
        ..UserSettings::default()
    }
}

// ── load ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn load_shows_remote_settings_and_is_clean() {
    let h = harness(Some(stored(9000.0))).await;
    let session = h.ctx.settings_session();

    session.mount().await;

    assert_eq!(session.draft().rent, "9000");
    assert!(!session.is_dirty());
    assert_eq!(
        h.local.cached_settings().await.unwrap().map(|s| s.default_rent),
        Some(9000.0)
    );
}

#[tokio::test]
async fn load_failure_falls_back_to_defaults_silently() {
    let h = harness(Some(stored(9000.0))).await;
    h.repo.fail_get_settings(true);
    let session = h.ctx.settings_session();

    session.load().await;

    assert_eq!(
        session.draft(),
        SettingsDraft::from_settings(&UserSettings::default(), UiPreferences::default())
    );
    assert!(!session.is_dirty());
}

// ── dirty tracking ──────────────────────────────────────────────────────

#[tokio::test]
async fn editing_back_to_baseline_is_clean_again() {
    let h = harness(Some(stored(9000.0))).await;
    let session = h.ctx.settings_session();
    session.load().await;

    session.edit(|d| d.rent = "9500".to_string());
    assert!(session.is_dirty());

    session.edit(|d| d.rent = "9,000".to_string());
    assert!(!session.is_dirty());
}

#[tokio::test]
async fn ui_preference_edit_is_dirty() {
    let h = harness(None).await;
    let session = h.ctx.settings_session();
    session.load().await;

    session.edit(|d| d.preferences.auto_backup = true);

    assert!(session.is_dirty());
}

// ── save ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_confirms_by_refetch_and_clears_dirty() {
    let h = harness(None).await;
    let session = h.ctx.settings_session();
    session.load().await;
    session.edit(|d| {
        d.electricity_rate = "5.2".to_string();
        d.landlord_name = "林太太".to_string();
    });

    session.save().await.unwrap();

    assert!(!session.is_dirty());
    let remote = h.repo.inner.get_settings("user1").await.unwrap();
    assert_eq!(remote.default_electricity_rate, 5.2);
    assert_eq!(remote.landlord_name.as_deref(), Some("林太太"));
    assert_eq!(session.confirmed(), Some(remote.clone()));
    assert_eq!(h.local.cached_settings().await.unwrap(), Some(remote));
}

#[tokio::test]
async fn invalid_number_is_rejected_without_network_call() {
    let h = harness(None).await;
    let session = h.ctx.settings_session();
    session.load().await;
    session.edit(|d| d.rent = "八千".to_string());
    let calls_before = h.repo.calls();

    let result = session.save().await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(h.repo.calls(), calls_before);
    assert!(session.is_dirty());
}

#[tokio::test]
async fn language_change_applies_on_save() {
    let h = harness(None).await;
    let session = h.ctx.settings_session();
    session.load().await;
    session.edit(|d| d.preferences.language = Language::ZhTw);

    session.save().await.unwrap();

    assert_eq!(h.ctx.language.get(), Language::ZhTw);
    assert_eq!(h.local.language().await.unwrap(), Some(Language::ZhTw));
    assert!(!session.is_dirty());
}

#[tokio::test]
async fn failed_save_keeps_language_and_dirty() {
    let h = harness(None).await;
    let session = h.ctx.settings_session();
    session.load().await;
    session.edit(|d| d.preferences.language = Language::ZhTw);
    h.repo.fail_save_settings(true);

    let result = session.save().await;

    assert!(matches!(result, Err(AppError::Repository(_))));
    assert_eq!(h.ctx.language.get(), Language::En);
    assert!(session.is_dirty());
}

// ── discard ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn discard_restores_current_remote_state() {
    let h = harness(Some(stored(9000.0))).await;
    let session = h.ctx.settings_session();
    session.load().await;
    session.edit(|d| d.rent = "1".to_string());
    // Someone else saved in the meantime.
    h.repo.inner.save_settings(&stored(9900.0)).await.unwrap();

    session.discard().await;

    assert_eq!(session.draft().rent, "9900");
    assert!(!session.is_dirty());
}

#[tokio::test]
async fn discard_while_offline_restores_baseline() {
    let h = harness(Some(stored(9000.0))).await;
    let session = h.ctx.settings_session();
    session.load().await;
    session.edit(|d| d.rent = "1".to_string());
    h.repo.fail_get_settings(true);

    session.discard().await;

    assert_eq!(session.draft().rent, "9000");
    assert!(!session.is_dirty());
}

// ── leaving ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn guard_mounted_before_edit_still_blocks_leaving() {
    let h = harness(None).await;
    h.ctx.navigation.borrow_mut().force(Surface::Settings);
    let session = h.ctx.settings_session();
    session.mount().await;

    session.edit(|d| d.previous_reading = "1650".to_string());
    let outcome = h.ctx.navigation.borrow_mut().navigate(Surface::History);

    assert_eq!(outcome, NavigationOutcome::Blocked { pending: Surface::History });
    assert_eq!(h.ctx.navigation.borrow().current(), Surface::Settings);
}

#[tokio::test]
async fn clean_settings_leave_freely() {
    let h = harness(None).await;
    h.ctx.navigation.borrow_mut().force(Surface::Settings);
    let session = h.ctx.settings_session();
    session.mount().await;

    let outcome = h.ctx.navigation.borrow_mut().navigate(Surface::Home);

    assert_eq!(outcome, NavigationOutcome::Moved);
}

#[tokio::test]
async fn save_and_leave_failure_returns_to_settings_still_dirty() {
    let h = harness(None).await;
    h.ctx.navigation.borrow_mut().force(Surface::Settings);
    let session = h.ctx.settings_session();
    session.mount().await;
    session.edit(|d| d.rent = "9500".to_string());
    let outcome = h.ctx.navigation.borrow_mut().navigate(Surface::Home);
    let NavigationOutcome::Blocked { pending } = outcome else {
        panic!("expected leave to be blocked, got {outcome:?}");
    };
    h.repo.fail_save_settings(true);

    let advisory = session
        .resolve_leave(LeaveChoice::SaveAndLeave, pending)
        .await
        .unwrap_err();

    assert_eq!(advisory.kind, AdvisoryKind::Error);
    assert_eq!(advisory.message, "儲存設定失敗");
    assert_eq!(h.ctx.navigation.borrow().current(), Surface::Settings);
    assert!(session.is_dirty());
}

#[tokio::test]
async fn save_and_leave_success_moves_on() {
    let h = harness(None).await;
    h.ctx.navigation.borrow_mut().force(Surface::Settings);
    let session = h.ctx.settings_session();
    session.mount().await;
    session.edit(|d| d.rent = "9500".to_string());

    session
        .resolve_leave(LeaveChoice::SaveAndLeave, Surface::Capture)
        .await
        .unwrap();

    assert_eq!(h.ctx.navigation.borrow().current(), Surface::Capture);
    assert_eq!(h.repo.inner.get_settings("user1").await.unwrap().default_rent, 9500.0);
}

#[tokio::test]
async fn discard_choice_resets_then_leaves() {
    let h = harness(Some(stored(9000.0))).await;
    h.ctx.navigation.borrow_mut().force(Surface::Settings);
    let session = h.ctx.settings_session();
    session.mount().await;
    session.edit(|d| d.rent = "1".to_string());

    session
        .resolve_leave(LeaveChoice::Discard, Surface::Home)
        .await
        .unwrap();

    assert_eq!(h.ctx.navigation.borrow().current(), Surface::Home);
    assert_eq!(session.draft().rent, "9000");
    assert_eq!(h.repo.inner.get_settings("user1").await.unwrap().default_rent, 9000.0);
}

#[tokio::test]
async fn stay_choice_changes_nothing() {
    let h = harness(None).await;
    h.ctx.navigation.borrow_mut().force(Surface::Settings);
    let session = h.ctx.settings_session();
    session.mount().await;
    session.edit(|d| d.rent = "1".to_string());

    session.resolve_leave(LeaveChoice::Stay, Surface::Home).await.unwrap();

    assert_eq!(h.ctx.navigation.borrow().current(), Surface::Settings);
    assert!(session.is_dirty());
}

// ── clear ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn clear_removes_remote_settings_and_reloads_defaults() {
    let h = harness(Some(stored(9000.0))).await;
    let session = h.ctx.settings_session();
    session.load().await;
    h.local.set_latest_reading(1650.0).await.unwrap();

    session.clear().await.unwrap();

    assert_eq!(session.draft().rent, "8000");
    assert!(!session.is_dirty());
    assert_eq!(h.local.latest_reading().await.unwrap(), None);
    assert_eq!(h.repo.inner.get_settings("user1").await.unwrap(), UserSettings::default());
}
