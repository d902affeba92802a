use serde::{Deserialize, Serialize};

use super::Language;

pub const DEFAULT_USER_ID: &str = "user1";
pub const DEFAULT_ELECTRICITY_RATE: f64 = 4.5;
pub const DEFAULT_RENT: f64 = 8000.0;
pub const DEFAULT_PREVIOUS_METER_READING: f64 = 0.0;
pub const DEFAULT_PAYMENT_METHOD: &str = "銀行轉帳";

fn default_user_id() -> String {
    DEFAULT_USER_ID.to_string()
}

fn default_electricity_rate() -> f64 {
    DEFAULT_ELECTRICITY_RATE
}

fn default_rent() -> f64 {
    DEFAULT_RENT
}

fn default_payment_method() -> Option<String> {
    Some(DEFAULT_PAYMENT_METHOD.to_string())
}

/// Per-user defaults that seed every new bill.
///
/// The server has shipped both camelCase and snake_case payloads, and older
/// records may lack fields entirely. Deserialization therefore accepts either
/// spelling and fills anything missing from the system defaults, so a
/// partial payload behaves like `{ ...defaults, ...payload }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default = "default_user_id", alias = "user_id")]
    pub user_id: String,

    #[serde(default = "default_electricity_rate", alias = "default_electricity_rate")]
    pub default_electricity_rate: f64,

    #[serde(default = "default_rent", alias = "default_rent")]
    pub default_rent: f64,

    /// Rolling "last confirmed reading", advanced when a bill is marked paid.
    #[serde(default, alias = "previous_meter_reading")]
    pub previous_meter_reading: f64,

    #[serde(
        default,
        alias = "landlord_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub landlord_name: Option<String>,

    #[serde(
        default = "default_payment_method",
        alias = "payment_method",
        skip_serializing_if = "Option::is_none"
    )]
    pub payment_method: Option<String>,
}

impl UserSettings {
    /// Hard-coded system defaults for `user_id`.
    pub fn system_defaults(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            default_electricity_rate: DEFAULT_ELECTRICITY_RATE,
            default_rent: DEFAULT_RENT,
            previous_meter_reading: DEFAULT_PREVIOUS_METER_READING,
            landlord_name: None,
            payment_method: default_payment_method(),
        }
    }

    pub fn landlord_name_or_empty(&self) -> &str {
        self.landlord_name.as_deref().unwrap_or_default()
    }

    pub fn payment_method_or_empty(&self) -> &str {
        self.payment_method.as_deref().unwrap_or_default()
    }
}

impl Default for UserSettings {
    fn default() -> Self {
        Self::system_defaults(DEFAULT_USER_ID)
    }
}

/// Device-only preferences shown on the settings surface.
///
/// These never travel to the server; they live in the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiPreferences {
    #[serde(default = "default_notifications_enabled")]
    pub notifications_enabled: bool,
    #[serde(default)]
    pub auto_backup: bool,
    #[serde(default)]
    pub language: Language,
}

fn default_notifications_enabled() -> bool {
    true
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            notifications_enabled: default_notifications_enabled(),
            auto_backup: false,
            language: Language::default(),
        }
    }
}
