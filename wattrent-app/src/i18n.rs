//! User-facing strings in both supported languages.

use std::cell::Cell;
use std::rc::Rc;

use wattrent_core::Language;
use wattrent_core::db::LocalCache;
use wattrent_core::db::LocalStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    // Dialog titles
    Error,
    Success,
    InvalidInput,
    NetworkError,
    UnsavedChangesTitle,

    // Dialog bodies
    UnsavedChangesMessage,
    SettingsSaved,
    SettingsCleared,
    ChangesDiscarded,
    ChangesNotSaved,
    NetworkUnavailable,
    RecordNotFound,
    RecognitionFailed,
    InvalidReadingOrder,
    LocalStorageFailed,
    UnexpectedError,
    FieldRequired,
    FieldInvalid,
    FieldNegative,

    // Field labels
    CurrentReading,
    PreviousReading,
    ElectricityRate,
    Rent,

    // Bill listing
    Usage,
    ElectricityCost,
    Total,
    Paid,
    Unpaid,
    NoBills,
}

impl Text {
    pub fn get(
        self,
        language: Language,
    ) -> &'static str {
        match language {
            Language::ZhTw => self.zh_tw(),
            Language::En => self.en(),
        }
    }

    fn zh_tw(self) -> &'static str {
        match self {
            Text::Error => "錯誤",
            Text::Success => "成功",
            Text::InvalidInput => "輸入錯誤",
            Text::NetworkError => "網路錯誤",
            Text::UnsavedChangesTitle => "未儲存的變更",
            Text::UnsavedChangesMessage => "您有未儲存的變更，要捨棄還是儲存後離開？",
            Text::SettingsSaved => "設定已儲存",
            Text::SettingsCleared => "設定已清除",
            Text::ChangesDiscarded => "已捨棄變更",
            Text::ChangesNotSaved => "變更未儲存",
            Text::NetworkUnavailable => "無法連線到伺服器，請檢查網路連線後再試一次",
            Text::RecordNotFound => "找不到該筆資料",
            Text::RecognitionFailed => "無法辨識電表度數，請手動輸入",
            Text::InvalidReadingOrder => "本次度數不能小於上次度數",
            Text::LocalStorageFailed => "本機資料存取失敗",
            Text::UnexpectedError => "發生未預期的錯誤，請稍後再試",
            Text::FieldRequired => "為必填欄位",
            Text::FieldInvalid => "不是有效的數字",
            Text::FieldNegative => "不能為負數",
            Text::CurrentReading => "本次度數",
            Text::PreviousReading => "上次度數",
            Text::ElectricityRate => "每度電費",
            Text::Rent => "房租",
            Text::Usage => "用電度數",
            Text::ElectricityCost => "電費",
            Text::Total => "總計",
            Text::Paid => "已付款",
            Text::Unpaid => "未付款",
            Text::NoBills => "尚無帳單記錄",
        }
    }

    fn en(self) -> &'static str {
        match self {
            Text::Error => "Error",
            Text::Success => "Success",
            Text::InvalidInput => "Invalid input",
            Text::NetworkError => "Network error",
            Text::UnsavedChangesTitle => "Unsaved changes",
            Text::UnsavedChangesMessage => {
                "You have unsaved changes. Discard them or save before leaving?"
            }
            Text::SettingsSaved => "Settings saved",
            Text::SettingsCleared => "Settings cleared",
            Text::ChangesDiscarded => "Changes discarded",
            Text::ChangesNotSaved => "Changes were not saved",
            Text::NetworkUnavailable => "Cannot reach the server. Check your connection and try again.",
            Text::RecordNotFound => "Record not found",
            Text::RecognitionFailed => "Could not read the meter. Please enter the reading manually.",
            Text::InvalidReadingOrder => {
                "Current reading cannot be less than the previous reading"
            }
            Text::LocalStorageFailed => "Could not access local data",
            Text::UnexpectedError => "Something went wrong. Please try again later.",
            Text::FieldRequired => "is required",
            Text::FieldInvalid => "is not a valid number",
            Text::FieldNegative => "cannot be negative",
            Text::CurrentReading => "Current reading",
            Text::PreviousReading => "Previous reading",
            Text::ElectricityRate => "Electricity rate",
            Text::Rent => "Rent",
            Text::Usage => "Usage",
            Text::ElectricityCost => "Electricity",
            Text::Total => "Total",
            Text::Paid => "Paid",
            Text::Unpaid => "Unpaid",
            Text::NoBills => "No bills yet",
        }
    }
}

/// Process-wide display language, shared by every session.
#[derive(Debug, Clone, Default)]
pub struct ActiveLanguage(Rc<Cell<Language>>);

impl ActiveLanguage {
    pub fn new(language: Language) -> Self {
        Self(Rc::new(Cell::new(language)))
    }

    pub fn get(&self) -> Language {
        self.0.get()
    }

    pub fn set(
        &self,
        language: Language,
    ) {
        self.0.set(language);
    }

    pub fn text(
        &self,
        text: Text,
    ) -> &'static str {
        text.get(self.get())
    }
}

/// Stored choice, else the system locale, else English.
pub async fn resolve_initial_language(
    store: &dyn LocalStore,
    system_locale: Option<&str>,
) -> Language {
    match store.language().await {
        Ok(Some(language)) => return language,
        Ok(None) => {}
        Err(error) => tracing::warn!(%error, "could not read stored language"),
    }
    system_locale
        .map(Language::from_system_locale)
        .unwrap_or_default()
}
