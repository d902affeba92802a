mod bill;
mod language;
mod meter_reading;
mod user_settings;

pub use bill::{Bill, BillPatch, NewBill};
pub use language::Language;
pub use meter_reading::MeterReading;
pub use user_settings::{
    DEFAULT_ELECTRICITY_RATE, DEFAULT_PAYMENT_METHOD, DEFAULT_PREVIOUS_METER_READING,
    DEFAULT_RENT, DEFAULT_USER_ID, UiPreferences, UserSettings,
};
