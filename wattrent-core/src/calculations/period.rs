use chrono::{Datelike, NaiveDate};

use crate::models::Language;

const EN_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Human-readable billing period for `date`, e.g. `2024年1月` or
/// `January 2024`.
///
/// The label is informational only and is never parsed back.
pub fn period_label(
    date: NaiveDate,
    language: Language,
) -> String {
    match language {
        Language::ZhTw => format!("{}年{}月", date.year(), date.month()),
        Language::En => format!("{} {}", EN_MONTHS[date.month0() as usize], date.year()),
    }
}
