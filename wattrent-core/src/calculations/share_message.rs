use crate::models::{Bill, Language};

/// Formats a money amount for messages and listings.
///
/// Whole numbers print without decimals; anything else prints with at most
/// two decimals and trailing zeros removed.
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        return format!("{value:.0}");
    }
    let fixed = format!("{value:.2}");
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Builds the payment note sent to the landlord for `bill`.
///
/// A message already stored on the bill wins; otherwise one is generated
/// in `language`, greeting the landlord by name when one is configured.
pub fn share_message(
    bill: &Bill,
    language: Language,
    landlord_name: Option<&str>,
) -> String {
    if let Some(message) = bill.message.as_deref().filter(|m| !m.trim().is_empty()) {
        return message.to_string();
    }
    compose_message(bill, language, landlord_name)
}

/// Generates a fresh payment note, ignoring any stored message.
pub fn compose_message(
    bill: &Bill,
    language: Language,
    landlord_name: Option<&str>,
) -> String {
    let rent = format_amount(bill.rent);
    let cost = format_amount(bill.electricity_cost);
    let total = format_amount(bill.total_amount);
    let name = landlord_name.map(str::trim).filter(|n| !n.is_empty());

    match language {
        Language::ZhTw => {
            let greeting = name.unwrap_or("房東");
            format!("{greeting}您好，本月房租{rent}元加電費{cost}元，總計{total}元已匯款，請查收。")
        }
        Language::En => {
            let greeting = name.map_or_else(|| "Hi".to_string(), |n| format!("Hi {n}"));
            format!(
                "{greeting}, this month's rent {rent} plus electricity {cost}, \
                 total {total}, has been transferred. Please check."
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn bill(message: Option<&str>) -> Bill {
        Bill {
            id: "1".to_string(),
            user_id: "user1".to_string(),
            meter_reading_id: "reading1".to_string(),
            meter_reading: 1650.0,
            previous_reading: 1500.0,
            electricity_usage: 150.0,
            electricity_rate: 4.5,
            electricity_cost: 675.0,
            rent: 8000.0,
            total_amount: 8675.0,
            period: "2024年1月".to_string(),
            created_at: Utc::now(),
            paid_at: None,
            message: message.map(str::to_string),
        }
    }

    #[test]
    fn format_amount_drops_decimals_for_whole_numbers() {
        assert_eq!(format_amount(8675.0), "8675");
        assert_eq!(format_amount(0.0), "0");
    }

    #[test]
    fn format_amount_trims_trailing_zeros() {
        assert_eq!(format_amount(4.5), "4.5");
        assert_eq!(format_amount(675.25), "675.25");
    }

    #[test]
    fn chinese_message_matches_landlord_template() {
        let message = share_message(&bill(None), Language::ZhTw, None);

        assert_eq!(
            message,
            "房東您好，本月房租8000元加電費675元，總計8675元已匯款，請查收。"
        );
    }

    #[test]
    fn english_message_greets_landlord_by_name() {
        let message = share_message(&bill(None), Language::En, Some("Mr. Wang"));

        assert_eq!(
            message,
            "Hi Mr. Wang, this month's rent 8000 plus electricity 675, total 8675, \
             has been transferred. Please check."
        );
    }

    #[test]
    fn stored_message_takes_precedence() {
        let message = share_message(&bill(Some("already written")), Language::En, None);

        assert_eq!(message, "already written");
    }

    #[test]
    fn blank_stored_message_is_regenerated() {
        let message = share_message(&bill(Some("  ")), Language::ZhTw, Some("王房東"));

        assert!(message.starts_with("王房東您好"));
    }
}
