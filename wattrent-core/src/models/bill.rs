use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::MeterReading;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub meter_reading_id: String,

    // Calculated at creation, never edited afterwards
    pub meter_reading: f64,
    #[serde(default)]
    pub previous_reading: f64,
    pub electricity_usage: f64,
    pub electricity_rate: f64,
    pub electricity_cost: f64,
    pub rent: f64,
    pub total_amount: f64,

    pub period: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Bill {
    pub fn is_paid(&self) -> bool {
        self.paid_at.is_some()
    }

    /// Applies a partial update in place, the way the server does.
    pub fn apply(
        &mut self,
        patch: &BillPatch,
    ) {
        if let Some(paid_at) = patch.paid_at {
            self.paid_at = paid_at;
        }
        if let Some(message) = &patch.message {
            self.message = Some(message.clone());
        }
    }
}

/// For creating new bills (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBill {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meter_reading_id: Option<String>,
    pub meter_reading: f64,
    pub previous_reading: f64,
    pub electricity_usage: f64,
    pub electricity_rate: f64,
    pub electricity_cost: f64,
    pub rent: f64,
    pub total_amount: f64,
    pub period: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl NewBill {
    /// Links the draft to the reading it was computed from.
    pub fn with_meter_reading(
        mut self,
        reading: &MeterReading,
    ) -> Self {
        self.meter_reading_id = Some(reading.id.clone());
        self.image_url = reading.image_url.clone();
        self
    }
}

/// Partial bill update sent with `PUT /bills/{id}`.
///
/// `paid_at` is tri-state: `None` leaves the field alone, `Some(None)`
/// serializes as `null` and clears it, `Some(Some(ts))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<Option<DateTime<Utc>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BillPatch {
    pub fn mark_paid(at: DateTime<Utc>) -> Self {
        Self {
            paid_at: Some(Some(at)),
            ..Default::default()
        }
    }

    pub fn mark_unpaid() -> Self {
        Self {
            paid_at: Some(None),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample_bill() -> Bill {
        Bill {
            id: "b1".to_string(),
            user_id: "user1".to_string(),
            meter_reading_id: "r1".to_string(),
            meter_reading: 1650.0,
            previous_reading: 1500.0,
            electricity_usage: 150.0,
            electricity_rate: 4.5,
            electricity_cost: 675.0,
            rent: 8000.0,
            total_amount: 8675.0,
            period: "January 2024".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap(),
            paid_at: None,
            message: None,
        }
    }

    #[test]
    fn mark_unpaid_serializes_explicit_null() {
        let json = serde_json::to_value(BillPatch::mark_unpaid()).unwrap();

        assert_eq!(json, serde_json::json!({ "paidAt": null }));
    }

    #[test]
    fn empty_patch_serializes_to_empty_object() {
        let json = serde_json::to_value(BillPatch::default()).unwrap();

        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn apply_sets_and_clears_paid_at() {
        let mut bill = sample_bill();
        let paid = Utc.with_ymd_and_hms(2024, 1, 16, 14, 30, 0).unwrap();

        bill.apply(&BillPatch::mark_paid(paid));
        assert_eq!(bill.paid_at, Some(paid));
        assert!(bill.is_paid());

        bill.apply(&BillPatch::mark_unpaid());
        assert_eq!(bill.paid_at, None);
    }

    #[test]
    fn apply_leaves_numbers_untouched() {
        let mut bill = sample_bill();
        let before = bill.clone();

        bill.apply(&BillPatch {
            message: Some("hello".to_string()),
            ..Default::default()
        });

        assert_eq!(bill.total_amount, before.total_amount);
        assert_eq!(bill.message.as_deref(), Some("hello"));
    }

    #[test]
    fn deserializes_server_bill_without_previous_reading() {
        let json = r#"{
            "id": "1",
            "userId": "user1",
            "meterReadingId": "reading1",
            "meterReading": 1500,
            "electricityUsage": 150,
            "electricityRate": 4.5,
            "electricityCost": 675,
            "rent": 8000,
            "totalAmount": 8675,
            "period": "2024年1月",
            "createdAt": "2024-01-15T10:00:00Z",
            "paidAt": "2024-01-16T14:30:00Z"
        }"#;

        let bill: Bill = serde_json::from_str(json).unwrap();

        assert_eq!(bill.previous_reading, 0.0);
        assert!(bill.is_paid());
        assert_eq!(bill.period, "2024年1月");
    }

    #[test]
    fn with_meter_reading_links_id_and_photo() {
        let reading = MeterReading::capture("user1", 1650.0, Some("photo.jpg".into()), None);
        let draft = NewBill {
            meter_reading_id: None,
            meter_reading: 1650.0,
            previous_reading: 1500.0,
            electricity_usage: 150.0,
            electricity_rate: 4.5,
            electricity_cost: 675.0,
            rent: 8000.0,
            total_amount: 8675.0,
            period: "January 2024".to_string(),
            image_url: None,
            message: None,
        }
        .with_meter_reading(&reading);

        assert_eq!(draft.meter_reading_id, Some(reading.id.clone()));
        assert_eq!(draft.image_url.as_deref(), Some("photo.jpg"));
    }
}
