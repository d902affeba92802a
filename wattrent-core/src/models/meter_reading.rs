use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single meter observation produced by the capture flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterReading {
    pub id: String,
    pub user_id: String,
    pub reading: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_reading: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl MeterReading {
    /// Records a freshly captured reading with a new identifier.
    ///
    /// Usage is derived only when a previous reading is known.
    pub fn capture(
        user_id: impl Into<String>,
        reading: f64,
        image_url: Option<String>,
        previous_reading: Option<f64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            reading,
            image_url,
            previous_reading,
            usage: previous_reading.map(|previous| reading - previous),
            created_at: Utc::now(),
        }
    }
}
