//! Meter photo → number recognition.
//!
//! Real OCR is an external integration. The app depends only on
//! [`MeterRecognizer`]; [`FixedDelayRecognizer`] stands in for it.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recognition {
    pub reading: f64,
    /// 0.0 to 1.0
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecognitionError {
    #[error("no meter reading found in image")]
    NoReading,

    #[error("image unavailable: {0}")]
    ImageUnavailable(String),
}

#[async_trait]
pub trait MeterRecognizer: Send + Sync {
    /// Reads the meter value from the image at `image_uri`.
    async fn recognize(
        &self,
        image_uri: &str,
    ) -> Result<Recognition, RecognitionError>;
}

/// Returns the same reading for every image after a fixed delay.
#[derive(Debug, Clone)]
pub struct FixedDelayRecognizer {
    reading: f64,
    delay: Duration,
}

impl FixedDelayRecognizer {
    pub const DEFAULT_READING: f64 = 12345.0;
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(2);

    pub fn new(
        reading: f64,
        delay: Duration,
    ) -> Self {
        Self { reading, delay }
    }
}

impl Default for FixedDelayRecognizer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_READING, Self::DEFAULT_DELAY)
    }
}

#[async_trait]
impl MeterRecognizer for FixedDelayRecognizer {
    async fn recognize(
        &self,
        image_uri: &str,
    ) -> Result<Recognition, RecognitionError> {
        if image_uri.trim().is_empty() {
            return Err(RecognitionError::ImageUnavailable("empty image uri".to_string()));
        }
        debug!(image = %image_uri, delay_ms = self.delay.as_millis() as u64, "simulating OCR");
        tokio::time::sleep(self.delay).await;
        Ok(Recognition {
            reading: self.reading,
            confidence: 1.0,
            raw_text: Some(self.reading.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn recognizer_waits_then_returns_fixed_reading() {
        let delay = Duration::from_millis(20);
        let recognizer = FixedDelayRecognizer::new(FixedDelayRecognizer::DEFAULT_READING, delay);
        let started = std::time::Instant::now();

        let result = recognizer.recognize("file:///meter.jpg").await.unwrap();

        assert_eq!(result.reading, 12345.0);
        assert_eq!(result.raw_text.as_deref(), Some("12345"));
        assert!(started.elapsed() >= delay);
    }

    #[tokio::test]
    async fn empty_uri_is_rejected_without_waiting() {
        let recognizer = FixedDelayRecognizer::new(1.0, Duration::from_secs(60));

        let result = recognizer.recognize("  ").await;

        assert!(matches!(result, Err(RecognitionError::ImageUnavailable(_))));
    }
}
