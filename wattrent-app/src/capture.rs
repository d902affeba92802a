//! Meter photo capture and bill creation.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use wattrent_core::calculations::BillInput;
use wattrent_core::db::{LocalCache, LocalStore};
use wattrent_core::recognition::MeterRecognizer;
use wattrent_core::{Bill, MeterReading, UserSettings};

use crate::advisory::Advisory;
use crate::bill_workflow::BillWorkflow;
use crate::error::{AppError, Field};
use crate::i18n::ActiveLanguage;
use crate::utils::{number_text, parse_field, require_field};

/// Form state of the capture surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureForm {
    pub photo: Option<String>,
    pub reading: String,
    pub electricity_rate: String,
    pub rent: String,
    pub previous_reading: f64,
}

pub struct CaptureFlow {
    recognizer: Arc<dyn MeterRecognizer>,
    local: Arc<dyn LocalStore>,
    language: ActiveLanguage,
    form: CaptureForm,
}

impl CaptureFlow {
    pub fn new(
        recognizer: Arc<dyn MeterRecognizer>,
        local: Arc<dyn LocalStore>,
        language: ActiveLanguage,
    ) -> Self {
        Self {
            recognizer,
            local,
            language,
            form: CaptureForm::default(),
        }
    }

    pub fn form(&self) -> &CaptureForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut CaptureForm {
        &mut self.form
    }

    /// Pre-fills rate and rent and remembers the previous reading.
    pub fn prefill(
        &mut self,
        settings: &UserSettings,
    ) {
        self.form.electricity_rate = number_text(settings.default_electricity_rate);
        self.form.rent = number_text(settings.default_rent);
        self.form.previous_reading = settings.previous_meter_reading;
    }

    /// Runs recognition on the photo and fills in the reading. On
    /// failure the photo is kept and the user is asked to type it.
    pub async fn process_image(
        &mut self,
        image_uri: &str,
    ) -> Result<f64, Advisory> {
        self.form.photo = Some(image_uri.to_string());
        match self.recognizer.recognize(image_uri).await {
            Ok(recognition) => {
                info!(
                    reading = recognition.reading,
                    confidence = recognition.confidence,
                    "meter reading recognised"
                );
                self.form.reading = number_text(recognition.reading);
                Ok(recognition.reading)
            }
            Err(error) => Err(Advisory::from_error(&AppError::Recognition(error), self.language.get())),
        }
    }

    pub fn retake(&mut self) {
        self.form.photo = None;
        self.form.reading.clear();
    }

    /// Validates the form and submits the bill. The reading is remembered
    /// and the form cleared only once the server has accepted it.
    pub async fn calculate(
        &mut self,
        workflow: &mut BillWorkflow,
        today: NaiveDate,
    ) -> Result<Bill, AppError> {
        let reading = require_field(Field::CurrentReading, &self.form.reading)?;
        let input = BillInput {
            current_reading: reading,
            previous_reading: self.form.previous_reading,
            electricity_rate: parse_field(Field::ElectricityRate, &self.form.electricity_rate)?,
            rent: parse_field(Field::Rent, &self.form.rent)?,
        };
        input.validate()?;

        let meter = MeterReading::capture(
            workflow.user_id(),
            reading,
            self.form.photo.clone(),
            Some(self.form.previous_reading),
        );
        let bill = workflow.submit(&input, Some(&meter), today).await?;
        if let Err(error) = self.local.set_latest_reading(reading).await {
            warn!(%error, "could not remember latest reading");
        }
        self.retake();
        Ok(bill)
    }
}
