use thiserror::Error;

use wattrent_core::calculations::BillCalculationError;
use wattrent_core::db::{LocalStoreError, RepositoryError};
use wattrent_core::recognition::RecognitionError;

use crate::i18n::Text;

/// Form fields that carry numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    CurrentReading,
    PreviousReading,
    ElectricityRate,
    Rent,
}

impl Field {
    pub fn label(self) -> Text {
        match self {
            Field::CurrentReading => Text::CurrentReading,
            Field::PreviousReading => Text::PreviousReading,
            Field::ElectricityRate => Text::ElectricityRate,
            Field::Rent => Text::Rent,
        }
    }
}

/// Form input rejected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0:?} is required")]
    Missing(Field),

    #[error("{field:?} is not a valid number: '{input}'")]
    Invalid { field: Field, input: String },

    #[error("{0:?} cannot be negative")]
    Negative(Field),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Calculation(#[from] BillCalculationError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Recognition(#[from] RecognitionError),

    #[error(transparent)]
    Storage(#[from] LocalStoreError),

    #[error("{0}")]
    Unexpected(String),
}

/// Setup and I/O failures with no dialog of their own.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Unexpected(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn anyhow_chain_becomes_unexpected() {
        let err = anyhow!("permission denied").context("cannot open log file");

        let app_error = AppError::from(err);

        assert!(matches!(
            &app_error,
            AppError::Unexpected(detail) if detail == "cannot open log file: permission denied"
        ));
    }

    #[test]
    fn field_labels_are_translatable() {
        assert_eq!(Field::Rent.label(), Text::Rent);
    }
}
