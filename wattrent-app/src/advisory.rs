//! Dialog text for the user.
//!
//! Lower layers return typed errors; this is the only place they turn
//! into something a person reads.

use std::fmt;

use tracing::{error, warn};

use wattrent_core::Language;
use wattrent_core::calculations::BillCalculationError;
use wattrent_core::db::RepositoryError;

use crate::error::{AppError, ValidationError};
use crate::i18n::Text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvisoryKind {
    Info,
    Error,
    /// Asks the user to choose between discarding and saving.
    UnsavedChanges,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub title: String,
    pub message: String,
}

impl Advisory {
    fn new(
        kind: AdvisoryKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn info(
        language: Language,
        message: Text,
    ) -> Self {
        Self::new(AdvisoryKind::Info, Text::Success.get(language), message.get(language))
    }

    pub fn unsaved_changes(language: Language) -> Self {
        Self::new(
            AdvisoryKind::UnsavedChanges,
            Text::UnsavedChangesTitle.get(language),
            Text::UnsavedChangesMessage.get(language),
        )
    }

    pub fn recognition_failed(language: Language) -> Self {
        Self::new(AdvisoryKind::Error, Text::Error.get(language), Text::RecognitionFailed.get(language))
    }

    /// Builds the error dialog for `err`, logging it on the way.
    pub fn from_error(
        err: &AppError,
        language: Language,
    ) -> Self {
        let error_title = Text::Error.get(language);
        match err {
            AppError::Validation(validation) => {
                warn!(%validation, "input rejected");
                Self::new(AdvisoryKind::Error, Text::InvalidInput.get(language), validation_text(validation, language))
            }
            AppError::Calculation(BillCalculationError::InvalidReadingOrder { current, previous }) => {
                warn!(current, previous, "reading order rejected");
                Self::new(
                    AdvisoryKind::Error,
                    Text::InvalidInput.get(language),
                    Text::InvalidReadingOrder.get(language),
                )
            }
            AppError::Calculation(other) => {
                warn!(error = %other, "calculation rejected");
                Self::new(AdvisoryKind::Error, Text::InvalidInput.get(language), Text::FieldInvalid.get(language))
            }
            AppError::Repository(repo) => repository_advisory(repo, language),
            AppError::Recognition(recognition) => {
                warn!(error = %recognition, "recognition failed");
                Self::recognition_failed(language)
            }
            AppError::Storage(storage) => {
                error!(error = %storage, "local store failure");
                Self::new(AdvisoryKind::Error, error_title, Text::LocalStorageFailed.get(language))
            }
            AppError::Unexpected(detail) => {
                error!(detail = %detail, "unexpected failure");
                Self::new(AdvisoryKind::Error, error_title, Text::UnexpectedError.get(language))
            }
        }
    }
}

fn repository_advisory(
    err: &RepositoryError,
    language: Language,
) -> Advisory {
    let error_title = Text::Error.get(language);
    match err {
        RepositoryError::Connection(_) | RepositoryError::Timeout { .. } => {
            warn!(error = %err, "network failure");
            Advisory::new(
                AdvisoryKind::Error,
                Text::NetworkError.get(language),
                Text::NetworkUnavailable.get(language),
            )
        }
        RepositoryError::Remote(text) => {
            warn!(reason = %text, "server rejected request");
            Advisory::new(AdvisoryKind::Error, error_title, text.clone())
        }
        RepositoryError::NotFound => {
            warn!("record not found");
            Advisory::new(AdvisoryKind::Error, error_title, Text::RecordNotFound.get(language))
        }
        RepositoryError::InvalidResponse(_) | RepositoryError::Configuration(_) => {
            error!(error = %err, "unexpected repository failure");
            Advisory::new(AdvisoryKind::Error, error_title, Text::UnexpectedError.get(language))
        }
    }
}

fn validation_text(
    err: &ValidationError,
    language: Language,
) -> String {
    let (field, problem) = match err {
        ValidationError::Missing(field) => (field, Text::FieldRequired),
        ValidationError::Invalid { field, .. } => (field, Text::FieldInvalid),
        ValidationError::Negative(field) => (field, Text::FieldNegative),
    };
    let label = field.label().get(language);
    match language {
        Language::ZhTw => format!("{label}{}", problem.get(language)),
        Language::En => format!("{label} {}", problem.get(language)),
    }
}

impl fmt::Display for Advisory {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}
