use std::num::ParseFloatError;

use thiserror::Error;

use crate::error::{Field, ValidationError};

/// Error returned when form text cannot be read as a number.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseNumberError {
    #[error("invalid number '{input}': {source}")]
    Invalid {
        input: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("'{input}' is not a finite number")]
    NotFinite { input: String },
}

/// Trims whitespace and drops comma thousands separators.
fn normalize_number_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses form text into an `f64`.
///
/// Handles comma as thousands separator (e.g. `"8,000"`).
/// Empty or whitespace-only input is treated as 0.
pub fn parse_number(s: &str) -> Result<f64, ParseNumberError> {
    let normalized = normalize_number_input(s);
    if normalized.is_empty() {
        return Ok(0.0);
    }
    let value: f64 = normalized.parse().map_err(|source| {
        tracing::debug!(input = %s, "invalid number: {}", source);
        ParseNumberError::Invalid {
            input: s.to_string(),
            source,
        }
    })?;
    if !value.is_finite() {
        return Err(ParseNumberError::NotFinite {
            input: s.to_string(),
        });
    }
    Ok(value)
}

/// Text for a number in an editable field: `8000`, `4.5`.
pub fn number_text(value: f64) -> String {
    value.to_string()
}

/// Reads a non-negative amount from a form field; empty reads as 0.
pub fn parse_field(
    field: Field,
    text: &str,
) -> Result<f64, ValidationError> {
    let value = parse_number(text).map_err(|_| ValidationError::Invalid {
        field,
        input: text.to_string(),
    })?;
    if value < 0.0 {
        return Err(ValidationError::Negative(field));
    }
    Ok(value)
}

/// Like [`parse_field`], but an empty field is an error.
pub fn require_field(
    field: Field,
    text: &str,
) -> Result<f64, ValidationError> {
    if normalize_number_input(text).is_empty() {
        return Err(ValidationError::Missing(field));
    }
    parse_field(field, text)
}

/// Numeric fields are equal when both parse to the same value;
/// unparseable text never equals anything.
pub fn same_number(
    a: &str,
    b: &str,
) -> bool {
    matches!((parse_number(a), parse_number(b)), (Ok(x), Ok(y)) if x == y)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_number_accepts_comma_thousands_separator() {
        assert_eq!(parse_number("8,000").unwrap(), 8000.0);
        assert_eq!(parse_number("1,234,567.5").unwrap(), 1234567.5);
    }

    #[test]
    fn parse_number_empty_treated_as_zero() {
        assert_eq!(parse_number("").unwrap(), 0.0);
        assert_eq!(parse_number("   ").unwrap(), 0.0);
    }

    #[test]
    fn parse_number_rejects_garbage_and_infinity() {
        assert!(matches!(parse_number("abc"), Err(ParseNumberError::Invalid { .. })));
        assert!(matches!(parse_number("inf"), Err(ParseNumberError::NotFinite { .. })));
    }

    #[test]
    fn number_text_drops_trailing_zero() {
        assert_eq!(number_text(8000.0), "8000");
        assert_eq!(number_text(4.5), "4.5");
    }

    #[test]
    fn field_parsing_names_the_field() {
        assert_eq!(parse_field(Field::Rent, "8,000"), Ok(8000.0));
        assert_eq!(parse_field(Field::Rent, ""), Ok(0.0));
        assert_eq!(
            parse_field(Field::Rent, "-1"),
            Err(ValidationError::Negative(Field::Rent))
        );
        assert_eq!(
            require_field(Field::CurrentReading, " "),
            Err(ValidationError::Missing(Field::CurrentReading))
        );
        assert_eq!(
            require_field(Field::CurrentReading, "12a"),
            Err(ValidationError::Invalid {
                field: Field::CurrentReading,
                input: "12a".to_string()
            })
        );
    }

    #[test]
    fn same_number_compares_parsed_values() {
        assert!(same_number("8000", "8,000"));
        assert!(same_number("4.50", "4.5"));
        assert!(same_number("", "0"));
        assert!(!same_number("abc", "abc"));
    }
}
