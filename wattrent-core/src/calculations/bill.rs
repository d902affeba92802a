//! Electricity + rent bill calculation.
//!
//! A bill is the difference between two meter readings priced at a flat
//! per-unit rate, plus a fixed monthly rent:
//!
//! | Field | Formula |
//! |-------|---------|
//! | usage | current reading - previous reading |
//! | cost  | usage × electricity rate |
//! | total | cost + rent |
//!
//! Arithmetic is plain `f64`. No rounding is applied here; formatting for
//! display belongs to the presentation layer (see
//! [`format_amount`](super::format_amount)).
//!
//! # Example
//!
//! ```
//! use wattrent_core::calculations::{BillInput, calculate_bill};
//!
//! let input = BillInput {
//!     current_reading: 1650.0,
//!     previous_reading: 1500.0,
//!     electricity_rate: 4.5,
//!     rent: 8000.0,
//! };
//!
//! let draft = calculate_bill(&input, "January 2024").unwrap();
//!
//! assert_eq!(draft.electricity_usage, 150.0);
//! assert_eq!(draft.electricity_cost, 675.0);
//! assert_eq!(draft.total_amount, 8675.0);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::NewBill;

/// Errors that can occur while validating bill inputs.
#[derive(Debug, Error, PartialEq)]
pub enum BillCalculationError {
    /// The current reading is below the previous one.
    ///
    /// Meter rollover and typos look identical from here, so the caller is
    /// asked to correct the input instead of guessing.
    #[error("current reading {current} is lower than previous reading {previous}")]
    InvalidReadingOrder { current: f64, previous: f64 },

    /// An input was negative, NaN or infinite.
    #[error("{field} must be a non-negative number, got {value}")]
    InvalidValue { field: &'static str, value: f64 },
}

/// The four numbers a bill is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BillInput {
    /// Reading shown on the meter now.
    pub current_reading: f64,

    /// Last confirmed reading, normally `UserSettings::previous_meter_reading`.
    pub previous_reading: f64,

    /// Price per unit of electricity.
    pub electricity_rate: f64,

    /// Fixed rent added on top of the electricity cost.
    pub rent: f64,
}

impl BillInput {
    /// Checks every field, then the reading order.
    pub fn validate(&self) -> Result<(), BillCalculationError> {
        for (field, value) in [
            ("current reading", self.current_reading),
            ("previous reading", self.previous_reading),
            ("electricity rate", self.electricity_rate),
            ("rent", self.rent),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(BillCalculationError::InvalidValue { field, value });
            }
        }

        if self.current_reading < self.previous_reading {
            return Err(BillCalculationError::InvalidReadingOrder {
                current: self.current_reading,
                previous: self.previous_reading,
            });
        }

        Ok(())
    }

    pub fn usage(&self) -> f64 {
        self.current_reading - self.previous_reading
    }
}

/// Validates `input` and produces a bill draft labelled with `period`.
///
/// Zero usage is allowed. The draft is not linked to a meter reading; use
/// [`NewBill::with_meter_reading`] for that.
pub fn calculate_bill(
    input: &BillInput,
    period: impl Into<String>,
) -> Result<NewBill, BillCalculationError> {
    input.validate()?;

    let electricity_usage = input.usage();
    let electricity_cost = electricity_usage * input.electricity_rate;
    let total_amount = electricity_cost + input.rent;

    debug!(
        usage = electricity_usage,
        cost = electricity_cost,
        total = total_amount,
        "bill calculated"
    );

    Ok(NewBill {
        meter_reading_id: None,
        meter_reading: input.current_reading,
        previous_reading: input.previous_reading,
        electricity_usage,
        electricity_rate: input.electricity_rate,
        electricity_cost,
        rent: input.rent,
        total_amount,
        period: period.into(),
        image_url: None,
        message: None,
    })
}
