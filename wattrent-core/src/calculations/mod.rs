//! Bill arithmetic and the text derived from it.
//!
//! Everything here is pure: no I/O, no clock reads. Callers pass the date
//! and display language in.

pub mod bill;
pub mod period;
pub mod share_message;

pub use bill::{BillCalculationError, BillInput, calculate_bill};
pub use period::period_label;
pub use share_message::{compose_message, format_amount, share_message};
