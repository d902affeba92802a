pub mod advisory;
pub mod app;
pub mod bill_workflow;
pub mod capture;
pub mod config;
pub mod error;
pub mod i18n;
pub mod logging;
pub mod navigation;
pub mod settings_session;
pub mod utils;

pub use advisory::{Advisory, AdvisoryKind};
pub use app::AppContext;
pub use error::AppError;
