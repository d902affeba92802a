pub mod calculations;
pub mod db;
pub mod models;
pub mod recognition;

pub use db::repository::{RepositoryError, WattRentRepository};
pub use models::*;
