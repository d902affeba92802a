//! SQLite-backed [`wattrent_core::db::LocalStore`].

pub mod store;

pub use store::SqliteLocalStore;
