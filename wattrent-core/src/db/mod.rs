pub mod factory;
pub mod local;
pub mod memory;
pub mod repository;

pub use factory::{BackendConfig, RepositoryFactory, RepositoryRegistry};
pub use local::{LocalCache, LocalStore, LocalStoreError, MemoryLocalStore};
pub use memory::{MemoryRepository, MemoryRepositoryFactory};
pub use repository::{RepositoryError, WattRentRepository};
