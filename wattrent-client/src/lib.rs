//! `reqwest` backend for [`wattrent_core::WattRentRepository`].

pub mod client;
pub mod envelope;
pub mod factory;

pub use client::HttpRepository;
pub use envelope::ApiEnvelope;
pub use factory::HttpRepositoryFactory;
