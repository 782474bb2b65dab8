//! Meilisearch API client and endpoint bindings

pub mod client;
pub mod error;
pub mod indexes;
pub mod keys;
pub mod tasks;
pub mod version;

pub use client::Client;
pub use error::ApiError;
