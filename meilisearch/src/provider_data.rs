//! Shared state handed from the provider to resources and data sources

use crate::api::Client;

/// Travels as `Arc<dyn Any + Send + Sync>` through configure requests;
/// resources downcast it back.
#[derive(Clone)]
pub struct MeilisearchProviderData {
    pub client: Client,
}

impl MeilisearchProviderData {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}
