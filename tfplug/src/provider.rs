//! Provider trait and related types
//!
//! The provider owns configuration resolution and hands shared state
//! (typically an API client behind an `Arc`) to resources and data sources
//! through `provider_data`.

use crate::context::Context;
use crate::data_source::DataSourceWithConfigure;
use crate::resource::ResourceWithConfigure;
use crate::schema::Schema;
use crate::types::{Diagnostic, DynamicValue};
use crate::Result;
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Type name is the provider prefix for all resource and data source
    /// type names (e.g., "meilisearch")
    fn type_name(&self) -> &str;

    /// Called to get provider metadata
    async fn metadata(
        &self,
        ctx: Context,
        request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse;

    /// Called to get the provider configuration schema
    async fn schema(&self, ctx: Context, request: ProviderSchemaRequest) -> ProviderSchemaResponse;

    /// Called during plan to validate the provider configuration
    async fn validate(
        &self,
        ctx: Context,
        request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse;

    /// Called once before any resource or data source operation
    /// MUST populate provider_data on success; factories receive it via
    /// their configure step
    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse;

    /// Factory for resources. The returned resource is configured with
    /// provider_data before any CRUD call.
    async fn create_resource(&self, type_name: &str) -> Result<Box<dyn ResourceWithConfigure>>;

    /// Factory for data sources, same contract as create_resource
    async fn create_data_source(&self, type_name: &str)
        -> Result<Box<dyn DataSourceWithConfigure>>;
}

// Request/Response types for Provider trait

pub struct ProviderMetadataRequest;

pub struct ProviderMetadataResponse {
    pub type_name: String,
}

pub struct ProviderSchemaRequest;

pub struct ProviderSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ValidateProviderConfigRequest {
    pub config: DynamicValue,
}

pub struct ValidateProviderConfigResponse {
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ConfigureProviderRequest {
    pub config: DynamicValue,
}

pub struct ConfigureProviderResponse {
    pub diagnostics: Vec<Diagnostic>,
    /// Shared state handed to resources and data sources.
    /// Downcast on the receiving side.
    pub provider_data: Option<Arc<dyn Any + Send + Sync>>,
}
