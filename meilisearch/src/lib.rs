//! Terraform provider for Meilisearch
//!
//! Manages search indexes and API keys, and exposes read-only lookups for
//! indexes, keys, and the server version.

pub mod api;
pub mod data_sources;
pub mod provider_data;
pub mod resources;

use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::DataSourceWithConfigure;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, Provider, ProviderMetadataRequest,
    ProviderMetadataResponse, ProviderSchemaRequest, ProviderSchemaResponse,
    ValidateProviderConfigRequest, ValidateProviderConfigResponse,
};
use tfplug::resource::ResourceWithConfigure;
use tfplug::schema::{AttributeBuilder, SchemaBuilder};
use tfplug::types::{has_errors, AttributePath, Diagnostic};
use tfplug::TfplugError;

use provider_data::MeilisearchProviderData;

const HOST_ENV: &str = "MEILISEARCH_HOST";
const API_KEY_ENV: &str = "MEILISEARCH_API_KEY";

#[derive(Default)]
pub struct MeilisearchProvider;

impl MeilisearchProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Provider for MeilisearchProvider {
    fn type_name(&self) -> &str {
        "meilisearch"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .attribute(
                AttributeBuilder::string("host")
                    .description(
                        "Host of Meilisearch server. May also be provided via \
                         MEILISEARCH_HOST environment variable.",
                    )
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("api_key")
                    .description(
                        "Meilisearch master API key. May also be provided via \
                         MEILISEARCH_API_KEY environment variable.",
                    )
                    .optional()
                    .sensitive()
                    .build(),
            )
            .build();

        ProviderSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse {
        ValidateProviderConfigResponse {
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        tracing::info!("Configuring Meilisearch client");

        let mut diagnostics = vec![];

        let host_path = AttributePath::new("host");
        let api_key_path = AttributePath::new("api_key");

        // A value still unknown at configure time cannot be resolved; the
        // dependency it comes from has to be applied first
        if request.config.is_unknown_at(&host_path) {
            diagnostics.push(
                Diagnostic::error(
                    "Unknown Meilisearch host",
                    "The provider cannot create the Meilisearch API client as there is an \
                     unknown configuration value for the Meilisearch host. Either target \
                     apply the source of the value first, set the value statically in the \
                     configuration, or use the MEILISEARCH_HOST environment variable.",
                )
                .with_attribute(host_path.clone()),
            );
        }

        if request.config.is_unknown_at(&api_key_path) {
            diagnostics.push(
                Diagnostic::error(
                    "Unknown Meilisearch API key",
                    "The provider cannot create the Meilisearch API client as there is an \
                     unknown configuration value for the Meilisearch API key. Either target \
                     apply the source of the value first, set the value statically in the \
                     configuration, or use the MEILISEARCH_API_KEY environment variable.",
                )
                .with_attribute(api_key_path.clone()),
            );
        }

        if has_errors(&diagnostics) {
            return ConfigureProviderResponse {
                diagnostics,
                provider_data: None,
            };
        }

        // Environment variables are the defaults; explicit configuration
        // values override them
        let mut host = std::env::var(HOST_ENV).unwrap_or_default();
        let mut api_key = std::env::var(API_KEY_ENV).unwrap_or_default();

        if let Ok(configured) = request.config.get_string(&host_path) {
            host = configured;
        }
        if let Ok(configured) = request.config.get_string(&api_key_path) {
            api_key = configured;
        }

        if host.is_empty() {
            diagnostics.push(
                Diagnostic::error(
                    "Missing Meilisearch host",
                    "The provider cannot create the Meilisearch API client as there is a \
                     missing or empty value for the Meilisearch host. Set the host value in \
                     the configuration or use the MEILISEARCH_HOST environment variable. If \
                     either is already set, ensure the value is not empty.",
                )
                .with_attribute(host_path.clone()),
            );
        }

        if api_key.is_empty() {
            diagnostics.push(
                Diagnostic::error(
                    "Missing Meilisearch API key",
                    "The provider cannot create the Meilisearch API client as there is a \
                     missing or empty value for the Meilisearch API key. Set the API key \
                     value in the configuration or use the MEILISEARCH_API_KEY environment \
                     variable. If either is already set, ensure the value is not empty.",
                )
                .with_attribute(api_key_path.clone()),
            );
        }

        if has_errors(&diagnostics) {
            return ConfigureProviderResponse {
                diagnostics,
                provider_data: None,
            };
        }

        tracing::debug!(host = %host, "Creating Meilisearch client");

        match api::Client::new(&host, &api_key) {
            Ok(client) => {
                tracing::info!("Configured Meilisearch client");
                ConfigureProviderResponse {
                    diagnostics,
                    provider_data: Some(Arc::new(MeilisearchProviderData::new(client))
                        as Arc<dyn Any + Send + Sync>),
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to create Meilisearch client",
                    e.to_string(),
                ));
                ConfigureProviderResponse {
                    diagnostics,
                    provider_data: None,
                }
            }
        }
    }

    async fn create_resource(
        &self,
        type_name: &str,
    ) -> tfplug::Result<Box<dyn ResourceWithConfigure>> {
        match type_name {
            "meilisearch_index" => Ok(Box::new(resources::IndexResource::new())),
            "meilisearch_key" => Ok(Box::new(resources::KeyResource::new())),
            _ => Err(TfplugError::ResourceNotFound(type_name.to_string())),
        }
    }

    async fn create_data_source(
        &self,
        type_name: &str,
    ) -> tfplug::Result<Box<dyn DataSourceWithConfigure>> {
        match type_name {
            "meilisearch_index" => Ok(Box::new(data_sources::IndexDataSource::new())),
            "meilisearch_key" => Ok(Box::new(data_sources::KeyDataSource::new())),
            "meilisearch_version" => Ok(Box::new(data_sources::VersionDataSource::new())),
            _ => Err(TfplugError::DataSourceNotFound(type_name.to_string())),
        }
    }
}
