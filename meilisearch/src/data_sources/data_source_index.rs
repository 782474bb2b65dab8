//! Index data source implementation

use async_trait::async_trait;
use chrono::SecondsFormat;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};

use crate::provider_data::MeilisearchProviderData;

#[derive(Default)]
pub struct IndexDataSource {
    provider_data: Option<MeilisearchProviderData>,
}

impl IndexDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for IndexDataSource {
    fn type_name(&self) -> &str {
        "meilisearch_index"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse {
        DataSourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Retrieves details of a Meilisearch index")
            .attribute(
                AttributeBuilder::string("uid")
                    .description("Unique identifier of the index")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("primary_key")
                    .description(
                        "Primary key of the index (null if not specified and no documents \
                         have been added yet)",
                    )
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("created_at")
                    .description("Date and time when the index was created (RFC3339)")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("updated_at")
                    .description("Date and time when the index was last updated (RFC3339)")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("id")
                    .description("Placeholder identifier attribute")
                    .computed()
                    .build(),
            )
            .build();

        DataSourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: vec![],
        }
    }

    async fn read(&self, _ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(Diagnostic::error(
                    "Provider not configured",
                    "Provider data was not properly configured",
                ));
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics,
                };
            }
        };

        let uid = match request.config.get_string(&AttributePath::new("uid")) {
            Ok(uid) => uid,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Unable to Read Meilisearch index",
                    format!("Missing uid attribute: {}", e),
                ));
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics,
                };
            }
        };

        match provider_data.client.get_index(&uid).await {
            Ok(index) => {
                let mut state = DynamicValue::empty_object();
                let _ = state.set_string(&AttributePath::new("uid"), index.uid);

                match index.primary_key {
                    Some(pk) if !pk.is_empty() => {
                        let _ = state.set_string(&AttributePath::new("primary_key"), pk);
                    }
                    _ => {
                        let _ = state.set_null(&AttributePath::new("primary_key"));
                    }
                }

                let _ = state.set_string(
                    &AttributePath::new("created_at"),
                    index
                        .created_at
                        .to_rfc3339_opts(SecondsFormat::Secs, true),
                );
                let _ = state.set_string(
                    &AttributePath::new("updated_at"),
                    index
                        .updated_at
                        .to_rfc3339_opts(SecondsFormat::Secs, true),
                );
                let _ = state.set_string(&AttributePath::new("id"), "placeholder".to_string());

                ReadDataSourceResponse { state, diagnostics }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Unable to Read Meilisearch index",
                    e.to_string(),
                ));
                ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics,
                }
            }
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for IndexDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = vec![];

        if let Some(data) = request.provider_data {
            if let Some(provider_data) = data.downcast_ref::<MeilisearchProviderData>() {
                self.provider_data = Some(provider_data.clone());
            } else {
                tracing::error!("failed to downcast provider data for index data source");
                diagnostics.push(Diagnostic::error(
                    "Invalid provider data",
                    "Failed to extract MeilisearchProviderData from provider data",
                ));
            }
        } else {
            diagnostics.push(Diagnostic::error(
                "No provider data",
                "No provider data was provided to the data source",
            ));
        }

        ConfigureDataSourceResponse { diagnostics }
    }
}
