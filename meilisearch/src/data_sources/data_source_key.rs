//! API key data source implementation

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
pub struct KeyDataSource {
    provider_data: Option<MeilisearchProviderData>,
}

impl KeyDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for KeyDataSource {
    fn type_name(&self) -> &str {
        "meilisearch_key"
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
            .description("Retrieves details of a Meilisearch API key")
            .attribute(
                AttributeBuilder::string("uid")
                    .description("UID (uuid v4) used by Meilisearch to identify the key")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("name")
                    .description("Name of the key")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("description")
                    .description("Description of the key")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("key")
                    .description("Actual key value")
                    .computed()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string_list("actions")
                    .description("Actions permitted for the key")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string_list("indexes")
                    .description(
                        "Indexes the key is authorized to act on (with the actions \
                         specified in the scope of the key)",
                    )
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("expires_at")
                    .description("Date and time when the key will expire (RFC3339)")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("created_at")
                    .description("Date and time when the key was created (RFC3339)")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("updated_at")
                    .description("Date and time when the key was last updated (RFC3339)")
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
                    "Unable to Read Meilisearch API key",
                    format!("Missing uid attribute: {}", e),
                ));
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics,
                };
            }
        };

        match provider_data.client.get_key(&uid).await {
            Ok(key) => {
                let mut state = DynamicValue::empty_object();
                let _ = state.set_string(&AttributePath::new("uid"), key.uid);
                let _ = state.set_string(&AttributePath::new("key"), key.key);

                match key.name {
                    Some(name) => {
                        let _ = state.set_string(&AttributePath::new("name"), name);
                    }
                    None => {
                        let _ = state.set_null(&AttributePath::new("name"));
                    }
                }
                match key.description {
                    Some(description) => {
                        let _ =
                            state.set_string(&AttributePath::new("description"), description);
                    }
                    None => {
                        let _ = state.set_null(&AttributePath::new("description"));
                    }
                }

                let _ = state.set_string_list(&AttributePath::new("actions"), key.actions);
                let _ = state.set_string_list(&AttributePath::new("indexes"), key.indexes);

                match key.expires_at {
                    Some(expires_at) => {
                        let _ = state.set_string(
                            &AttributePath::new("expires_at"),
                            expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                        );
                    }
                    None => {
                        let _ = state.set_null(&AttributePath::new("expires_at"));
                    }
                }

                let _ = state.set_string(
                    &AttributePath::new("created_at"),
                    key.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                );
                let _ = state.set_string(
                    &AttributePath::new("updated_at"),
                    key.updated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                );
                let _ = state.set_string(&AttributePath::new("id"), "placeholder".to_string());

                ReadDataSourceResponse { state, diagnostics }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Unable to Read Meilisearch API key",
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
impl DataSourceWithConfigure for KeyDataSource {
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
                tracing::error!("failed to downcast provider data for key data source");
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
