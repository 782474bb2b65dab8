//! Version data source implementation

use async_trait::async_trait;
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
pub struct VersionDataSource {
    provider_data: Option<MeilisearchProviderData>,
}

impl VersionDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for VersionDataSource {
    fn type_name(&self) -> &str {
        "meilisearch_version"
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
            .description("Retrieves the Meilisearch version")
            .attribute(
                AttributeBuilder::string("commit_sha")
                    .description("Commit identifier that tagged the pkg_version release")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("commit_date")
                    .description("Date when the commit_sha was created")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("pkg_version")
                    .description("Meilisearch version")
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

    async fn read(&self, _ctx: Context, _request: ReadDataSourceRequest) -> ReadDataSourceResponse {
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

        match provider_data.client.get_version().await {
            Ok(version) => {
                let mut state = DynamicValue::empty_object();
                let _ = state.set_string(&AttributePath::new("commit_sha"), version.commit_sha);
                let _ = state.set_string(&AttributePath::new("commit_date"), version.commit_date);
                let _ = state.set_string(&AttributePath::new("pkg_version"), version.pkg_version);
                let _ = state.set_string(&AttributePath::new("id"), "placeholder".to_string());

                ReadDataSourceResponse { state, diagnostics }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Unable to Read Meilisearch Version",
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
impl DataSourceWithConfigure for VersionDataSource {
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
                tracing::error!("failed to downcast provider data for version data source");
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
