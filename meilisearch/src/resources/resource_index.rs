//! Index resource implementation

use async_trait::async_trait;
use chrono::SecondsFormat;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::import::import_state_passthrough_id;
use tfplug::plan_modifier::RequiresReplace;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure,
    ResourceWithImportState, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::validator::{StringLengthValidator, StringPatternValidator, Validator};

use crate::api::indexes::{CreateIndexRequest, Index};
use crate::api::tasks::{TaskStatus, WaitOptions};
use crate::provider_data::MeilisearchProviderData;

// Meilisearch's own uid rules: 400 bytes max, restricted alphabet
const UID_PATTERN: &str = r"^[a-zA-Z0-9_-]+$";
const UID_PATTERN_DESCRIPTION: &str = "made of letters, digits, '-' and '_' only";
const UID_MAX_LEN: usize = 400;

fn uid_pattern_validator() -> StringPatternValidator {
    StringPatternValidator::new(UID_PATTERN, UID_PATTERN_DESCRIPTION)
}

fn uid_length_validator() -> StringLengthValidator {
    StringLengthValidator {
        min: Some(1),
        max: Some(UID_MAX_LEN),
    }
}

#[derive(Default)]
pub struct IndexResource {
    provider_data: Option<MeilisearchProviderData>,
}

impl IndexResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn index_to_state(index: &Index) -> DynamicValue {
        let mut state = DynamicValue::empty_object();
        let _ = state.set_string(&AttributePath::new("uid"), index.uid.clone());

        // An index without a primary key stays explicit null in state
        match &index.primary_key {
            Some(pk) if !pk.is_empty() => {
                let _ = state.set_string(&AttributePath::new("primary_key"), pk.clone());
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
        state
    }
}

#[async_trait]
impl Resource for IndexResource {
    fn type_name(&self) -> &str {
        "meilisearch_index"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse {
        ResourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Manages a Meilisearch index")
            .attribute(
                AttributeBuilder::string("uid")
                    .description("Unique identifier of the index")
                    .required()
                    .validator(Arc::new(uid_pattern_validator()))
                    .validator(Arc::new(uid_length_validator()))
                    .plan_modifier(Arc::new(RequiresReplace))
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("primary_key")
                    .description(
                        "Primary key of the index (null if not specified and no documents \
                         have been added yet)",
                    )
                    .required()
                    .plan_modifier(Arc::new(RequiresReplace))
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

        ResourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];

        let path = AttributePath::new("uid");
        let uid = request.config.get(&path);
        uid_pattern_validator().validate(&uid, &path, &mut diagnostics);
        uid_length_validator().validate(&uid, &path, &mut diagnostics);

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(
        &self,
        _ctx: Context,
        request: CreateResourceRequest,
    ) -> CreateResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(Diagnostic::error(
                    "Provider not configured",
                    "Provider data was not properly configured",
                ));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let uid = match request.config.get_string(&AttributePath::new("uid")) {
            Ok(uid) => uid,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Error creating index",
                    format!("Missing uid attribute: {}", e),
                ));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let primary_key = request
            .config
            .get_string(&AttributePath::new("primary_key"))
            .ok()
            .filter(|pk| !pk.is_empty());

        let create_request = CreateIndexRequest {
            uid: uid.clone(),
            primary_key,
        };

        let task = match provider_data.client.create_index(&create_request).await {
            Ok(task) => task,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Error creating index",
                    format!("Could not create index, unexpected error: {}", e),
                ));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let finished = match provider_data
            .client
            .wait_for_task(task.task_uid, WaitOptions::default())
            .await
        {
            Ok(finished) => finished,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Error fetching index creation task",
                    format!(
                        "The index creation task did not finish; it may still complete on \
                         the server: {}",
                        e
                    ),
                ));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        if finished.status != TaskStatus::Succeeded {
            let detail = match &finished.error {
                Some(err) => format!("{}: {}", err.code, err.message),
                None => format!("task finished with status {:?}", finished.status),
            };
            diagnostics.push(Diagnostic::error("Error creating index", detail));
            return CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics,
            };
        }

        match provider_data.client.get_index(&uid).await {
            Ok(index) => CreateResourceResponse {
                new_state: Self::index_to_state(&index),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Error fetching index data",
                    format!("unexpected error: {}", e),
                ));
                CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                }
            }
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(Diagnostic::error(
                    "Provider not configured",
                    "Provider data was not properly configured",
                ));
                return ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                };
            }
        };

        let uid = match request.current_state.get_string(&AttributePath::new("uid")) {
            Ok(uid) => uid,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Error Reading Meilisearch Index",
                    format!("State is missing the uid attribute: {}", e),
                ));
                return ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                };
            }
        };

        match provider_data.client.get_index(&uid).await {
            Ok(index) => ReadResourceResponse {
                new_state: Some(Self::index_to_state(&index)),
                diagnostics,
            },
            Err(e) if e.is_not_found() => {
                tracing::debug!("index {} no longer exists, dropping from state", uid);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Error Reading Meilisearch Index",
                    format!("Could not read Meilisearch index ID {}: {}", uid, e),
                ));
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
        }
    }

    async fn update(
        &self,
        _ctx: Context,
        request: UpdateResourceRequest,
    ) -> UpdateResourceResponse {
        // Both configurable attributes force replacement, so an in-place
        // update never has anything to change
        UpdateResourceResponse {
            new_state: request.planned_state,
            diagnostics: vec![],
        }
    }

    async fn delete(
        &self,
        _ctx: Context,
        request: DeleteResourceRequest,
    ) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(Diagnostic::error(
                    "Provider not configured",
                    "Provider data was not properly configured",
                ));
                return DeleteResourceResponse { diagnostics };
            }
        };

        let uid = match request.prior_state.get_string(&AttributePath::new("uid")) {
            Ok(uid) => uid,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Error Deleting Meilisearch Index",
                    format!("State is missing the uid attribute: {}", e),
                ));
                return DeleteResourceResponse { diagnostics };
            }
        };

        match provider_data.client.delete_index(&uid).await {
            Ok(_) => DeleteResourceResponse { diagnostics },
            // Deleting an index that is already gone is a success
            Err(e) if e.is_not_found() => {
                tracing::debug!("index {} already deleted", uid);
                DeleteResourceResponse { diagnostics }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Error Deleting Meilisearch Index",
                    format!("Could not delete index, unexpected error: {}", e),
                ));
                DeleteResourceResponse { diagnostics }
            }
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for IndexResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];

        if let Some(data) = request.provider_data {
            if let Some(provider_data) = data.downcast_ref::<MeilisearchProviderData>() {
                self.provider_data = Some(provider_data.clone());
            } else {
                tracing::error!("failed to downcast provider data for index resource");
                diagnostics.push(Diagnostic::error(
                    "Invalid provider data",
                    "Failed to extract MeilisearchProviderData from provider data",
                ));
            }
        } else {
            diagnostics.push(Diagnostic::error(
                "No provider data",
                "No provider data was provided to the resource",
            ));
        }

        ConfigureResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithImportState for IndexResource {
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };
        import_state_passthrough_id(&ctx, AttributePath::new("uid"), &request, &mut response);
        response
    }
}
