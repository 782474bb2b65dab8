//! API key resource implementation

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::import::import_state_passthrough_id;
use tfplug::plan_modifier::{RequiresReplace, UseStateForUnknown};
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

use crate::api::keys::{CreateKeyRequest, Key, PatchKeyRequest};
use crate::provider_data::MeilisearchProviderData;

#[derive(Default)]
pub struct KeyResource {
    provider_data: Option<MeilisearchProviderData>,
}

impl KeyResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn key_to_state(key: &Key) -> DynamicValue {
        let mut state = DynamicValue::empty_object();
        let _ = state.set_string(&AttributePath::new("uid"), key.uid.clone());
        let _ = state.set_string(&AttributePath::new("key"), key.key.clone());

        match &key.name {
            Some(name) => {
                let _ = state.set_string(&AttributePath::new("name"), name.clone());
            }
            None => {
                let _ = state.set_null(&AttributePath::new("name"));
            }
        }
        match &key.description {
            Some(description) => {
                let _ =
                    state.set_string(&AttributePath::new("description"), description.clone());
            }
            None => {
                let _ = state.set_null(&AttributePath::new("description"));
            }
        }

        // Order comes straight from the server and is significant
        let _ = state.set_string_list(&AttributePath::new("actions"), key.actions.clone());
        let _ = state.set_string_list(&AttributePath::new("indexes"), key.indexes.clone());

        match &key.expires_at {
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
        state
    }

    fn optional_string(value: &DynamicValue, name: &str) -> Option<String> {
        value.get_string(&AttributePath::new(name)).ok()
    }
}

#[async_trait]
impl Resource for KeyResource {
    fn type_name(&self) -> &str {
        "meilisearch_key"
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
            .description("Manages a Meilisearch API key")
            .attribute(
                AttributeBuilder::string("uid")
                    .description("UID (uuid v4) used by Meilisearch to identify the key")
                    .optional()
                    .computed()
                    .plan_modifier(Arc::new(UseStateForUnknown))
                    .plan_modifier(Arc::new(RequiresReplace))
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("name")
                    .description("Name of the key")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("description")
                    .description("Description of the key")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("key")
                    .description("Actual key value")
                    .computed()
                    .sensitive()
                    .plan_modifier(Arc::new(UseStateForUnknown))
                    .build(),
            )
            .attribute(
                AttributeBuilder::string_list("actions")
                    .description("Actions permitted for the key")
                    .required()
                    .plan_modifier(Arc::new(RequiresReplace))
                    .build(),
            )
            .attribute(
                AttributeBuilder::string_list("indexes")
                    .description(
                        "Indexes the key is authorized to act on (with the actions \
                         specified in the scope of the key)",
                    )
                    .required()
                    .plan_modifier(Arc::new(RequiresReplace))
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("expires_at")
                    .description("Date and time when the key will expire (RFC3339)")
                    .optional()
                    .plan_modifier(Arc::new(RequiresReplace))
                    .build(),
            )
            .attribute(
                AttributeBuilder::string("created_at")
                    .description("Date and time when the key was created (RFC3339)")
                    .computed()
                    .plan_modifier(Arc::new(UseStateForUnknown))
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

        if let Ok(uid) = request.config.get_string(&AttributePath::new("uid")) {
            if uuid::Uuid::parse_str(&uid).is_err() {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid key uid",
                        format!("'{}' is not a valid uuid v4", uid),
                    )
                    .with_attribute(AttributePath::new("uid")),
                );
            }
        }

        if let Ok(expires_at) = request.config.get_string(&AttributePath::new("expires_at")) {
            if !expires_at.is_empty()
                && DateTime::parse_from_rfc3339(&expires_at).is_err()
            {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid expiry",
                        format!("'{}' is not a valid RFC3339 timestamp", expires_at),
                    )
                    .with_attribute(AttributePath::new("expires_at")),
                );
            }
        }

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

        let actions = match request.config.get_string_list(&AttributePath::new("actions")) {
            Ok(actions) => actions,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Error creating key",
                    format!("Missing actions attribute: {}", e),
                ));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let indexes = match request.config.get_string_list(&AttributePath::new("indexes")) {
            Ok(indexes) => indexes,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Error creating key",
                    format!("Missing indexes attribute: {}", e),
                ));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let expires_at = match Self::optional_string(&request.config, "expires_at") {
            Some(raw) if !raw.is_empty() => {
                if DateTime::parse_from_rfc3339(&raw).is_err() {
                    diagnostics.push(Diagnostic::error(
                        "Error creating key",
                        "Could not parse expiresAt attribute",
                    ));
                    return CreateResourceResponse {
                        new_state: request.planned_state,
                        diagnostics,
                    };
                }
                Some(raw)
            }
            _ => None,
        };

        let create_request = CreateKeyRequest {
            uid: Self::optional_string(&request.config, "uid"),
            name: Self::optional_string(&request.config, "name"),
            description: Self::optional_string(&request.config, "description"),
            actions,
            indexes,
            expires_at,
        };

        match provider_data.client.create_key(&create_request).await {
            Ok(key) => CreateResourceResponse {
                new_state: Self::key_to_state(&key),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Error creating key",
                    format!("Could not create key, unexpected error: {}", e),
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
                    "Error Reading Meilisearch Key",
                    format!("State is missing the uid attribute: {}", e),
                ));
                return ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                };
            }
        };

        match provider_data.client.get_key(&uid).await {
            Ok(key) => ReadResourceResponse {
                new_state: Some(Self::key_to_state(&key)),
                diagnostics,
            },
            Err(e) if e.is_not_found() => {
                tracing::debug!("key {} no longer exists, dropping from state", uid);
                ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Error Reading Meilisearch Key",
                    format!("Could not read Meilisearch key ID {}: {}", uid, e),
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
        let mut diagnostics = vec![];

        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                diagnostics.push(Diagnostic::error(
                    "Provider not configured",
                    "Provider data was not properly configured",
                ));
                return UpdateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let uid = match request.planned_state.get_string(&AttributePath::new("uid")) {
            Ok(uid) => uid,
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Error Updating Meilisearch Key",
                    format!("Planned state is missing the uid attribute: {}", e),
                ));
                return UpdateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let patch = PatchKeyRequest {
            name: Self::optional_string(&request.config, "name"),
            description: Self::optional_string(&request.config, "description"),
        };

        match provider_data.client.patch_key(&uid, &patch).await {
            Ok(key) => UpdateResourceResponse {
                new_state: Self::key_to_state(&key),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Error Updating Meilisearch Key",
                    format!("Could not update key, unexpected error: {}", e),
                ));
                UpdateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                }
            }
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
                    "Error Deleting Meilisearch Key",
                    format!("State is missing the uid attribute: {}", e),
                ));
                return DeleteResourceResponse { diagnostics };
            }
        };

        match provider_data.client.delete_key(&uid).await {
            Ok(()) => DeleteResourceResponse { diagnostics },
            // Deleting a key that is already gone is a success
            Err(e) if e.is_not_found() => {
                tracing::debug!("key {} already deleted", uid);
                DeleteResourceResponse { diagnostics }
            }
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Error Deleting Meilisearch Key",
                    format!("Could not delete key, unexpected error: {}", e),
                ));
                DeleteResourceResponse { diagnostics }
            }
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for KeyResource {
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
                tracing::error!("failed to downcast provider data for key resource");
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
impl ResourceWithImportState for KeyResource {
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
