//! End-to-end provider tests against a mock Meilisearch server

use meilisearch::api::Client;
use meilisearch::data_sources::VersionDataSource;
use meilisearch::provider_data::MeilisearchProviderData;
use meilisearch::resources::{IndexResource, KeyResource};
use std::any::Any;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, DataSource, DataSourceWithConfigure, ReadDataSourceRequest,
};
use tfplug::plan::{plan_resource_change, PlanAction};
use tfplug::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest,
    ImportResourceStateRequest, ReadResourceRequest, Resource, ResourceSchemaRequest,
    ResourceWithConfigure, ResourceWithImportState, UpdateResourceRequest,
};
use tfplug::types::{has_errors, AttributePath, Dynamic, DynamicValue};

fn provider_data_for(server: &mockito::Server) -> Arc<dyn Any + Send + Sync> {
    let client = Client::new(&server.url(), "masterKey").unwrap();
    Arc::new(MeilisearchProviderData::new(client))
}

async fn configured_index_resource(server: &mockito::Server) -> IndexResource {
    let mut resource = IndexResource::new();
    let response = resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: Some(provider_data_for(server)),
            },
        )
        .await;
    assert!(!has_errors(&response.diagnostics));
    resource
}

async fn configured_key_resource(server: &mockito::Server) -> KeyResource {
    let mut resource = KeyResource::new();
    let response = resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: Some(provider_data_for(server)),
            },
        )
        .await;
    assert!(!has_errors(&response.diagnostics));
    resource
}

fn index_config(uid: &str, primary_key: &str) -> DynamicValue {
    let mut config = DynamicValue::empty_object();
    config
        .set_string(&AttributePath::new("uid"), uid.to_string())
        .unwrap();
    config
        .set_string(&AttributePath::new("primary_key"), primary_key.to_string())
        .unwrap();
    config
}

const INDEX_BODY: &str = r#"{"uid":"abcdef","primaryKey":"toto","createdAt":"2022-02-10T07:45:15.628261Z","updatedAt":"2022-02-21T15:28:43.496574Z"}"#;

const KEY_BODY: &str = r#"{
    "name": "test key",
    "description": "a test key",
    "key": "d0552b41536279a0ad88bd595327b96f01176a60c2243e906c52ac02375f9bc4",
    "uid": "6062abda-a5aa-4414-ac91-ecd7944c0f8d",
    "actions": ["search"],
    "indexes": ["test_index_1", "test_index_2"],
    "expiresAt": "2042-04-02T00:42:42Z",
    "createdAt": "2022-02-10T07:45:15.628261Z",
    "updatedAt": "2022-02-21T15:28:43.496574Z"
}"#;

#[tokio::test]
async fn index_create_populates_computed_attributes() {
    let mut server = mockito::Server::new_async().await;
    let create = server
        .mock("POST", "/indexes")
        .match_body(mockito::Matcher::Json(serde_json::json!({
            "uid": "abcdef",
            "primaryKey": "toto"
        })))
        .with_status(202)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"taskUid":4,"indexUid":"abcdef","status":"enqueued","type":"indexCreation","enqueuedAt":"2022-02-10T07:45:15.628261Z"}"#,
        )
        .create_async()
        .await;
    let task = server
        .mock("GET", "/tasks/4")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"uid":4,"indexUid":"abcdef","status":"succeeded","type":"indexCreation"}"#)
        .create_async()
        .await;
    let fetch = server
        .mock("GET", "/indexes/abcdef")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(INDEX_BODY)
        .create_async()
        .await;

    let resource = configured_index_resource(&server).await;
    let config = index_config("abcdef", "toto");
    let response = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "meilisearch_index".to_string(),
                planned_state: config.clone(),
                config,
            },
        )
        .await;

    create.assert_async().await;
    task.assert_async().await;
    fetch.assert_async().await;

    assert!(!has_errors(&response.diagnostics));
    let state = response.new_state;
    assert_eq!(
        state.get_string(&AttributePath::new("uid")).unwrap(),
        "abcdef"
    );
    assert_eq!(
        state.get_string(&AttributePath::new("primary_key")).unwrap(),
        "toto"
    );
    assert_eq!(
        state.get_string(&AttributePath::new("created_at")).unwrap(),
        "2022-02-10T07:45:15Z"
    );
    assert_eq!(
        state.get_string(&AttributePath::new("id")).unwrap(),
        "placeholder"
    );
}

#[tokio::test]
async fn index_create_reports_failed_task() {
    let mut server = mockito::Server::new_async().await;
    let _create = server
        .mock("POST", "/indexes")
        .with_status(202)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"taskUid":7,"indexUid":"abcdef","status":"enqueued","type":"indexCreation","enqueuedAt":"2022-02-10T07:45:15.628261Z"}"#,
        )
        .create_async()
        .await;
    let _task = server
        .mock("GET", "/tasks/7")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"uid":7,"indexUid":"abcdef","status":"failed","type":"indexCreation","error":{"message":"Index `abcdef` already exists.","code":"index_already_exists","type":"invalid_request"}}"#,
        )
        .create_async()
        .await;

    let resource = configured_index_resource(&server).await;
    let config = index_config("abcdef", "toto");
    let response = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "meilisearch_index".to_string(),
                planned_state: config.clone(),
                config,
            },
        )
        .await;

    assert!(has_errors(&response.diagnostics));
    assert!(response.diagnostics[0].detail.contains("index_already_exists"));
}

#[tokio::test]
async fn index_read_drops_state_when_gone() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/indexes/abcdef")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"message":"Index `abcdef` not found.","code":"index_not_found","type":"invalid_request","link":""}"#,
        )
        .create_async()
        .await;

    let resource = configured_index_resource(&server).await;
    let response = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "meilisearch_index".to_string(),
                current_state: index_config("abcdef", "toto"),
            },
        )
        .await;

    assert!(!has_errors(&response.diagnostics));
    assert!(response.new_state.is_none());
}

#[tokio::test]
async fn index_delete_is_idempotent() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("DELETE", "/indexes/abcdef")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"message":"Index `abcdef` not found.","code":"index_not_found","type":"invalid_request","link":""}"#,
        )
        .create_async()
        .await;

    let resource = configured_index_resource(&server).await;
    let response = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "meilisearch_index".to_string(),
                prior_state: index_config("abcdef", "toto"),
            },
        )
        .await;

    assert!(!has_errors(&response.diagnostics));
}

#[tokio::test]
async fn index_plan_replaces_on_uid_or_primary_key_change() {
    let server = mockito::Server::new_async().await;
    let resource = configured_index_resource(&server).await;
    let schema = resource
        .schema(Context::new(), ResourceSchemaRequest)
        .await
        .schema;

    let mut prior = index_config("abcdef", "toto");
    prior
        .set_string(
            &AttributePath::new("created_at"),
            "2022-02-10T07:45:15Z".to_string(),
        )
        .unwrap();
    prior
        .set_string(
            &AttributePath::new("updated_at"),
            "2022-02-21T15:28:43Z".to_string(),
        )
        .unwrap();
    prior
        .set_string(&AttributePath::new("id"), "placeholder".to_string())
        .unwrap();

    let change = plan_resource_change(&schema, &prior, &index_config("abcdefg", "toto"));
    assert_eq!(change.action, PlanAction::Replace);
    assert_eq!(change.requires_replace, vec![AttributePath::new("uid")]);

    let change = plan_resource_change(&schema, &prior, &index_config("abcdef", "tata"));
    assert_eq!(change.action, PlanAction::Replace);
    assert_eq!(
        change.requires_replace,
        vec![AttributePath::new("primary_key")]
    );

    let change = plan_resource_change(&schema, &prior, &index_config("abcdef", "toto"));
    assert_eq!(change.action, PlanAction::NoOp);
}

#[tokio::test]
async fn index_validate_rejects_malformed_uid() {
    let server = mockito::Server::new_async().await;
    let resource = configured_index_resource(&server).await;

    let mut config = DynamicValue::empty_object();
    config
        .set_string(&AttributePath::new("uid"), "bad uid!".to_string())
        .unwrap();

    let response = resource
        .validate(
            Context::new(),
            tfplug::resource::ValidateResourceConfigRequest {
                type_name: "meilisearch_index".to_string(),
                config,
            },
        )
        .await;

    assert!(has_errors(&response.diagnostics));

    let response = resource
        .validate(
            Context::new(),
            tfplug::resource::ValidateResourceConfigRequest {
                type_name: "meilisearch_index".to_string(),
                config: index_config("movies-2024", "id"),
            },
        )
        .await;

    assert!(!has_errors(&response.diagnostics));
}

#[tokio::test]
async fn index_create_with_empty_primary_key_stores_null() {
    let mut server = mockito::Server::new_async().await;
    let create = server
        .mock("POST", "/indexes")
        // primaryKey must be absent from the request, not empty
        .match_body(mockito::Matcher::Json(serde_json::json!({
            "uid": "abcdef"
        })))
        .with_status(202)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"taskUid":9,"indexUid":"abcdef","status":"enqueued","type":"indexCreation","enqueuedAt":"2022-02-10T07:45:15.628261Z"}"#,
        )
        .create_async()
        .await;
    let _task = server
        .mock("GET", "/tasks/9")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"uid":9,"indexUid":"abcdef","status":"succeeded","type":"indexCreation"}"#)
        .create_async()
        .await;
    let fetch = server
        .mock("GET", "/indexes/abcdef")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(INDEX_BODY.replace(r#""toto""#, "null"))
        .create_async()
        .await;

    let resource = configured_index_resource(&server).await;
    let config = index_config("abcdef", "");
    let response = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "meilisearch_index".to_string(),
                planned_state: config.clone(),
                config,
            },
        )
        .await;

    create.assert_async().await;
    fetch.assert_async().await;

    assert!(!has_errors(&response.diagnostics));
    assert_eq!(
        response.new_state.get(&AttributePath::new("primary_key")),
        Dynamic::Null
    );
}

#[tokio::test]
async fn key_create_round_trip() {
    let mut server = mockito::Server::new_async().await;
    let create = server
        .mock("POST", "/keys")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "name": "test key",
            "description": "a test key",
            "actions": ["search"],
            "indexes": ["test_index_1", "test_index_2"],
            "expiresAt": "2042-04-02T00:42:42Z"
        })))
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(KEY_BODY)
        .create_async()
        .await;

    let resource = configured_key_resource(&server).await;

    let mut config = DynamicValue::empty_object();
    config
        .set_string(&AttributePath::new("name"), "test key".to_string())
        .unwrap();
    config
        .set_string(&AttributePath::new("description"), "a test key".to_string())
        .unwrap();
    config
        .set_string_list(&AttributePath::new("actions"), vec!["search".to_string()])
        .unwrap();
    config
        .set_string_list(
            &AttributePath::new("indexes"),
            vec!["test_index_1".to_string(), "test_index_2".to_string()],
        )
        .unwrap();
    config
        .set_string(
            &AttributePath::new("expires_at"),
            "2042-04-02T00:42:42Z".to_string(),
        )
        .unwrap();

    let response = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "meilisearch_key".to_string(),
                planned_state: config.clone(),
                config,
            },
        )
        .await;

    create.assert_async().await;
    assert!(!has_errors(&response.diagnostics));

    let state = response.new_state;
    assert_eq!(
        state.get_string(&AttributePath::new("uid")).unwrap(),
        "6062abda-a5aa-4414-ac91-ecd7944c0f8d"
    );
    assert_eq!(
        state.get_string(&AttributePath::new("key")).unwrap(),
        "d0552b41536279a0ad88bd595327b96f01176a60c2243e906c52ac02375f9bc4"
    );
    assert_eq!(
        state.get_string_list(&AttributePath::new("actions")).unwrap(),
        vec!["search"]
    );
    assert_eq!(
        state.get_string_list(&AttributePath::new("indexes")).unwrap(),
        vec!["test_index_1", "test_index_2"]
    );
    assert_eq!(
        state.get_string(&AttributePath::new("expires_at")).unwrap(),
        "2042-04-02T00:42:42Z"
    );
    assert_eq!(
        state.get_string(&AttributePath::new("id")).unwrap(),
        "placeholder"
    );
}

#[tokio::test]
async fn key_create_rejects_malformed_expiry() {
    let server = mockito::Server::new_async().await;
    let resource = configured_key_resource(&server).await;

    let mut config = DynamicValue::empty_object();
    config
        .set_string_list(&AttributePath::new("actions"), vec!["search".to_string()])
        .unwrap();
    config
        .set_string_list(
            &AttributePath::new("indexes"),
            vec!["test_index_1".to_string()],
        )
        .unwrap();
    config
        .set_string(&AttributePath::new("expires_at"), "tomorrow".to_string())
        .unwrap();

    let response = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "meilisearch_key".to_string(),
                planned_state: config.clone(),
                config,
            },
        )
        .await;

    assert!(has_errors(&response.diagnostics));
    assert!(response.diagnostics[0]
        .detail
        .contains("Could not parse expiresAt attribute"));
}

#[tokio::test]
async fn key_update_patches_name_and_description() {
    let mut server = mockito::Server::new_async().await;
    let patch = server
        .mock(
            "PATCH",
            "/keys/6062abda-a5aa-4414-ac91-ecd7944c0f8d",
        )
        .match_body(mockito::Matcher::Json(serde_json::json!({
            "name": "renamed key",
            "description": "a test key"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(KEY_BODY.replace("test key", "renamed key"))
        .create_async()
        .await;

    let resource = configured_key_resource(&server).await;

    let mut planned = DynamicValue::empty_object();
    planned
        .set_string(
            &AttributePath::new("uid"),
            "6062abda-a5aa-4414-ac91-ecd7944c0f8d".to_string(),
        )
        .unwrap();
    let mut config = planned.clone();
    config
        .set_string(&AttributePath::new("name"), "renamed key".to_string())
        .unwrap();
    config
        .set_string(&AttributePath::new("description"), "a test key".to_string())
        .unwrap();

    let response = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: "meilisearch_key".to_string(),
                prior_state: planned.clone(),
                planned_state: planned,
                config,
            },
        )
        .await;

    patch.assert_async().await;
    assert!(!has_errors(&response.diagnostics));
    assert_eq!(
        response
            .new_state
            .get_string(&AttributePath::new("name"))
            .unwrap(),
        "renamed key"
    );
}

#[tokio::test]
async fn key_plan_replaces_on_scope_change_but_not_rename() {
    let server = mockito::Server::new_async().await;
    let resource = configured_key_resource(&server).await;
    let schema = resource
        .schema(Context::new(), ResourceSchemaRequest)
        .await
        .schema;

    let mut prior = DynamicValue::empty_object();
    prior
        .set_string(
            &AttributePath::new("uid"),
            "6062abda-a5aa-4414-ac91-ecd7944c0f8d".to_string(),
        )
        .unwrap();
    prior
        .set_string(&AttributePath::new("name"), "test key".to_string())
        .unwrap();
    prior
        .set_null(&AttributePath::new("description"))
        .unwrap();
    prior
        .set_string(&AttributePath::new("key"), "secret".to_string())
        .unwrap();
    prior
        .set_string_list(&AttributePath::new("actions"), vec!["search".to_string()])
        .unwrap();
    prior
        .set_string_list(
            &AttributePath::new("indexes"),
            vec!["test_index_1".to_string(), "test_index_2".to_string()],
        )
        .unwrap();
    prior
        .set_null(&AttributePath::new("expires_at"))
        .unwrap();
    prior
        .set_string(
            &AttributePath::new("created_at"),
            "2022-02-10T07:45:15Z".to_string(),
        )
        .unwrap();
    prior
        .set_string(
            &AttributePath::new("updated_at"),
            "2022-02-21T15:28:43Z".to_string(),
        )
        .unwrap();
    prior
        .set_string(&AttributePath::new("id"), "placeholder".to_string())
        .unwrap();

    // Widening the actions list forces a replace
    let mut config = DynamicValue::empty_object();
    config
        .set_string(&AttributePath::new("name"), "test key".to_string())
        .unwrap();
    config
        .set_string_list(
            &AttributePath::new("actions"),
            vec!["search".to_string(), "documents.add".to_string()],
        )
        .unwrap();
    config
        .set_string_list(
            &AttributePath::new("indexes"),
            vec!["test_index_1".to_string(), "test_index_2".to_string()],
        )
        .unwrap();

    let change = plan_resource_change(&schema, &prior, &config);
    assert_eq!(change.action, PlanAction::Replace);
    assert_eq!(change.requires_replace, vec![AttributePath::new("actions")]);

    // Renaming only is an in-place update; the secret survives from state
    let mut config = DynamicValue::empty_object();
    config
        .set_string(&AttributePath::new("name"), "renamed key".to_string())
        .unwrap();
    config
        .set_string_list(&AttributePath::new("actions"), vec!["search".to_string()])
        .unwrap();
    config
        .set_string_list(
            &AttributePath::new("indexes"),
            vec!["test_index_1".to_string(), "test_index_2".to_string()],
        )
        .unwrap();

    let change = plan_resource_change(&schema, &prior, &config);
    assert_eq!(change.action, PlanAction::Update);
    assert!(change.requires_replace.is_empty());
    assert_eq!(
        change
            .planned_state
            .get_string(&AttributePath::new("key"))
            .unwrap(),
        "secret"
    );
    assert_eq!(
        change
            .planned_state
            .get_string(&AttributePath::new("uid"))
            .unwrap(),
        "6062abda-a5aa-4414-ac91-ecd7944c0f8d"
    );
}

#[tokio::test]
async fn key_read_drops_state_when_gone() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/keys/6062abda-a5aa-4414-ac91-ecd7944c0f8d")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"message":"API key not found.","code":"api_key_not_found","type":"invalid_request","link":""}"#,
        )
        .create_async()
        .await;

    let resource = configured_key_resource(&server).await;
    let mut state = DynamicValue::empty_object();
    state
        .set_string(
            &AttributePath::new("uid"),
            "6062abda-a5aa-4414-ac91-ecd7944c0f8d".to_string(),
        )
        .unwrap();

    let response = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "meilisearch_key".to_string(),
                current_state: state,
            },
        )
        .await;

    assert!(!has_errors(&response.diagnostics));
    assert!(response.new_state.is_none());
}

#[tokio::test]
async fn import_sets_uid_for_follow_up_read() {
    let server = mockito::Server::new_async().await;
    let resource = configured_index_resource(&server).await;

    let response = resource
        .import_state(
            Context::new(),
            ImportResourceStateRequest {
                type_name: "meilisearch_index".to_string(),
                id: "movies".to_string(),
            },
        )
        .await;

    assert!(!has_errors(&response.diagnostics));
    assert_eq!(response.imported_resources.len(), 1);
    assert_eq!(
        response.imported_resources[0]
            .state
            .get_string(&AttributePath::new("uid"))
            .unwrap(),
        "movies"
    );
}

#[tokio::test]
async fn version_data_source_reads_server_version() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/version")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"commitSha":"b46889b5f0f2f8b91438a08a358ba8f05fc09fc1","commitDate":"2019-11-15T09:51:54.278247+00:00","pkgVersion":"1.7.3"}"#,
        )
        .create_async()
        .await;

    let mut data_source = VersionDataSource::new();
    let configure = data_source
        .configure(
            Context::new(),
            ConfigureDataSourceRequest {
                provider_data: Some(provider_data_for(&server)),
            },
        )
        .await;
    assert!(!has_errors(&configure.diagnostics));

    let response = data_source
        .read(
            Context::new(),
            ReadDataSourceRequest {
                type_name: "meilisearch_version".to_string(),
                config: DynamicValue::empty_object(),
            },
        )
        .await;

    mock.assert_async().await;
    assert!(!has_errors(&response.diagnostics));
    assert_eq!(
        response
            .state
            .get_string(&AttributePath::new("pkg_version"))
            .unwrap(),
        "1.7.3"
    );
    assert_eq!(
        response
            .state
            .get_string(&AttributePath::new("id"))
            .unwrap(),
        "placeholder"
    );
}

#[tokio::test]
async fn key_validate_flags_bad_uid_and_expiry() {
    let server = mockito::Server::new_async().await;
    let resource = configured_key_resource(&server).await;

    let mut config = DynamicValue::empty_object();
    config
        .set_string(&AttributePath::new("uid"), "not-a-uuid".to_string())
        .unwrap();
    config
        .set_string(&AttributePath::new("expires_at"), "next week".to_string())
        .unwrap();

    let response = resource
        .validate(
            Context::new(),
            tfplug::resource::ValidateResourceConfigRequest {
                type_name: "meilisearch_key".to_string(),
                config,
            },
        )
        .await;

    assert_eq!(response.diagnostics.len(), 2);
    assert!(response.diagnostics.iter().all(|d| d.is_error()));
}

#[tokio::test]
async fn key_plan_carries_explicit_null_expiry() {
    let server = mockito::Server::new_async().await;
    let resource = configured_key_resource(&server).await;
    let schema = resource
        .schema(Context::new(), ResourceSchemaRequest)
        .await
        .schema;

    let mut config = DynamicValue::empty_object();
    config
        .set_string_list(&AttributePath::new("actions"), vec!["search".to_string()])
        .unwrap();
    config
        .set_string_list(
            &AttributePath::new("indexes"),
            vec!["test_index_1".to_string()],
        )
        .unwrap();

    let change = plan_resource_change(&schema, &DynamicValue::null(), &config);
    assert_eq!(change.action, PlanAction::Create);
    assert_eq!(
        change.planned_state.get(&AttributePath::new("expires_at")),
        Dynamic::Null
    );
    // Server-computed attributes stay unknown until apply
    assert!(change
        .planned_state
        .is_unknown_at(&AttributePath::new("key")));
    assert!(change
        .planned_state
        .is_unknown_at(&AttributePath::new("uid")));
}
