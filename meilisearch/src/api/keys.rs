use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Key {
    pub uid: String,
    /// The actual secret, only ever produced by the server
    pub key: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub actions: Vec<String>,
    pub indexes: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKeyRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub actions: Vec<String>,
    pub indexes: Vec<String>,
    /// RFC3339, must be present even when null
    pub expires_at: Option<String>,
}

/// Only name and description are mutable on an existing key.
#[derive(Debug, Clone, Serialize)]
pub struct PatchKeyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl super::Client {
    pub async fn get_key(&self, uid: &str) -> Result<Key, ApiError> {
        self.get(&format!("/keys/{}", urlencoding::encode(uid)))
            .await
    }

    pub async fn create_key(&self, request: &CreateKeyRequest) -> Result<Key, ApiError> {
        self.post("/keys", request).await
    }

    pub async fn patch_key(&self, uid: &str, request: &PatchKeyRequest) -> Result<Key, ApiError> {
        self.patch(&format!("/keys/{}", urlencoding::encode(uid)), request)
            .await
    }

    pub async fn delete_key(&self, uid: &str) -> Result<(), ApiError> {
        self.delete_no_content(&format!("/keys/{}", urlencoding::encode(uid)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Client;

    const KEY_BODY: &str = r#"{
        "name": "Search key",
        "description": null,
        "key": "d0552b41536279a0ad88bd595327b96f01176a60c2243e906c52ac02375f9bc4",
        "uid": "6062abda-a5aa-4414-ac91-ecd7944c0f8d",
        "actions": ["search"],
        "indexes": ["test_index_1", "test_index_2"],
        "expiresAt": "2042-04-02T00:42:42Z",
        "createdAt": "2022-02-10T07:45:15.628261Z",
        "updatedAt": "2022-02-21T15:28:43.496574Z"
    }"#;

    #[tokio::test]
    async fn create_key_sends_null_expiry_when_absent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/keys")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "actions": ["search"],
                "indexes": ["test_index_1", "test_index_2"],
                "expiresAt": null
            })))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(KEY_BODY.replace(r#""2042-04-02T00:42:42Z""#, "null"))
            .create_async()
            .await;

        let client = Client::new(&server.url(), "masterKey").unwrap();
        let key = client
            .create_key(&CreateKeyRequest {
                uid: None,
                name: Some("Search key".to_string()),
                description: None,
                actions: vec!["search".to_string()],
                indexes: vec!["test_index_1".to_string(), "test_index_2".to_string()],
                expires_at: None,
            })
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(key.expires_at.is_none());
        assert_eq!(key.actions, vec!["search"]);
    }

    #[tokio::test]
    async fn get_key_parses_full_record() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/keys/6062abda-a5aa-4414-ac91-ecd7944c0f8d")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(KEY_BODY)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "masterKey").unwrap();
        let key = client
            .get_key("6062abda-a5aa-4414-ac91-ecd7944c0f8d")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(key.uid, "6062abda-a5aa-4414-ac91-ecd7944c0f8d");
        assert_eq!(key.indexes, vec!["test_index_1", "test_index_2"]);
        assert!(key.expires_at.is_some());
    }

    #[tokio::test]
    async fn delete_key_accepts_no_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/keys/6062abda-a5aa-4414-ac91-ecd7944c0f8d")
            .with_status(204)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "masterKey").unwrap();
        client
            .delete_key("6062abda-a5aa-4414-ac91-ecd7944c0f8d")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[test]
    fn patch_request_keeps_explicit_nulls() {
        let body = serde_json::to_value(PatchKeyRequest {
            name: Some("renamed".to_string()),
            description: None,
        })
        .unwrap();

        assert_eq!(
            body,
            serde_json::json!({"name": "renamed", "description": null})
        );
    }
}
