use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::tasks::TaskInfo;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    pub uid: String,
    /// Null until set explicitly or guessed from the first documents
    pub primary_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIndexRequest {
    pub uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<String>,
}

impl super::Client {
    pub async fn get_index(&self, uid: &str) -> Result<Index, ApiError> {
        self.get(&format!("/indexes/{}", urlencoding::encode(uid)))
            .await
    }

    /// Enqueues an index creation task.
    pub async fn create_index(&self, request: &CreateIndexRequest) -> Result<TaskInfo, ApiError> {
        self.post("/indexes", request).await
    }

    /// Enqueues an index deletion task.
    pub async fn delete_index(&self, uid: &str) -> Result<TaskInfo, ApiError> {
        self.delete(&format!("/indexes/{}", urlencoding::encode(uid)))
            .await
    }
}
