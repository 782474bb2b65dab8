use thiserror::Error;

/// Error envelope returned by the Meilisearch API.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    pub code: String,
    #[serde(rename = "type")]
    pub error_type: String,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error (HTTP {status}): {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
        error_type: String,
    },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Invalid host URL: {0}")]
    InvalidUrl(String),

    #[error("Authentication failed")]
    AuthError,

    #[error("task {task_uid} did not complete within {timeout_secs} seconds")]
    TaskTimeout { task_uid: i64, timeout_secs: u64 },
}

impl ApiError {
    /// Whether the error is the API telling us the object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ApiError::Api { code, .. } if code == "index_not_found" || code == "api_key_not_found"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_detection_uses_error_code() {
        let err = ApiError::Api {
            status: 404,
            code: "index_not_found".to_string(),
            message: "Index `movies` not found.".to_string(),
            error_type: "invalid_request".to_string(),
        };
        assert!(err.is_not_found());

        let err = ApiError::Api {
            status: 404,
            code: "api_key_not_found".to_string(),
            message: "API key not found.".to_string(),
            error_type: "invalid_request".to_string(),
        };
        assert!(err.is_not_found());

        let err = ApiError::Api {
            status: 400,
            code: "invalid_index_uid".to_string(),
            message: "bad uid".to_string(),
            error_type: "invalid_request".to_string(),
        };
        assert!(!err.is_not_found());
    }

    #[test]
    fn error_body_deserializes_envelope() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"message":"Index `movies` not found.","code":"index_not_found","type":"invalid_request","link":"https://docs.meilisearch.com/errors#index_not_found"}"#,
        )
        .unwrap();

        assert_eq!(body.code, "index_not_found");
        assert_eq!(body.error_type, "invalid_request");
    }
}
