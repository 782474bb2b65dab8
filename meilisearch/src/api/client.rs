use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::error::{ApiError, ApiErrorBody};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Meilisearch API client
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: String,
    auth_header: String,
}

impl Client {
    /// Create a new API client. The host must be a valid absolute URL.
    pub fn new(host: &str, api_key: &str) -> Result<Self, ApiError> {
        Url::parse(host).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", host, e)))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let base_url = host.trim_end_matches('/').to_string();
        let auth_header = format!("Bearer {}", api_key);

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                auth_header,
            }),
        })
    }

    /// Execute a GET request
    pub async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);

        tracing::debug!("GET request to: {}", url);

        let response = self
            .inner
            .http_client
            .get(&url)
            .header(AUTHORIZATION, &self.inner.auth_header)
            .send()
            .await?;

        self.parse_response(response).await
    }

    /// Execute a POST request with a JSON body
    pub async fn post<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);

        tracing::debug!("POST request to: {}", url);

        let response = self
            .inner
            .http_client
            .post(&url)
            .header(AUTHORIZATION, &self.inner.auth_header)
            .json(body)
            .send()
            .await?;

        self.parse_response(response).await
    }

    /// Execute a PATCH request with a JSON body
    pub async fn patch<T: for<'de> Deserialize<'de>, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);

        tracing::debug!("PATCH request to: {}", url);

        let response = self
            .inner
            .http_client
            .patch(&url)
            .header(AUTHORIZATION, &self.inner.auth_header)
            .json(body)
            .send()
            .await?;

        self.parse_response(response).await
    }

    /// Execute a DELETE request and parse the response body
    pub async fn delete<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);

        tracing::debug!("DELETE request to: {}", url);

        let response = self
            .inner
            .http_client
            .delete(&url)
            .header(AUTHORIZATION, &self.inner.auth_header)
            .send()
            .await?;

        self.parse_response(response).await
    }

    /// Execute a DELETE request where success carries no body (204)
    pub async fn delete_no_content(&self, path: &str) -> Result<(), ApiError> {
        let url = format!("{}{}", self.inner.base_url, path);

        tracing::debug!("DELETE request to: {}", url);

        let response = self
            .inner
            .http_client
            .delete(&url)
            .header(AUTHORIZATION, &self.inner.auth_header)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(self.error_from_response(response).await)
    }

    async fn parse_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();

        if !status.is_success() {
            return Err(self.error_from_response(response).await);
        }

        let text = response.text().await?;
        tracing::debug!("API response body: {}", text);

        serde_json::from_str::<T>(&text).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
            ApiError::ParseError(format!("failed to parse response: {}", e))
        })
    }

    async fn error_from_response(&self, response: reqwest::Response) -> ApiError {
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return ApiError::AuthError;
        }

        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        match serde_json::from_str::<ApiErrorBody>(&text) {
            Ok(body) => ApiError::Api {
                status: status.as_u16(),
                code: body.code,
                message: body.message,
                error_type: body.error_type,
            },
            Err(_) => ApiError::Api {
                status: status.as_u16(),
                code: "unknown".to_string(),
                message: text,
                error_type: "unknown".to_string(),
            },
        }
    }
}
