use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub commit_sha: String,
    pub commit_date: String,
    pub pkg_version: String,
}

impl super::Client {
    pub async fn get_version(&self) -> Result<VersionInfo, super::ApiError> {
        self.get("/version").await
    }
}
