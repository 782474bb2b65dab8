use serde::Deserialize;
use std::time::Duration;
use tokio::time::{sleep, Instant};

use super::error::ApiError;

/// Summary returned by every asynchronous write endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    pub task_uid: i64,
    #[serde(default)]
    pub index_uid: Option<String>,
    pub status: TaskStatus,
    #[serde(rename = "type")]
    pub task_type: String,
    pub enqueued_at: String,
}

/// Full task record from GET /tasks/{uid}.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub uid: i64,
    #[serde(default)]
    pub index_uid: Option<String>,
    pub status: TaskStatus,
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(default)]
    pub error: Option<TaskError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskError {
    pub message: String,
    pub code: String,
    #[serde(rename = "type")]
    pub error_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskStatus {
    Enqueued,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Succeeded | TaskStatus::Failed | TaskStatus::Canceled
        )
    }
}

/// Polling parameters for [`Client::wait_for_task`].
#[derive(Debug, Clone)]
pub struct WaitOptions {
    pub first_interval: Duration,
    pub max_interval: Duration,
    pub timeout: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            first_interval: Duration::from_millis(50),
            max_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(60),
        }
    }
}

impl super::Client {
    pub async fn get_task(&self, task_uid: i64) -> Result<Task, ApiError> {
        self.get(&format!("/tasks/{}", task_uid)).await
    }

    /// Poll a task until it reaches a terminal status.
    ///
    /// The interval doubles from `first_interval` up to `max_interval`.
    /// A task still pending after `timeout` is a hard error; the write may
    /// or may not have completed on the server.
    pub async fn wait_for_task(
        &self,
        task_uid: i64,
        options: WaitOptions,
    ) -> Result<Task, ApiError> {
        let deadline = Instant::now() + options.timeout;
        let mut interval = options.first_interval;

        loop {
            let task = self.get_task(task_uid).await?;
            if task.status.is_terminal() {
                return Ok(task);
            }

            if Instant::now() + interval > deadline {
                return Err(ApiError::TaskTimeout {
                    task_uid,
                    timeout_secs: options.timeout.as_secs(),
                });
            }

            sleep(interval).await;
            interval = std::cmp::min(interval * 2, options.max_interval);
        }
    }
}
