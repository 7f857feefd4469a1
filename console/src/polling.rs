//! Cancelable task status polling for api-mode debug runs.
//!
//! `PollHandle::spawn` starts a background loop that waits one interval,
//! reads `GET /api/tasks/{task_id}` and stops once the task is `completed` or
//! `failed`. The loop listens on a `CancellationToken`: cancelling the handle,
//! cancelling a parent token, or dropping the handle ends it at the next await
//! point, including a request already in flight.

use std::time::Duration;

use common::jobs::TaskState;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;
use crate::error::{ConsoleError, Result};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Polls until the task reaches a terminal state or `cancel` fires.
pub async fn poll_task(
    client: &ApiClient,
    task_id: &str,
    interval: Duration,
    cancel: &CancellationToken,
) -> Result<TaskState> {
    loop {
        let state = tokio::select! {
            _ = cancel.cancelled() => return Err(ConsoleError::Cancelled),
            state = async {
                tokio::time::sleep(interval).await;
                client.task_status(task_id).await
            } => state?,
        };
        log::debug!("task {} is {:?}", task_id, state.status);
        if state.status.is_terminal() {
            return Ok(state);
        }
    }
}

/// Owns a running poll loop. Dropping the handle cancels the loop.
pub struct PollHandle {
    task_id: String,
    token: CancellationToken,
    join: Option<JoinHandle<Result<TaskState>>>,
}

impl PollHandle {
    pub fn spawn(client: ApiClient, task_id: &str, interval: Duration) -> Self {
        Self::spawn_with_parent(client, task_id, interval, &CancellationToken::new())
    }

    /// Like `spawn`, but the loop also stops when `parent` is cancelled.
    pub fn spawn_with_parent(
        client: ApiClient,
        task_id: &str,
        interval: Duration,
        parent: &CancellationToken,
    ) -> Self {
        let token = parent.child_token();
        let loop_token = token.clone();
        let id = task_id.to_string();
        let join = tokio::spawn(async move { poll_task(&client, &id, interval, &loop_token).await });
        Self {
            task_id: task_id.to_string(),
            token,
            join: Some(join),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits for the loop to finish and returns the final task state.
    pub async fn wait(mut self) -> Result<TaskState> {
        let Some(join) = self.join.take() else {
            return Err(ConsoleError::Cancelled);
        };
        match join.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(ConsoleError::Cancelled),
            Err(e) => Err(ConsoleError::Stream(format!("poll loop panicked: {}", e))),
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        if self.join.is_some() {
            log::debug!("stopping poll for task {}", self.task_id);
        }
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::jobs::TaskStatus;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FAST: Duration = Duration::from_millis(20);

    async fn mount_running(server: &MockServer, times: Option<u64>) {
        let mock = Mock::given(method("GET"))
            .and(path("/api/tasks/t-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"task_id": "t-1", "status": "running"})),
            );
        match times {
            Some(n) => mock.up_to_n_times(n).mount(server).await,
            None => mock.mount(server).await,
        }
    }

    async fn request_count(server: &MockServer) -> usize {
        server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn polls_until_completed() {
        let server = MockServer::start().await;
        mount_running(&server, Some(2)).await;
        Mock::given(method("GET"))
            .and(path("/api/tasks/t-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "task_id": "t-1",
                "status": "completed",
                "result": "Hello Ada"
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).expect("client");
        let state = PollHandle::spawn(client, "t-1", FAST)
            .wait()
            .await
            .expect("poll");
        assert_eq!(state.status, TaskStatus::Completed);
        assert_eq!(state.result.as_deref(), Some("Hello Ada"));
        assert_eq!(request_count(&server).await, 3);
    }

    #[tokio::test]
    async fn cancel_ends_the_wait() {
        let server = MockServer::start().await;
        mount_running(&server, None).await;

        let client = ApiClient::new(&server.uri()).expect("client");
        let handle = PollHandle::spawn(client, "t-1", FAST);
        tokio::time::sleep(FAST * 3).await;
        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(matches!(handle.wait().await, Err(ConsoleError::Cancelled)));
    }

    #[tokio::test]
    async fn dropping_the_handle_stops_polling() {
        let server = MockServer::start().await;
        mount_running(&server, None).await;

        let client = ApiClient::new(&server.uri()).expect("client");
        let handle = PollHandle::spawn(client, "t-1", FAST);
        tokio::time::sleep(FAST * 4).await;
        drop(handle);

        tokio::time::sleep(FAST * 2).await;
        let after_drop = request_count(&server).await;
        assert!(after_drop > 0);
        tokio::time::sleep(FAST * 8).await;
        assert_eq!(request_count(&server).await, after_drop);
    }

    #[tokio::test]
    async fn parent_token_cancels_children() {
        let server = MockServer::start().await;
        mount_running(&server, None).await;

        let parent = CancellationToken::new();
        let client = ApiClient::new(&server.uri()).expect("client");
        let handle = PollHandle::spawn_with_parent(client, "t-1", FAST, &parent);
        assert_eq!(handle.task_id(), "t-1");
        parent.cancel();
        assert!(matches!(handle.wait().await, Err(ConsoleError::Cancelled)));
    }
}
