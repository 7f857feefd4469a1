//! # Debug Session
//!
//! Drives one debug conversation against the backend in either mode:
//!
//! - **chat**: `POST /api/debug/chat` and append each SSE chunk to the reply.
//! - **api**: `POST /api/debug/api`. A synchronous `result` completes the
//!   send right away. A `task_id` is polled every interval until it finishes,
//!   unless the request carries a `notify_url`, in which case the backend
//!   delivers the result there and no polling happens.
//!
//! Drivers only perform I/O and translate its outcomes into `Msg`s; the
//! session itself changes exclusively through `update`.

mod messages;
mod state;
mod update;

pub use messages::Msg;
pub use state::{ChatMessage, DebugMode, DebugSession, Role, SessionState};
pub use update::update;

use std::time::Duration;

use common::requests::DebugRequest;
use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;
use crate::error::ConsoleError;
use crate::polling::PollHandle;

/// Sends `user_text` in chat mode and streams the reply into the session.
pub async fn run_chat(
    session: &mut DebugSession,
    client: &ApiClient,
    user_text: &str,
    req: &DebugRequest,
    cancel: &CancellationToken,
) {
    if !update(session, Msg::Send(user_text.to_string())) {
        return;
    }

    let mut stream = match client.chat_stream(req).await {
        Ok(stream) => stream,
        Err(e) => {
            update(session, Msg::Failed(e.to_string()));
            return;
        }
    };

    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => Some(Err(ConsoleError::Cancelled)),
            next = stream.next() => next,
        };
        match next {
            Some(Ok(chunk)) => {
                update(session, Msg::Chunk(chunk));
            }
            Some(Err(e)) => {
                update(session, Msg::Failed(e.to_string()));
                return;
            }
            None => {
                update(session, Msg::StreamEnd);
                return;
            }
        }
    }
}

/// Sends `user_text` in api mode, polling the scheduled task when needed.
pub async fn run_api(
    session: &mut DebugSession,
    client: &ApiClient,
    user_text: &str,
    req: &DebugRequest,
    poll_interval: Duration,
    cancel: &CancellationToken,
) {
    if !update(session, Msg::Send(user_text.to_string())) {
        return;
    }

    let resp = match client.start_api_debug(req).await {
        Ok(resp) => resp,
        Err(e) => {
            update(session, Msg::Failed(e.to_string()));
            return;
        }
    };

    let Some(task_id) = resp.task_id else {
        update(session, Msg::ApiResult(resp.result.unwrap_or_default()));
        return;
    };

    if let Some(notify_url) = req.notify_url.clone() {
        log::info!("task {} will be delivered to {}", task_id, notify_url);
        update(
            session,
            Msg::TaskDelegated {
                task_id,
                notify_url,
            },
        );
        return;
    }

    update(session, Msg::TaskStarted(task_id.clone()));
    let handle = PollHandle::spawn_with_parent(client.clone(), &task_id, poll_interval, cancel);
    log::debug!("polling task {} every {:?}", handle.task_id(), poll_interval);
    match handle.wait().await {
        Ok(state) => {
            update(session, Msg::TaskFinished(state));
        }
        Err(e) => {
            update(session, Msg::Failed(e.to_string()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FAST: Duration = Duration::from_millis(10);

    fn request() -> DebugRequest {
        DebugRequest {
            scene: "billing".to_string(),
            content: Some("Hello {name}".to_string()),
            ..DebugRequest::default()
        }
    }

    #[tokio::test]
    async fn chat_run_completes_with_streamed_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/debug/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(
                        "data: {\"content\":\"Hello \"}\n\ndata: {\"content\":\"Ada\"}\n\ndata: [DONE]\n\n",
                    ),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).expect("client");
        let mut session = DebugSession::new();
        run_chat(
            &mut session,
            &client,
            "Hello {name}",
            &request(),
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(session.state, SessionState::Completed);
        assert_eq!(session.last_reply(), Some("Hello Ada"));
    }

    #[tokio::test]
    async fn chat_run_reports_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/debug/chat"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Prompt p not found"))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).expect("client");
        let mut session = DebugSession::new();
        run_chat(
            &mut session,
            &client,
            "hi",
            &request(),
            &CancellationToken::new(),
        )
        .await;

        let expected = "server answered 404: Prompt p not found".to_string();
        assert_eq!(session.state, SessionState::Failed(expected.clone()));
        assert_eq!(session.last_reply(), Some(expected.as_str()));
    }

    #[tokio::test]
    async fn api_run_polls_the_task() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/debug/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "t-1"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/tasks/t-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "task_id": "t-1",
                "status": "completed",
                "result": "Hello Ada"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).expect("client");
        let mut session = DebugSession::new();
        run_api(
            &mut session,
            &client,
            "hi",
            &request(),
            FAST,
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(session.state, SessionState::Completed);
        assert_eq!(session.task_id.as_deref(), Some("t-1"));
        assert_eq!(session.last_reply(), Some("Hello Ada"));
    }

    #[tokio::test]
    async fn api_run_with_notify_url_skips_polling() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/debug/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "t-2"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/tasks/t-2"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).expect("client");
        let mut session = DebugSession::new();
        let req = DebugRequest {
            notify_url: Some("http://hooks.local/done".to_string()),
            ..request()
        };
        run_api(
            &mut session,
            &client,
            "hi",
            &req,
            FAST,
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(session.state, SessionState::Completed);
        assert_eq!(session.task_id.as_deref(), Some("t-2"));
    }

    #[tokio::test]
    async fn api_run_uses_a_synchronous_result() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/debug/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "done"})))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).expect("client");
        let mut session = DebugSession::new();
        run_api(
            &mut session,
            &client,
            "hi",
            &request(),
            FAST,
            &CancellationToken::new(),
        )
        .await;

        assert_eq!(session.state, SessionState::Completed);
        assert_eq!(session.last_reply(), Some("done"));
    }

    #[tokio::test]
    async fn closing_the_dialog_cancels_polling() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/debug/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "t-3"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/tasks/t-3"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"task_id": "t-3", "status": "running"})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).expect("client");
        let cancel = CancellationToken::new();
        let closer = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(FAST * 5).await;
            closer.cancel();
        });

        let mut session = DebugSession::new();
        run_api(&mut session, &client, "hi", &request(), FAST, &cancel).await;
        assert_eq!(
            session.state,
            SessionState::Failed("operation cancelled".to_string())
        );
    }
}
