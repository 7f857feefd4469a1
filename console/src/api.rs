//! HTTP client for the PromptHub backend.
//!
//! Every call returns typed payloads from `common`; non-2xx responses become
//! `ConsoleError::Status` carrying the body text the server sent, which for
//! this backend is always a human-readable message.

use std::pin::Pin;
use std::time::Duration;

use common::jobs::TaskState;
use common::model::place_holder::PlaceholderRegistry;
use common::requests::{
    ChatChunk, DebugApiResponse, DebugRequest, RenderResponse, ValidateRequest, ValidationOutcome,
    STREAM_DONE,
};
use eventsource_stream::Eventsource;
use futures_util::{future, Stream, StreamExt};
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;

use crate::error::{ConsoleError, Result};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Content chunks of one chat debug run, in arrival order.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /api/placeholders/{scene}`
    pub async fn fetch_registry(&self, scene: &str) -> Result<PlaceholderRegistry> {
        log::debug!("fetching placeholder registry for scene {}", scene);
        let resp = self
            .http
            .get(self.url(&format!("/api/placeholders/{}", scene)))
            .send()
            .await?;
        decode(resp).await
    }

    /// `POST /api/placeholders/validate`
    pub async fn validate(&self, req: &ValidateRequest) -> Result<ValidationOutcome> {
        let resp = self
            .http
            .post(self.url("/api/placeholders/validate"))
            .json(req)
            .send()
            .await?;
        decode(resp).await
    }

    /// `POST /api/debug/render`
    pub async fn render(&self, req: &DebugRequest) -> Result<RenderResponse> {
        let resp = self
            .http
            .post(self.url("/api/debug/render"))
            .json(req)
            .send()
            .await?;
        decode(resp).await
    }

    /// `POST /api/debug/api`
    pub async fn start_api_debug(&self, req: &DebugRequest) -> Result<DebugApiResponse> {
        let resp = self
            .http
            .post(self.url("/api/debug/api"))
            .json(req)
            .send()
            .await?;
        decode(resp).await
    }

    /// `GET /api/tasks/{task_id}`
    pub async fn task_status(&self, task_id: &str) -> Result<TaskState> {
        let resp = self
            .http
            .get(self.url(&format!("/api/tasks/{}", task_id)))
            .send()
            .await?;
        decode(resp).await
    }

    /// `POST /api/debug/chat`, returning the decoded chunk contents.
    ///
    /// The stream ends at the `[DONE]` sentinel or when the server closes the
    /// connection, whichever comes first.
    pub async fn chat_stream(&self, req: &DebugRequest) -> Result<ChatStream> {
        let resp = self
            .http
            .post(self.url("/api/debug/chat"))
            .header(ACCEPT, "text/event-stream")
            .json(req)
            .send()
            .await?;
        let resp = check_status(resp).await?;

        let chunks = resp
            .bytes_stream()
            .eventsource()
            .take_while(|event| {
                let done = matches!(event, Ok(ev) if ev.data == STREAM_DONE);
                future::ready(!done)
            })
            .map(|event| match event {
                Ok(ev) => serde_json::from_str::<ChatChunk>(&ev.data)
                    .map(|chunk| chunk.content)
                    .map_err(ConsoleError::from),
                Err(e) => Err(ConsoleError::Stream(e.to_string())),
            });
        Ok(chunks.boxed())
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ConsoleError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let resp = check_status(resp).await?;
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
