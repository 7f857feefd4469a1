use serde::{Deserialize, Serialize};

use crate::model::param::AdditionalParams;

/// Request payload for `POST /api/placeholders/validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateRequest {
    pub scene: String,
    pub text: String,
}

/// Result of validating prompt text against a scene registry.
///
/// Serialises as `{"valid": true}` or `{"valid": false, "error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationOutcome {
    pub fn ok() -> Self {
        Self {
            valid: true,
            error: None,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            error: Some(error.into()),
        }
    }
}

/// Request payload shared by the debug endpoints (`render`, `chat`, `api`).
///
/// The text to render is `content` when present, otherwise the stored prompt
/// named by `prompt_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugRequest {
    pub scene: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<String>,
    #[serde(default)]
    pub additional_params: AdditionalParams,
    /// When set, the backend delivers the final task state here and the
    /// client does not poll.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_url: Option<String>,
}

/// Response of `POST /api/debug/render`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderResponse {
    pub content: String,
    /// Literal texts of the placeholders that were left in place.
    #[serde(default)]
    pub unresolved: Vec<String>,
}

/// Response of `POST /api/debug/api`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugApiResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

/// One `data:` payload of the chat SSE stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatChunk {
    pub content: String,
}

/// The sentinel that ends the chat SSE stream.
pub const STREAM_DONE: &str = "[DONE]";
