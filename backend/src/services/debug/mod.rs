//! # Debug Service Module
//!
//! Endpoints used by the debug/preview dialog to try a prompt with concrete
//! parameters. All of them accept a `DebugRequest`: the text is the request's
//! `content`, or the stored prompt named by `prompt_id`, and
//! `additional_params` carries the flattened params panel values.
//!
//! ## Registered routes (under `/api/debug`)
//!
//! *   **`POST /render`**: substitutes the placeholders and answers with a
//!     `RenderResponse` (content plus the placeholders left unresolved).
//! *   **`POST /chat`**: streams the rendered content back as Server-Sent
//!     Events, one `data: {"content": ...}` frame per word, closed by a
//!     `data: [DONE]` frame. This is a dry-run echo: no model is called.
//! *   **`POST /api`**: schedules the render as a background task and
//!     immediately returns `{"task_id": ...}`. Progress is read from
//!     `GET /api/tasks/{task_id}`; with `notify_url` set the final task state
//!     is also POSTed to that URL.

mod api;
mod chat;
mod notify;
pub(crate) mod render;

use actix_web::web::{post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/debug";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/render", post().to(render::process))
        .route("/chat", post().to(chat::process))
        .route("/api", post().to(api::process))
}
