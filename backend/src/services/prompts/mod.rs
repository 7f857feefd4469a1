//! # Prompt Service Module
//!
//! This module aggregates the endpoints that manage prompt templates.
//!
//! ## Sub-modules:
//! - `get`: retrieval of one prompt or a filtered list.
//! - `save`: creation and update, gated by placeholder validation.
//!
//! ## Registered routes (under `/api/prompts`)
//!
//! *   **`GET ""`**: prompts filtered by the optional `scene` and `tenant`
//!     query parameters, most recently updated first.
//! *   **`GET /{id}`**: one prompt, `404` when unknown.
//! *   **`POST /save`**: validates the content against the scene's registry
//!     and stores it. Invalid content is rejected with `400` and the
//!     validation message as body.
//! *   **`DELETE /{id}`**: removes a prompt.

pub(crate) mod get;
mod save;

use actix_web::web::{delete, get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/prompts";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(get::list))
        .route("/save", post().to(save::process))
        .route("/{id}", get().to(get::process))
        .route("/{id}", delete().to(save::remove))
}
