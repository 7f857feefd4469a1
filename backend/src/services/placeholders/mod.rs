//! # Placeholder Registry Service Module
//!
//! Placeholder definitions describe, per scene, how each `{key}` of a prompt
//! is resolved: typed in by the user or looked up in a dimension table.
//!
//! ## Registered routes (under `/api/placeholders`)
//!
//! *   **`GET /{scene}`**: the scene's `PlaceholderRegistry` (scene plus
//!     definitions in creation order). Unknown scenes yield an empty registry.
//! *   **`POST /save`**: upserts a definition by `(scene, key)`.
//! *   **`DELETE /{id}`**: removes a definition.
//! *   **`POST /validate`**: validates `{scene, text}` and answers with a
//!     `ValidationOutcome`. Invalid text is a `200` with `valid: false`.

mod get;
pub(crate) mod save;
pub(crate) mod validate;

use actix_web::web::{delete, get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/placeholders";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/save", post().to(save::process))
        .route("/validate", post().to(validate::process))
        .route("/{scene}", get().to(get::process))
        .route("/{id}", delete().to(save::remove))
}
