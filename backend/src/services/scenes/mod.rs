//! # Scene Service Module
//!
//! Scenes are the business contexts that scope placeholders and prompts.
//!
//! ## Registered routes (under `/api/scenes`)
//! - `GET ""`: every scene, ordered by code.
//! - `POST /save`: creates or updates a scene by code.
//! - `DELETE /{code}`: deletes a scene together with its placeholder definitions.

mod crud;

use actix_web::web::{delete, get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/scenes";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(crud::list))
        .route("/save", post().to(crud::save))
        .route("/{code}", delete().to(crud::remove))
}
