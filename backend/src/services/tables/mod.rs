//! Manages the multi-dimension tables that table-bound placeholders read from.
//!
//! The provided routes are:
//! - `POST /api/tables/upload`: multipart/form-data upload. A `json` field with
//!   the table metadata (`{id, name}`) must come before the `file` field with
//!   the CSV data. The header is validated, the delimiter detected and every
//!   row stored. The response body is `true` when the file is identical (same
//!   MD5) to the one already imported, in which case nothing is rewritten, and
//!   `false` otherwise.
//! - `GET /api/tables`: every table with its columns, without rows.
//! - `GET /api/tables/{table_id}`: one table including its rows.

use actix_web::web::{get, post, scope};
use actix_web::Scope;

mod get;
mod upload;

#[cfg(test)]
pub(crate) use upload::import_table;

const API_PATH: &str = "/api/tables";

/// Configures and returns the Actix scope for dimension table routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(get::list))
        .route("/upload", post().to(upload::process))
        .route("/{table_id}", get().to(get::process))
}
