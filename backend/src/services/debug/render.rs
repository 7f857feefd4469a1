//! # Prompt Render Service
//!
//! Resolves the text of a `DebugRequest` and substitutes its placeholders.
//!
//! Input placeholders arrive as plain strings and are substituted directly.
//! Table placeholders arrive as a single `{column: value}` condition; the row
//! matching the condition is read from the dimension table bound to the
//! placeholder's definition, and the definition's `table_column_key` cell
//! replaces the placeholder. Anything that cannot be resolved stays in the
//! text as written and is listed in the response.

use crate::db::{load_registry, Database, SqliteTables};
use crate::services::prompts::get::get_prompt;
use actix_web::{web, HttpResponse, Responder};
use common::requests::{DebugRequest, RenderResponse};
use common::template::substitute;

/// Failure modes of a render, mapped to distinct HTTP statuses.
#[derive(Debug, PartialEq)]
pub enum RenderFailure {
    /// `404`: the referenced prompt does not exist.
    NotFound(String),
    /// `400`: the request cannot be rendered as sent.
    Invalid(String),
    /// `503`: storage failed.
    Storage(String),
}

impl RenderFailure {
    pub fn message(&self) -> &str {
        match self {
            RenderFailure::NotFound(m) | RenderFailure::Invalid(m) | RenderFailure::Storage(m) => m,
        }
    }

    pub fn into_response(self) -> HttpResponse {
        match self {
            RenderFailure::NotFound(m) => HttpResponse::NotFound().body(m),
            RenderFailure::Invalid(m) => HttpResponse::BadRequest().body(m),
            RenderFailure::Storage(m) => {
                log::error!("render failed: {}", m);
                HttpResponse::ServiceUnavailable().body(format!("Error rendering prompt: {}", m))
            }
        }
    }
}

/// Handler for `POST /api/debug/render`.
pub(crate) async fn process(
    db: web::Data<Database>,
    payload: web::Json<DebugRequest>,
) -> impl Responder {
    match render_request(&db, &payload) {
        Ok(rendered) => HttpResponse::Ok().json(rendered),
        Err(failure) => failure.into_response(),
    }
}

/// The raw text a request asks to render.
fn source_text(db: &Database, req: &DebugRequest) -> Result<String, RenderFailure> {
    if let Some(content) = &req.content {
        return Ok(content.clone());
    }
    let Some(prompt_id) = req.prompt_id.as_deref() else {
        return Err(RenderFailure::Invalid(
            "Either content or prompt_id is required".to_string(),
        ));
    };
    match get_prompt(db, prompt_id).map_err(RenderFailure::Storage)? {
        Some(prompt) => Ok(prompt.content),
        None => Err(RenderFailure::NotFound(format!(
            "Prompt {} not found",
            prompt_id
        ))),
    }
}

/// Renders the request's text with its additional params.
pub fn render_request(db: &Database, req: &DebugRequest) -> Result<RenderResponse, RenderFailure> {
    let text = source_text(db, req)?;
    let registry = load_registry(db, &req.scene).map_err(RenderFailure::Storage)?;
    let conn = db.connect().map_err(RenderFailure::Storage)?;

    let rendered = substitute(
        &text,
        &req.additional_params,
        &registry,
        &SqliteTables::new(&conn),
    )
    .map_err(|e| RenderFailure::Storage(e.to_string()))?;

    if !rendered.unresolved.is_empty() {
        log::debug!(
            "render left {} placeholder(s) unresolved: {}",
            rendered.unresolved.len(),
            rendered.unresolved.join(", ")
        );
    }
    Ok(RenderResponse {
        content: rendered.content,
        unresolved: rendered.unresolved,
    })
}
