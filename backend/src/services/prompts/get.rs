//! # Prompt Retrieval Service
//!
//! Backend logic of `GET /api/prompts` and `GET /api/prompts/{id}`.
//! Both read straight from the `prompts` table; no placeholder processing
//! happens here.

use crate::db::Database;
use actix_web::{web, HttpResponse, Responder};
use common::model::template::Prompt;
use rusqlite::{params, OptionalExtension, Row};
use serde::Deserialize;

const PROMPT_COLUMNS: &str = "id, tenant, scene, name, content, content_md5, updated_at";

/// Optional filters of the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct PromptFilter {
    pub scene: Option<String>,
    pub tenant: Option<String>,
}

pub(crate) async fn list(
    db: web::Data<Database>,
    filter: web::Query<PromptFilter>,
) -> impl Responder {
    match list_prompts(&db, &filter) {
        Ok(prompts) => HttpResponse::Ok().json(prompts),
        Err(e) => HttpResponse::ServiceUnavailable().body(format!("Error listing prompts: {}", e)),
    }
}

pub(crate) async fn process(db: web::Data<Database>, id: web::Path<String>) -> impl Responder {
    match get_prompt(&db, &id) {
        Ok(Some(prompt)) => HttpResponse::Ok().json(prompt),
        Ok(None) => HttpResponse::NotFound().body("Prompt not found"),
        Err(e) => {
            HttpResponse::ServiceUnavailable().body(format!("Error retrieving prompt: {}", e))
        }
    }
}

fn prompt_from_row(row: &Row<'_>) -> rusqlite::Result<Prompt> {
    Ok(Prompt {
        id: row.get(0)?,
        tenant: row.get(1)?,
        scene: row.get(2)?,
        name: row.get(3)?,
        content: row.get(4)?,
        content_md5: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

pub fn get_prompt(db: &Database, id: &str) -> Result<Option<Prompt>, String> {
    let conn = db.connect()?;
    conn.query_row(
        &format!("SELECT {} FROM prompts WHERE id = ?1", PROMPT_COLUMNS),
        params![id],
        prompt_from_row,
    )
    .optional()
    .map_err(|e| e.to_string())
}

pub fn list_prompts(db: &Database, filter: &PromptFilter) -> Result<Vec<Prompt>, String> {
    let conn = db.connect()?;
    // NULL filters match every row.
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM prompts
             WHERE (?1 IS NULL OR scene = ?1) AND (?2 IS NULL OR tenant = ?2)
             ORDER BY updated_at DESC, name",
            PROMPT_COLUMNS
        ))
        .map_err(|e| e.to_string())?;
    let prompts = stmt
        .query_map(params![filter.scene, filter.tenant], prompt_from_row)
        .map_err(|e| e.to_string())?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;
    Ok(prompts)
}
