use crate::db::Database;
use crate::services::placeholders::validate::validate_for_scene;
use actix_web::{web, HttpResponse, Responder};
use common::model::scene::DEFAULT_TENANT;
use common::model::template::Prompt;
use rusqlite::params;
use std::time::{SystemTime, UNIX_EPOCH};

/// Failure modes of saving a prompt, mapped to distinct HTTP statuses.
#[derive(Debug, PartialEq)]
pub enum SaveError {
    /// The payload or its placeholders are not acceptable (`400`).
    Invalid(String),
    /// Storage failed (`503`).
    Storage(String),
}

pub(crate) async fn process(db: web::Data<Database>, payload: web::Json<Prompt>) -> impl Responder {
    match save_prompt(&db, payload.into_inner()) {
        Ok(saved) => HttpResponse::Ok().json(saved),
        Err(SaveError::Invalid(e)) => HttpResponse::BadRequest().body(e),
        Err(SaveError::Storage(e)) => {
            log::error!("saving prompt failed: {}", e);
            HttpResponse::ServiceUnavailable().body(format!("Error saving prompt: {}", e))
        }
    }
}

pub(crate) async fn remove(db: web::Data<Database>, id: web::Path<String>) -> impl Responder {
    match delete_prompt(&db, &id) {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => HttpResponse::NotFound().body("Prompt not found"),
        Err(e) => HttpResponse::ServiceUnavailable().body(format!("Error deleting prompt: {}", e)),
    }
}

/// MD5 hex digest of the prompt content, used by clients for dirty checking.
pub fn compute_md5(input: &str) -> String {
    format!("{:x}", md5::compute(input))
}

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Validates and stores a prompt, returning it as stored.
///
/// A missing ID creates a new prompt; an empty tenant falls back to `default`.
pub fn save_prompt(db: &Database, mut prompt: Prompt) -> Result<Prompt, SaveError> {
    if prompt.scene.trim().is_empty() {
        return Err(SaveError::Invalid("Prompt scene must not be empty".to_string()));
    }
    if prompt.name.trim().is_empty() {
        return Err(SaveError::Invalid("Prompt name must not be empty".to_string()));
    }

    let outcome =
        validate_for_scene(db, &prompt.scene, &prompt.content).map_err(SaveError::Storage)?;
    if !outcome.valid {
        return Err(SaveError::Invalid(outcome.error.unwrap_or_default()));
    }

    if prompt.id.trim().is_empty() {
        prompt.id = uuid::Uuid::new_v4().to_string();
    }
    if prompt.tenant.trim().is_empty() {
        prompt.tenant = DEFAULT_TENANT.to_string();
    }
    prompt.content_md5 = compute_md5(&prompt.content);
    prompt.updated_at = now_secs();

    let conn = db.connect().map_err(SaveError::Storage)?;
    conn.execute(
        "INSERT OR REPLACE INTO prompts (id, tenant, scene, name, content, content_md5, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            prompt.id,
            prompt.tenant,
            prompt.scene,
            prompt.name,
            prompt.content,
            prompt.content_md5,
            prompt.updated_at,
        ],
    )
    .map_err(|e| SaveError::Storage(e.to_string()))?;

    log::info!("saved prompt {} ({})", prompt.id, prompt.name);
    Ok(prompt)
}

pub fn delete_prompt(db: &Database, id: &str) -> Result<bool, String> {
    let conn = db.connect()?;
    let removed = conn
        .execute("DELETE FROM prompts WHERE id = ?1", params![id])
        .map_err(|e| e.to_string())?;
    Ok(removed > 0)
}
