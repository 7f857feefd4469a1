use crate::db::Database;
use actix_web::{web, HttpResponse, Responder};
use common::model::scene::Scene;
use rusqlite::params;

pub(crate) async fn list(db: web::Data<Database>) -> impl Responder {
    match list_scenes(&db) {
        Ok(scenes) => HttpResponse::Ok().json(scenes),
        Err(e) => {
            log::error!("listing scenes failed: {}", e);
            HttpResponse::ServiceUnavailable().body(format!("Error listing scenes: {}", e))
        }
    }
}

pub(crate) async fn save(db: web::Data<Database>, payload: web::Json<Scene>) -> impl Responder {
    let mut scene = payload.into_inner();
    scene.code = scene.code.trim().to_string();
    if scene.code.is_empty() {
        return HttpResponse::BadRequest().body("Scene code must not be empty");
    }
    match save_scene(&db, &scene) {
        Ok(()) => HttpResponse::Ok().json(scene),
        Err(e) => {
            log::error!("saving scene {} failed: {}", scene.code, e);
            HttpResponse::ServiceUnavailable().body(format!("Error saving scene: {}", e))
        }
    }
}

pub(crate) async fn remove(db: web::Data<Database>, code: web::Path<String>) -> impl Responder {
    match delete_scene(&db, &code) {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => HttpResponse::NotFound().body("Scene not found"),
        Err(e) => HttpResponse::ServiceUnavailable().body(format!("Error deleting scene: {}", e)),
    }
}

pub fn list_scenes(db: &Database) -> Result<Vec<Scene>, String> {
    let conn = db.connect()?;
    let mut stmt = conn
        .prepare("SELECT code, label, description FROM scenes ORDER BY code")
        .map_err(|e| e.to_string())?;
    let scenes = stmt
        .query_map([], |row| {
            Ok(Scene {
                code: row.get(0)?,
                label: row.get(1)?,
                description: row.get(2)?,
            })
        })
        .map_err(|e| e.to_string())?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;
    Ok(scenes)
}

pub fn save_scene(db: &Database, scene: &Scene) -> Result<(), String> {
    let conn = db.connect()?;
    conn.execute(
        "INSERT OR REPLACE INTO scenes (code, label, description) VALUES (?1, ?2, ?3)",
        params![scene.code.trim(), scene.label, scene.description],
    )
    .map_err(|e| e.to_string())?;
    Ok(())
}

/// Deletes the scene and its placeholders. Returns `false` when the scene did not exist.
pub fn delete_scene(db: &Database, code: &str) -> Result<bool, String> {
    let mut conn = db.connect()?;
    let tx = conn.transaction().map_err(|e| e.to_string())?;
    tx.execute("DELETE FROM placeholders WHERE scene = ?1", params![code])
        .map_err(|e| e.to_string())?;
    let removed = tx
        .execute("DELETE FROM scenes WHERE code = ?1", params![code])
        .map_err(|e| e.to_string())?;
    tx.commit().map_err(|e| e.to_string())?;
    Ok(removed > 0)
}
