//! Creation, update and removal of placeholder definitions.
//!
//! Definitions are unique per `(scene, key)`; saving an existing pair updates
//! it in place and keeps its ID. A definition bound to a multi-dimension table
//! must name both the table and the column it reads.

use crate::db::{data_source_type_name, placeholder_from_row, Database, PLACEHOLDER_COLUMNS};
use actix_web::{web, HttpResponse, Responder};
use common::model::place_holder::{DataSourceType, PlaceholderDefinition};
use rusqlite::params;

pub(crate) async fn process(
    db: web::Data<Database>,
    payload: web::Json<PlaceholderDefinition>,
) -> impl Responder {
    let definition = payload.into_inner();
    if let Err(e) = check_definition(&definition) {
        return HttpResponse::BadRequest().body(e);
    }
    match save_placeholder(&db, &definition) {
        Ok(saved) => HttpResponse::Ok().json(saved),
        Err(e) => {
            log::error!("saving placeholder {} failed: {}", definition.key, e);
            HttpResponse::ServiceUnavailable().body(format!("Error saving placeholder: {}", e))
        }
    }
}

pub(crate) async fn remove(db: web::Data<Database>, id: web::Path<i64>) -> impl Responder {
    match delete_placeholder(&db, *id) {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => HttpResponse::NotFound().body("Placeholder not found"),
        Err(e) => {
            HttpResponse::ServiceUnavailable().body(format!("Error deleting placeholder: {}", e))
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Rejects definitions that could never resolve.
pub fn check_definition(definition: &PlaceholderDefinition) -> Result<(), String> {
    if definition.scene.trim().is_empty() {
        return Err("Placeholder scene must not be empty".to_string());
    }
    let key = definition.key.trim();
    if key.is_empty() {
        return Err("Placeholder key must not be empty".to_string());
    }
    if key.contains(['{', '}']) {
        return Err("Placeholder key must not contain braces".to_string());
    }
    if definition.data_source_type == DataSourceType::MultiDimensionTable
        && (is_blank(&definition.table_id) || is_blank(&definition.table_column_key))
    {
        return Err("Table placeholders need table_id and table_column_key".to_string());
    }
    Ok(())
}

/// Upserts the definition and returns it as stored, ID included.
pub fn save_placeholder(
    db: &Database,
    definition: &PlaceholderDefinition,
) -> Result<PlaceholderDefinition, String> {
    let conn = db.connect()?;
    let key = definition.key.trim();
    let label = if definition.label.trim().is_empty() {
        key
    } else {
        definition.label.trim()
    };

    conn.execute(
        "INSERT INTO placeholders (scene, placeholder_key, label, description, data_source_type,
             table_id, table_column_key, table_row_id_param_key)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT (scene, placeholder_key) DO UPDATE SET
             label = excluded.label,
             description = excluded.description,
             data_source_type = excluded.data_source_type,
             table_id = excluded.table_id,
             table_column_key = excluded.table_column_key,
             table_row_id_param_key = excluded.table_row_id_param_key",
        params![
            definition.scene.trim(),
            key,
            label,
            definition.description,
            data_source_type_name(definition.data_source_type),
            definition.table_id,
            definition.table_column_key,
            definition.table_row_id_param_key,
        ],
    )
    .map_err(|e| e.to_string())?;

    conn.query_row(
        &format!(
            "SELECT {} FROM placeholders WHERE scene = ?1 AND placeholder_key = ?2",
            PLACEHOLDER_COLUMNS
        ),
        params![definition.scene.trim(), key],
        placeholder_from_row,
    )
    .map_err(|e| e.to_string())
}

pub fn delete_placeholder(db: &Database, id: i64) -> Result<bool, String> {
    let conn = db.connect()?;
    let removed = conn
        .execute("DELETE FROM placeholders WHERE id = ?1", params![id])
        .map_err(|e| e.to_string())?;
    Ok(removed > 0)
}
