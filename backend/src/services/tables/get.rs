use crate::db::Database;
use actix_web::{web, HttpResponse, Responder};
use common::model::datasource::{DimensionTable, TableRow};
use rusqlite::{params, Connection, OptionalExtension};

pub(crate) async fn list(db: web::Data<Database>) -> impl Responder {
    match list_tables(&db) {
        Ok(tables) => HttpResponse::Ok().json(tables),
        Err(e) => HttpResponse::ServiceUnavailable().body(format!("Error listing tables: {}", e)),
    }
}

pub(crate) async fn process(db: web::Data<Database>, table_id: web::Path<String>) -> impl Responder {
    match get_table(&db, &table_id) {
        Ok(Some(table)) => HttpResponse::Ok().json(table),
        Ok(None) => HttpResponse::NotFound().body("Table not found"),
        Err(e) => HttpResponse::ServiceUnavailable().body(format!("Error retrieving table: {}", e)),
    }
}

fn table_header(
    conn: &Connection,
    table_id: &str,
) -> Result<Option<DimensionTable>, String> {
    let header = conn
        .query_row(
            "SELECT id, name, columns, content_md5 FROM dimension_tables WHERE id = ?1",
            params![table_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()
        .map_err(|e| e.to_string())?;

    let Some((id, name, columns, content_md5)) = header else {
        return Ok(None);
    };
    Ok(Some(DimensionTable {
        id,
        name,
        columns: serde_json::from_str(&columns).map_err(|e| e.to_string())?,
        rows: Vec::new(),
        content_md5,
    }))
}

/// Every table with its columns; rows are left out.
pub fn list_tables(db: &Database) -> Result<Vec<DimensionTable>, String> {
    let conn = db.connect()?;
    let ids: Vec<String> = conn
        .prepare("SELECT id FROM dimension_tables ORDER BY id")
        .map_err(|e| e.to_string())?
        .query_map([], |row| row.get(0))
        .map_err(|e| e.to_string())?
        .filter_map(Result::ok)
        .collect();

    let mut tables = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(table) = table_header(&conn, &id)? {
            tables.push(table);
        }
    }
    Ok(tables)
}

pub fn get_table(db: &Database, table_id: &str) -> Result<Option<DimensionTable>, String> {
    let conn = db.connect()?;
    let Some(mut table) = table_header(&conn, table_id)? else {
        return Ok(None);
    };

    let mut stmt = conn
        .prepare("SELECT data FROM dimension_rows WHERE table_id = ?1 ORDER BY row_index")
        .map_err(|e| e.to_string())?;
    let raw_rows = stmt
        .query_map(params![table_id], |row| row.get::<_, String>(0))
        .map_err(|e| e.to_string())?;
    for raw in raw_rows {
        let raw = raw.map_err(|e| e.to_string())?;
        let row: TableRow = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
        table.rows.push(row);
    }
    Ok(Some(table))
}
