//! CSV import of dimension tables.
//!
//! The multipart handler only gathers the two fields; the actual work is done
//! by [`import_table`] so it can be exercised without HTTP.

use crate::db::Database;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use common::model::datasource::{DataSource, TableRow};
use futures_util::StreamExt;
use regex::Regex;
use rusqlite::{params, OptionalExtension};
use serde_json::from_slice;
use std::sync::LazyLock;

/// Column titles: letters, marks, digits, `-` and `_` once spaces are replaced.
static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}\p{M}\p{N}\-_]+$").expect("header pattern is valid")
});

/// HTTP handler wrapper that converts the import result to an `HttpResponse`.
///
/// - On success: `200 OK` with `true` (unchanged file) or `false` (imported).
/// - On failure: `400 Bad Request` with the error message.
pub async fn process(db: web::Data<Database>, payload: Multipart) -> impl Responder {
    match upload_table(&db, payload).await {
        Ok(unchanged) => HttpResponse::Ok().body(unchanged.to_string()),
        Err(e) => {
            log::warn!("table upload rejected: {}", e);
            HttpResponse::BadRequest().body(format!("Error: {}", e))
        }
    }
}

async fn upload_table(db: &Database, mut payload: Multipart) -> Result<bool, String> {
    let mut data_source: Option<DataSource> = None;
    let mut file_bytes: Option<Vec<u8>> = None;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| e.to_string())?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match name.as_deref() {
            Some("json") => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    bytes.extend_from_slice(&chunk.map_err(|e| e.to_string())?);
                }
                let ds: DataSource = from_slice(&bytes).map_err(|e| e.to_string())?;
                data_source = Some(ds);
            }
            Some("file") => {
                if data_source.is_none() {
                    return Err("DataSource JSON must be sent before the file".to_string());
                }
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();
                if !filename.ends_with(".csv") {
                    return Err("The file must end with .csv".to_string());
                }
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    bytes.extend_from_slice(&chunk.map_err(|e| e.to_string())?);
                }
                file_bytes = Some(bytes);
            }
            _ => {}
        }
    }

    let ds = data_source.ok_or("Missing DataSource")?;
    let bytes = file_bytes.ok_or("Missing file")?;
    import_table(db, &ds, &bytes)
}

/// Picks the most frequent of `,`, `;`, tab and `|` in the header line.
/// Ties, including a header without any of them, go to `,`.
pub fn detect_delimiter(header_line: &str) -> u8 {
    [b'|', b'\t', b';', b',']
        .into_iter()
        .max_by_key(|&d| header_line.matches(d as char).count())
        .unwrap_or(b',')
}

fn normalize_title(cell: &str) -> String {
    cell.trim()
        .replace('\u{00A0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Normalises header cells and rejects empty, malformed or repeated titles.
pub fn validate_and_normalize_titles(cells: &[&str]) -> Result<Vec<String>, String> {
    let mut titles: Vec<String> = Vec::with_capacity(cells.len());
    for cell in cells {
        let title = normalize_title(cell);
        if title.is_empty() {
            return Err("CSV header cells must not be empty".to_string());
        }
        if !HEADER_RE.is_match(&title) {
            return Err(format!(
                "CSV header cell '{}' may only contain letters, digits, '-' and '_'",
                title
            ));
        }
        if titles.contains(&title) {
            return Err(format!("CSV header cell '{}' is repeated", title));
        }
        titles.push(title);
    }
    Ok(titles)
}

/// Parses CSV bytes into column titles and rows.
pub fn parse_csv(bytes: &[u8]) -> Result<(Vec<String>, Vec<TableRow>), String> {
    let text = std::str::from_utf8(bytes).map_err(|_| "CSV is not valid UTF-8".to_string())?;
    let header_line = text.lines().next().unwrap_or_default();
    let delimiter = detect_delimiter(header_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let header_cells: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(str::to_string)
        .collect();
    let cells: Vec<&str> = header_cells.iter().map(String::as_str).collect();
    let titles = validate_and_normalize_titles(&cells)?;

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        // +2: header line and 1-based numbering
        let record = record.map_err(|e| format!("row {}: {}", idx + 2, e))?;
        let row: TableRow = titles
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        rows.push(row);
    }
    Ok((titles, rows))
}

/// Imports `bytes` as the content of table `ds.id`.
///
/// Returns `Ok(true)` without touching the stored rows when the MD5 of the
/// upload equals the one of the last import.
pub fn import_table(db: &Database, ds: &DataSource, bytes: &[u8]) -> Result<bool, String> {
    if ds.id.trim().is_empty() {
        return Err("Table id must not be empty".to_string());
    }
    let computed_md5 = format!("{:x}", md5::compute(bytes));

    let mut conn = db.connect()?;
    let stored_md5: Option<String> = conn
        .query_row(
            "SELECT content_md5 FROM dimension_tables WHERE id = ?1",
            params![ds.id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| e.to_string())?;
    if stored_md5.as_deref() == Some(computed_md5.as_str()) {
        return Ok(true);
    }

    let (titles, rows) = parse_csv(bytes)?;
    let columns = serde_json::to_string(&titles).map_err(|e| e.to_string())?;

    let tx = conn.transaction().map_err(|e| e.to_string())?;
    tx.execute(
        "INSERT OR REPLACE INTO dimension_tables (id, name, columns, content_md5)
         VALUES (?1, ?2, ?3, ?4)",
        params![ds.id, ds.name, columns, computed_md5],
    )
    .map_err(|e| e.to_string())?;
    tx.execute(
        "DELETE FROM dimension_rows WHERE table_id = ?1",
        params![ds.id],
    )
    .map_err(|e| e.to_string())?;
    {
        let mut insert = tx
            .prepare("INSERT INTO dimension_rows (table_id, row_index, data) VALUES (?1, ?2, ?3)")
            .map_err(|e| e.to_string())?;
        for (idx, row) in rows.iter().enumerate() {
            let data = serde_json::to_string(row).map_err(|e| e.to_string())?;
            insert
                .execute(params![ds.id, idx as i64, data])
                .map_err(|e| e.to_string())?;
        }
    }
    tx.commit().map_err(|e| e.to_string())?;

    log::info!("imported table {} with {} rows", ds.id, rows.len());
    Ok(false)
}
