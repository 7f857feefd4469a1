//! SQLite storage.
//!
//! The server opens one short-lived connection per operation on the database
//! file named in the configuration. The schema is created on startup by
//! [`Database::init`].

use common::model::place_holder::{DataSourceType, PlaceholderDefinition, PlaceholderRegistry};
use common::model::scene::{Scene, Tenant};
use common::template::TableLookup;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS scenes (
    code TEXT PRIMARY KEY,
    label TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT ''
);
CREATE TABLE IF NOT EXISTS tenants (
    code TEXT PRIMARY KEY,
    name TEXT NOT NULL DEFAULT ''
);
CREATE TABLE IF NOT EXISTS placeholders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    scene TEXT NOT NULL,
    placeholder_key TEXT NOT NULL,
    label TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    data_source_type TEXT NOT NULL,
    table_id TEXT,
    table_column_key TEXT,
    table_row_id_param_key TEXT,
    UNIQUE (scene, placeholder_key)
);
CREATE TABLE IF NOT EXISTS prompts (
    id TEXT PRIMARY KEY,
    tenant TEXT NOT NULL,
    scene TEXT NOT NULL,
    name TEXT NOT NULL,
    content TEXT NOT NULL,
    content_md5 TEXT NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS dimension_tables (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL DEFAULT '',
    columns TEXT NOT NULL,
    content_md5 TEXT NOT NULL DEFAULT ''
);
CREATE TABLE IF NOT EXISTS dimension_rows (
    table_id TEXT NOT NULL,
    row_index INTEGER NOT NULL,
    data TEXT NOT NULL,
    PRIMARY KEY (table_id, row_index)
);
";

/// Handle on the database file. Cheap to clone; shared as `web::Data`.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn connect(&self) -> Result<Connection, String> {
        Connection::open(&self.path).map_err(|e| e.to_string())
    }

    /// Creates missing tables and the `default` tenant.
    pub fn init(&self) -> Result<(), String> {
        let conn = self.connect()?;
        conn.execute_batch(SCHEMA).map_err(|e| e.to_string())?;
        let tenant = Tenant::default_tenant();
        conn.execute(
            "INSERT OR IGNORE INTO tenants (code, name) VALUES (?1, ?2)",
            params![tenant.code, tenant.name],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }
}

pub(crate) fn data_source_type_name(data_source_type: DataSourceType) -> &'static str {
    match data_source_type {
        DataSourceType::UserInput => "user_input",
        DataSourceType::MultiDimensionTable => "multi_dimension_table",
    }
}

fn parse_data_source_type(raw: &str) -> DataSourceType {
    match raw {
        "multi_dimension_table" => DataSourceType::MultiDimensionTable,
        _ => DataSourceType::UserInput,
    }
}

pub(crate) const PLACEHOLDER_COLUMNS: &str = "id, scene, placeholder_key, label, description, \
     data_source_type, table_id, table_column_key, table_row_id_param_key";

pub(crate) fn placeholder_from_row(row: &Row<'_>) -> rusqlite::Result<PlaceholderDefinition> {
    Ok(PlaceholderDefinition {
        id: Some(row.get(0)?),
        scene: row.get(1)?,
        key: row.get(2)?,
        label: row.get(3)?,
        description: row.get(4)?,
        data_source_type: parse_data_source_type(&row.get::<_, String>(5)?),
        table_id: row.get(6)?,
        table_column_key: row.get(7)?,
        table_row_id_param_key: row.get(8)?,
    })
}

/// Looks up a scene by code.
pub(crate) fn find_scene(conn: &Connection, code: &str) -> Result<Option<Scene>, String> {
    conn.query_row(
        "SELECT code, label, description FROM scenes WHERE code = ?1",
        params![code],
        |row| {
            Ok(Scene {
                code: row.get(0)?,
                label: row.get(1)?,
                description: row.get(2)?,
            })
        },
    )
    .optional()
    .map_err(|e| e.to_string())
}

/// Loads the placeholder registry of `scene`.
///
/// A scene that was never saved still has a registry; its label is the code.
pub(crate) fn load_registry(db: &Database, scene: &str) -> Result<PlaceholderRegistry, String> {
    let conn = db.connect()?;
    let scene_row = find_scene(&conn, scene)?.unwrap_or_else(|| Scene::from_code(scene));

    let mut stmt = conn
        .prepare(&format!(
            "SELECT {} FROM placeholders WHERE scene = ?1 ORDER BY id",
            PLACEHOLDER_COLUMNS
        ))
        .map_err(|e| e.to_string())?;
    let placeholders = stmt
        .query_map(params![scene], placeholder_from_row)
        .map_err(|e| e.to_string())?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;

    Ok(PlaceholderRegistry::new(scene_row, placeholders))
}

/// Table lookups against the `dimension_rows` table.
pub struct SqliteTables<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteTables<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl TableLookup for SqliteTables<'_> {
    fn lookup(
        &self,
        table_id: &str,
        column: &str,
        value: &str,
        target_column: &str,
    ) -> Result<Option<String>, String> {
        let mut stmt = self
            .conn
            .prepare("SELECT data FROM dimension_rows WHERE table_id = ?1 ORDER BY row_index")
            .map_err(|e| e.to_string())?;
        let rows = stmt
            .query_map(params![table_id], |row| row.get::<_, String>(0))
            .map_err(|e| e.to_string())?;

        for data in rows {
            let data = data.map_err(|e| e.to_string())?;
            let row: common::model::datasource::TableRow =
                serde_json::from_str(&data).map_err(|e| e.to_string())?;
            if row.get(column).map(String::as_str) == Some(value) {
                return Ok(row.get(target_column).cloned());
            }
        }
        Ok(None)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::temp_db;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn init_is_idempotent_and_seeds_default_tenant() {
        let (_dir, db) = temp_db();
        db.init().expect("second init");
        let conn = db.connect().expect("connect");
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM tenants WHERE code = 'default'", [], |row| {
                row.get(0)
            })
            .expect("count");
        assert_eq!(count, 1);
        let name: String = conn
            .query_row("SELECT name FROM tenants WHERE code = 'default'", [], |row| {
                row.get(0)
            })
            .expect("name");
        assert_eq!(name, Tenant::default_tenant().name);
    }

    #[test]
    fn registry_of_unknown_scene_uses_code_as_label() {
        let (_dir, db) = temp_db();
        let registry = load_registry(&db, "ghost").expect("registry");
        assert_eq!(registry.scene_label(), "ghost");
        assert!(registry.placeholders.is_empty());
    }

    #[test]
    fn lookup_returns_first_matching_row() {
        let (_dir, db) = temp_db();
        let conn = db.connect().expect("connect");
        for (idx, data) in [
            r#"{"row_id":"1","amount":"10"}"#,
            r#"{"row_id":"2","amount":"20"}"#,
            r#"{"row_id":"2","amount":"99"}"#,
        ]
        .iter()
        .enumerate()
        {
            conn.execute(
                "INSERT INTO dimension_rows (table_id, row_index, data) VALUES ('t1', ?1, ?2)",
                params![idx as i64, data],
            )
            .expect("insert row");
        }

        let tables = SqliteTables::new(&conn);
        assert_eq!(
            tables.lookup("t1", "row_id", "2", "amount"),
            Ok(Some("20".to_string()))
        );
        assert_eq!(tables.lookup("t1", "row_id", "3", "amount"), Ok(None));
        assert_eq!(tables.lookup("t1", "row_id", "1", "missing"), Ok(None));
    }
}
