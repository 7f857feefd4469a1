use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of a dimension table, keyed by column title.
pub type TableRow = BTreeMap<String, String>;

/// The metadata part sent ahead of the CSV file when uploading a dimension table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSource {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A multi-dimension table that table-bound placeholders read their values from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionTable {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<TableRow>,
    /// MD5 of the CSV file the rows were imported from.
    #[serde(default)]
    pub content_md5: String,
}
