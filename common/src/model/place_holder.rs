use serde::{Deserialize, Serialize};

use crate::model::scene::Scene;

/// Where the value of a placeholder comes from, as configured in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceType {
    /// Typed directly by the user in the params panel.
    UserInput,
    /// Looked up in a bound multi-dimension table.
    MultiDimensionTable,
}

/// The effective kind of a placeholder token once it has been resolved
/// against the registry. Unresolved tokens are `Input`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderKind {
    #[default]
    Input,
    Table,
}

/// A registry entry describing how one placeholder key is resolved within a scene.
///
/// Table-bound definitions carry the table binding: `table_id` names the
/// dimension table, `table_column_key` the column whose cell replaces the
/// placeholder, and `table_row_id_param_key` the column offered by default as
/// the row condition in the params panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub key: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub scene: String,
    #[serde(default)]
    pub description: String,
    pub data_source_type: DataSourceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_column_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_row_id_param_key: Option<String>,
}

impl PlaceholderDefinition {
    /// A `user_input` definition with the label set to the key.
    pub fn user_input(scene: &str, key: &str) -> Self {
        Self {
            id: None,
            key: key.to_string(),
            label: key.to_string(),
            scene: scene.to_string(),
            description: String::new(),
            data_source_type: DataSourceType::UserInput,
            table_id: None,
            table_column_key: None,
            table_row_id_param_key: None,
        }
    }

    /// A `multi_dimension_table` definition bound to `table_id`, reading `column_key`.
    pub fn table_bound(scene: &str, key: &str, table_id: &str, column_key: &str) -> Self {
        Self {
            data_source_type: DataSourceType::MultiDimensionTable,
            table_id: Some(table_id.to_string()),
            table_column_key: Some(column_key.to_string()),
            ..Self::user_input(scene, key)
        }
    }

    pub fn kind(&self) -> PlaceholderKind {
        match self.data_source_type {
            DataSourceType::MultiDimensionTable => PlaceholderKind::Table,
            DataSourceType::UserInput => PlaceholderKind::Input,
        }
    }
}

/// One parsed `{...}` occurrence in prompt text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderToken {
    /// The literal text including braces, e.g. `{customerName}`.
    pub original_text: String,
    /// The identifier with any legacy `input.` / `table.` prefix removed.
    pub key: String,
    pub kind: PlaceholderKind,
    /// Only set by the legacy `{table.key.rowid}` form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_id_key: Option<String>,
}

/// The placeholder registry of one scene, as served by `GET /api/placeholders/{scene}`.
///
/// The console caches one of these per scene for the lifetime of a dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderRegistry {
    pub scene: Scene,
    #[serde(default)]
    pub placeholders: Vec<PlaceholderDefinition>,
}

impl PlaceholderRegistry {
    pub fn new(scene: Scene, placeholders: Vec<PlaceholderDefinition>) -> Self {
        Self {
            scene,
            placeholders,
        }
    }

    /// An empty registry for a scene that only exists as a code.
    pub fn empty(scene_code: &str) -> Self {
        Self::new(Scene::from_code(scene_code), Vec::new())
    }

    /// Finds the definition for `key`, matching on `key` first and `label` second.
    ///
    /// Label matches let content written against an older label keep resolving.
    pub fn find(&self, key: &str) -> Option<&PlaceholderDefinition> {
        self.placeholders
            .iter()
            .find(|def| def.key == key)
            .or_else(|| self.placeholders.iter().find(|def| def.label == key))
    }

    pub fn scene_label(&self) -> &str {
        if self.scene.label.is_empty() {
            &self.scene.code
        } else {
            &self.scene.label
        }
    }
}
