//! The editable parameter map behind the params panel.
//!
//! Each placeholder of the current text owns one entry in the working map:
//!
//! - input placeholders hold `{"value": "..."}`;
//! - table placeholders hold a single condition `{"<column>": "..."}`.
//!
//! On submission the map is flattened by [`extract_submission_values`]:
//! input entries become plain strings while table conditions stay objects.
//! The backend relies on that shape difference to pick direct substitution
//! or table lookup.

use serde_json::{Map, Value};

use crate::model::param::AdditionalParams;
use crate::model::place_holder::{PlaceholderKind, PlaceholderRegistry, PlaceholderToken};

const VALUE_FIELD: &str = "value";

/// Working map from placeholder key to its raw param object.
pub type ParamMap = Map<String, Value>;

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(obj) => obj.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn single_condition(obj: &Map<String, Value>) -> bool {
    obj.len() == 1 && !obj.contains_key(VALUE_FIELD)
}

/// Builds the param object for a placeholder of `kind`, reusing `current`
/// where its shape fits.
///
/// Input params keep any extra fields already on the object. Table params keep
/// an existing single condition, otherwise start on `default_column` (or with
/// no column selected when there is none).
pub fn build_param(
    kind: PlaceholderKind,
    current: Option<&Value>,
    default_column: Option<&str>,
) -> Value {
    match kind {
        PlaceholderKind::Input => match current {
            Some(Value::Object(obj)) => {
                let mut obj = obj.clone();
                obj.entry(VALUE_FIELD)
                    .or_insert_with(|| Value::String(String::new()));
                Value::Object(obj)
            }
            Some(Value::String(s)) => serde_json::json!({ VALUE_FIELD: s }),
            _ => serde_json::json!({ VALUE_FIELD: "" }),
        },
        PlaceholderKind::Table => match (current, default_column) {
            (Some(Value::Object(obj)), _) if single_condition(obj) => Value::Object(obj.clone()),
            (_, Some(column)) => serde_json::json!({ column: "" }),
            _ => Value::Object(Map::new()),
        },
    }
}

/// Flattens a working param map into the `additional_params` payload.
///
/// - an object with a `value` field emits that value, or nothing when it is empty;
/// - any other non-empty object (a table condition) is emitted as-is;
/// - a non-empty scalar is emitted as-is;
/// - empty and null entries are dropped.
pub fn extract_submission_values(params: &ParamMap) -> AdditionalParams {
    let mut out = AdditionalParams::new();
    for (key, value) in params {
        match value {
            Value::Object(obj) if obj.contains_key(VALUE_FIELD) => {
                let inner = &obj[VALUE_FIELD];
                if !is_blank(inner) {
                    out.insert(key.clone(), inner.clone());
                }
            }
            other if !is_blank(other) => {
                out.insert(key.clone(), other.clone());
            }
            _ => {}
        }
    }
    out
}

/// Param state for one open params panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamsPanel {
    params: ParamMap,
}

impl ParamsPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(params: ParamMap) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &ParamMap {
        &self.params
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Rebuilds the map for the placeholders currently in the text.
    ///
    /// Values of placeholders that are still present survive; entries of
    /// placeholders that disappeared from the text are dropped.
    pub fn sync(&mut self, tokens: &[PlaceholderToken], registry: &PlaceholderRegistry) {
        let mut next = ParamMap::new();
        for token in tokens {
            let default_column = registry
                .find(&token.key)
                .and_then(|def| def.table_row_id_param_key.as_deref())
                .or(token.row_id_key.as_deref());
            let param = build_param(token.kind, self.params.get(&token.key), default_column);
            next.insert(token.key.clone(), param);
        }
        self.params = next;
    }

    /// Sets the `value` of an input param, keeping the other fields of the object.
    pub fn set_input_value(&mut self, key: &str, value: &str) {
        let entry = self
            .params
            .entry(key)
            .or_insert_with(|| Value::Object(Map::new()));
        match entry {
            Value::Object(obj) => {
                obj.insert(VALUE_FIELD.to_string(), Value::String(value.to_string()));
            }
            other => *other = serde_json::json!({ VALUE_FIELD: value }),
        }
    }

    /// Makes `column` the active condition of a table param.
    ///
    /// The whole object is replaced: the previous column's value is discarded,
    /// not merged.
    pub fn select_condition_column(&mut self, key: &str, column: &str) {
        let existing = self
            .params
            .get(key)
            .and_then(|param| param.get(column))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        self.params
            .insert(key.to_string(), serde_json::json!({ column: existing }));
    }

    /// Writes `value` under the active condition column of a table param.
    ///
    /// Returns `false` when no column has been selected yet.
    pub fn set_condition_value(&mut self, key: &str, value: &str) -> bool {
        match self.params.get_mut(key) {
            Some(Value::Object(obj)) if single_condition(obj) => {
                if let Some(slot) = obj.values_mut().next() {
                    *slot = Value::String(value.to_string());
                }
                true
            }
            _ => false,
        }
    }

    /// The `(column, value)` of the active condition of a table param.
    pub fn active_condition(&self, key: &str) -> Option<(&str, &str)> {
        match self.params.get(key) {
            Some(Value::Object(obj)) if single_condition(obj) => obj
                .iter()
                .next()
                .map(|(column, value)| (column.as_str(), value.as_str().unwrap_or_default())),
            _ => None,
        }
    }

    pub fn submission_values(&self) -> AdditionalParams {
        extract_submission_values(&self.params)
    }
}
