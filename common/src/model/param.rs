use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// The submitted `additional_params` of a debug or render request.
pub type AdditionalParams = serde_json::Map<String, Value>;

/// The typed view of one `additional_params` entry.
///
/// The wire shape stays `string | {column: string}`: input placeholders are
/// flattened to a scalar, table placeholders keep their single condition
/// object so the backend knows to do a table lookup instead of a direct
/// substitution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmittedParam {
    Direct(String),
    Lookup(BTreeMap<String, String>),
    Scalar(Value),
}

impl SubmittedParam {
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_else(|_| Self::Scalar(value.clone()))
    }

    /// The text a direct substitution would insert, if this is a direct value.
    pub fn direct_text(&self) -> Option<String> {
        match self {
            Self::Direct(text) => Some(text.clone()),
            Self::Scalar(Value::Number(n)) => Some(n.to_string()),
            Self::Scalar(Value::Bool(b)) => Some(b.to_string()),
            _ => None,
        }
    }

    /// The `(column, value)` condition of a table lookup. Only a single-entry
    /// object is a valid condition.
    pub fn condition(&self) -> Option<(&str, &str)> {
        match self {
            Self::Lookup(map) if map.len() == 1 => map
                .iter()
                .next()
                .map(|(column, value)| (column.as_str(), value.as_str())),
            _ => None,
        }
    }
}
