//! Formatting helpers and placeholder substitution.

use regex::Captures;
use std::collections::HashMap;
use thiserror::Error;

use crate::model::param::{AdditionalParams, SubmittedParam};
use crate::model::place_holder::PlaceholderRegistry;
use crate::template::parser::{TOKEN_RE, parse_token_details};

/// Source of cell values for table-bound placeholders.
pub trait TableLookup {
    /// Returns the `target_column` cell of the first row of `table_id` whose
    /// `column` cell equals `value`, or `None` when no row matches.
    fn lookup(
        &self,
        table_id: &str,
        column: &str,
        value: &str,
        target_column: &str,
    ) -> Result<Option<String>, String>;
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("table lookup for {key} failed: {message}")]
    Lookup { key: String, message: String },
}

/// Output of [`substitute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub content: String,
    /// Literal texts of placeholders left untouched, in first-seen order.
    pub unresolved: Vec<String>,
}

/// Re-serialises inner token contents with their braces.
pub fn join_tokens(tokens: &[String]) -> String {
    tokens.iter().map(|token| format!("{{{token}}}")).collect()
}

/// Rewrites legacy `{input.key}` and `{table.key.rowid}` placeholders to `{key}`.
pub fn normalize_legacy(text: &str) -> String {
    TOKEN_RE
        .replace_all(text, |caps: &Captures| match parse_token_details(&caps[0]) {
            Some(token) => format!("{{{}}}", token.key),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn resolve_value(
    token_text: &str,
    params: &AdditionalParams,
    registry: &PlaceholderRegistry,
    lookup: &dyn TableLookup,
) -> Result<Option<String>, RenderError> {
    let Some(token) = parse_token_details(token_text) else {
        return Ok(None);
    };
    let Some(raw) = params.get(&token.key) else {
        return Ok(None);
    };

    let param = SubmittedParam::from_value(raw);
    if let Some(text) = param.direct_text() {
        return Ok(Some(text));
    }

    let Some((column, value)) = param.condition() else {
        return Ok(None);
    };
    let binding = registry.find(&token.key).and_then(|def| {
        def.table_id
            .as_deref()
            .zip(def.table_column_key.as_deref())
    });
    let Some((table_id, target_column)) = binding else {
        return Ok(None);
    };

    lookup
        .lookup(table_id, column, value, target_column)
        .map_err(|message| RenderError::Lookup {
            key: token.key.clone(),
            message,
        })
}

/// Replaces every placeholder occurrence in `text` with its submitted value.
///
/// Scalars are substituted directly. Single-condition objects are looked up
/// in the table bound to the placeholder's definition. Placeholders without a
/// param, without a table binding, or without a matching row are left as they
/// are and reported in [`Rendered::unresolved`].
pub fn substitute(
    text: &str,
    params: &AdditionalParams,
    registry: &PlaceholderRegistry,
    lookup: &dyn TableLookup,
) -> Result<Rendered, RenderError> {
    let mut values: HashMap<String, Option<String>> = HashMap::new();
    let mut unresolved = Vec::new();

    for caps in TOKEN_RE.captures_iter(text) {
        let token_text = &caps[0];
        if values.contains_key(token_text) {
            continue;
        }
        let value = resolve_value(token_text, params, registry, lookup)?;
        if value.is_none() {
            unresolved.push(token_text.to_string());
        }
        values.insert(token_text.to_string(), value);
    }

    let content = TOKEN_RE
        .replace_all(text, |caps: &Captures| {
            values
                .get(&caps[0])
                .cloned()
                .flatten()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned();

    Ok(Rendered {
        content,
        unresolved,
    })
}
