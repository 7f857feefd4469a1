//! Extraction of `{...}` placeholders from prompt text.
//!
//! Parsing is permissive: unbalanced or nested braces are simply not matched.
//! Whether the braces of a text are well formed is decided separately by
//! [`crate::template::validator::check_braces`].
//!
//! Besides the current `{key}` form, two legacy spellings are still understood
//! so that older prompts keep working:
//!
//! - `{input.key}`: an explicit user-input placeholder.
//! - `{table.key.rowid}`: a table placeholder carrying a row-id parameter key.
//!   The row id may itself contain dots.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::model::place_holder::{PlaceholderKind, PlaceholderToken};

const INPUT_PREFIX: &str = "input.";
const TABLE_PREFIX: &str = "table.";

/// Non-nested `{...}` spans with at least one character inside.
pub(crate) static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("placeholder pattern is valid"));

/// Returns the distinct inner contents of every `{...}` span in `text`, in
/// first-seen order.
///
/// A placeholder used several times is reported once.
pub fn parse_tokens(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    TOKEN_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|inner| inner.as_str())
        .filter(|inner| seen.insert(*inner))
        .map(str::to_string)
        .collect()
}

/// Parses a single `{...}` span into a token.
///
/// Returns `None` unless `token_text` is exactly one well formed span. The
/// kind is only a guess from the legacy prefix; the registry has the final
/// word (see [`crate::template::resolve::resolve_kind`]).
pub fn parse_token_details(token_text: &str) -> Option<PlaceholderToken> {
    let inner = token_text.strip_prefix('{')?.strip_suffix('}')?;
    if inner.is_empty() || inner.contains(['{', '}']) {
        return None;
    }

    let (key, kind, row_id_key) = if let Some(key) = inner.strip_prefix(INPUT_PREFIX) {
        (key.to_string(), PlaceholderKind::Input, None)
    } else if let Some(rest) = inner.strip_prefix(TABLE_PREFIX) {
        match rest.split_once('.') {
            Some((key, row_id)) => (
                key.to_string(),
                PlaceholderKind::Table,
                Some(row_id.to_string()),
            ),
            None => (rest.to_string(), PlaceholderKind::Table, None),
        }
    } else {
        (inner.to_string(), PlaceholderKind::Input, None)
    };

    Some(PlaceholderToken {
        original_text: token_text.to_string(),
        key,
        kind,
        row_id_key,
    })
}

/// Parses every distinct placeholder of `text` into a token.
pub fn parse_placeholders(text: &str) -> Vec<PlaceholderToken> {
    parse_tokens(text)
        .iter()
        .filter_map(|inner| parse_token_details(&format!("{{{inner}}}")))
        .collect()
}

/// Strips the legacy prefix from a token's inner content, giving the bare key.
pub fn bare_key(inner: &str) -> String {
    parse_token_details(&format!("{{{inner}}}"))
        .map(|token| token.key)
        .unwrap_or_else(|| inner.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_or_brace_free_text_has_no_tokens() {
        assert!(parse_tokens("").is_empty());
        assert!(parse_tokens("no placeholders here").is_empty());
        assert!(parse_tokens("empty {} braces").is_empty());
    }

    #[test]
    fn tokens_are_deduplicated_in_first_seen_order() {
        let tokens = parse_tokens("{b} and {a} then {b} again and {c}");
        assert_eq!(tokens, vec!["b", "a", "c"]);
    }

    #[test]
    fn nested_and_unbalanced_spans_are_skipped() {
        assert_eq!(parse_tokens("{outer {inner} tail}"), vec!["inner"]);
        assert_eq!(parse_tokens("open {never closed"), Vec::<String>::new());
        assert_eq!(parse_tokens("stray } then {ok}"), vec!["ok"]);
    }

    #[test]
    fn plain_token_defaults_to_input() {
        let token = parse_token_details("{customerName}").expect("token");
        assert_eq!(token.key, "customerName");
        assert_eq!(token.kind, PlaceholderKind::Input);
        assert_eq!(token.row_id_key, None);
        assert_eq!(token.original_text, "{customerName}");
    }

    #[test]
    fn legacy_input_prefix_is_stripped() {
        let token = parse_token_details("{input.city}").expect("token");
        assert_eq!(token.key, "city");
        assert_eq!(token.kind, PlaceholderKind::Input);
    }

    #[test]
    fn legacy_table_form_keeps_dotted_row_id() {
        let token = parse_token_details("{table.balance.row.id.v2}").expect("token");
        assert_eq!(token.key, "balance");
        assert_eq!(token.kind, PlaceholderKind::Table);
        assert_eq!(token.row_id_key.as_deref(), Some("row.id.v2"));

        let bare = parse_token_details("{table.balance}").expect("token");
        assert_eq!(bare.key, "balance");
        assert_eq!(bare.row_id_key, None);
    }

    #[test]
    fn malformed_single_spans_are_rejected() {
        assert_eq!(parse_token_details("name"), None);
        assert_eq!(parse_token_details("{}"), None);
        assert_eq!(parse_token_details("{a}{b}"), None);
        assert_eq!(parse_token_details("{a{b}"), None);
        assert_eq!(parse_token_details("x{a}"), None);
    }

    #[test]
    fn bare_key_unwraps_legacy_forms() {
        assert_eq!(bare_key("input.name"), "name");
        assert_eq!(bare_key("table.balance.row_id"), "balance");
        assert_eq!(bare_key("plain"), "plain");
    }
}
