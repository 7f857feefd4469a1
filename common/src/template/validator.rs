//! Validation of prompt text before it is saved or sent for debugging.
//!
//! Validation runs in two stages. The brace check rejects texts whose braces
//! cannot be read as a flat sequence of `{...}` placeholders. Only when it
//! passes is every placeholder checked for membership in the scene registry.
//! Failures are returned as a [`ValidationOutcome`], never as an error.

use thiserror::Error;

use crate::model::place_holder::PlaceholderRegistry;
use crate::requests::ValidationOutcome;
use crate::template::parser::{bare_key, parse_tokens};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BraceError {
    #[error("nested placeholders not allowed")]
    Nested,
    #[error("unmatched closing brace")]
    UnmatchedClosing,
    #[error("more closing than opening braces")]
    MoreClosingThanOpening,
    #[error("unclosed placeholder")]
    Unclosed,
}

/// Checks that braces form a flat, balanced sequence of placeholders.
pub fn check_braces(text: &str) -> Result<(), BraceError> {
    let mut inside = false;
    let mut depth: i64 = 0;

    for ch in text.chars() {
        match ch {
            '{' => {
                if inside {
                    return Err(BraceError::Nested);
                }
                inside = true;
                depth += 1;
            }
            '}' => {
                if !inside {
                    return Err(BraceError::UnmatchedClosing);
                }
                inside = false;
                depth -= 1;
                if depth < 0 {
                    return Err(BraceError::MoreClosingThanOpening);
                }
            }
            _ => {}
        }
    }

    if depth > 0 || inside {
        return Err(BraceError::Unclosed);
    }
    Ok(())
}

/// Literal texts (`{...}`) of the placeholders in `text` that the registry does
/// not know, in first-seen order.
pub fn unknown_placeholders(text: &str, registry: &PlaceholderRegistry) -> Vec<String> {
    parse_tokens(text)
        .into_iter()
        .filter(|inner| registry.find(&bare_key(inner)).is_none())
        .map(|inner| format!("{{{inner}}}"))
        .collect()
}

/// Validates `text` against the placeholder registry of its scene.
pub fn validate_text(text: &str, registry: &PlaceholderRegistry) -> ValidationOutcome {
    if let Err(err) = check_braces(text) {
        return ValidationOutcome::invalid(err.to_string());
    }

    let unknown = unknown_placeholders(text, registry);
    if unknown.is_empty() {
        ValidationOutcome::ok()
    } else {
        ValidationOutcome::invalid(format!(
            "placeholders {} are not configured for scene \"{}\"",
            unknown.join(", "),
            registry.scene_label()
        ))
    }
}
