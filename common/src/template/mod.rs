//! The placeholder templating mini-language.
//!
//! Prompt text carries `{key}` placeholders. A placeholder is either filled in
//! by the user (`input`) or read from a multi-dimension table (`table`); which
//! one is decided by the scene's [`PlaceholderRegistry`](crate::model::place_holder::PlaceholderRegistry).
//!
//! - [`parser`]: token extraction, including the legacy `input.` / `table.` forms.
//! - [`validator`]: brace balance and registry membership.
//! - [`resolve`]: token kind from the registry.
//! - [`params`]: the params panel working map and its submission shape.
//! - [`render`]: formatting helpers and substitution.

pub mod params;
pub mod parser;
pub mod render;
pub mod resolve;
pub mod validator;

pub use params::{ParamMap, ParamsPanel, build_param, extract_submission_values};
pub use parser::{parse_placeholders, parse_token_details, parse_tokens};
pub use render::{Rendered, RenderError, TableLookup, join_tokens, normalize_legacy, substitute};
pub use resolve::{resolve_kind, resolve_tokens};
pub use validator::{BraceError, check_braces, validate_text};
