use crate::model::place_holder::{PlaceholderKind, PlaceholderRegistry, PlaceholderToken};
use crate::template::parser::parse_placeholders;

/// Resolves the kind of `token` from the scene registry.
///
/// The registry is authoritative: a legacy `{table.x}` token whose definition
/// is `user_input` resolves to `Input`, and a plain `{x}` bound to a table
/// resolves to `Table`. Keys the registry does not know stay `Input`; they are
/// only rejected when the text is validated.
pub fn resolve_kind(token: &PlaceholderToken, registry: &PlaceholderRegistry) -> PlaceholderKind {
    registry
        .find(&token.key)
        .map(|def| def.kind())
        .unwrap_or(PlaceholderKind::Input)
}

/// Parses `text` and resolves the kind of every distinct placeholder.
pub fn resolve_tokens(text: &str, registry: &PlaceholderRegistry) -> Vec<PlaceholderToken> {
    parse_placeholders(text)
        .into_iter()
        .map(|mut token| {
            token.kind = resolve_kind(&token, registry);
            token
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::place_holder::PlaceholderDefinition;
    use crate::template::validator::validate_text;
    use pretty_assertions::assert_eq;

    fn balance_registry() -> PlaceholderRegistry {
        let mut reg = PlaceholderRegistry::empty("billing");
        reg.placeholders = vec![
            PlaceholderDefinition::user_input("billing", "name"),
            PlaceholderDefinition::table_bound("billing", "balance", "t1", "amount"),
        ];
        reg
    }

    #[test]
    fn greeting_with_table_balance_resolves_and_validates() {
        let text = "Hello {name}, your balance is {table.balance.row_id}";
        let reg = balance_registry();

        let tokens = resolve_tokens(text, &reg);
        let summary: Vec<(&str, PlaceholderKind)> =
            tokens.iter().map(|t| (t.key.as_str(), t.kind)).collect();
        assert_eq!(
            summary,
            vec![
                ("name", PlaceholderKind::Input),
                ("balance", PlaceholderKind::Table)
            ]
        );
        assert!(validate_text(text, &reg).valid);
    }

    #[test]
    fn registry_overrides_legacy_prefix() {
        let reg = balance_registry();
        let tokens = resolve_tokens("{table.name.1} {input.balance}", &reg);
        assert_eq!(tokens[0].kind, PlaceholderKind::Input);
        assert_eq!(tokens[1].kind, PlaceholderKind::Table);
    }

    #[test]
    fn unknown_keys_pass_through_as_input() {
        let reg = balance_registry();
        let tokens = resolve_tokens("{mystery}", &reg);
        assert_eq!(tokens[0].kind, PlaceholderKind::Input);
    }

    #[test]
    fn resolution_is_deterministic() {
        let reg = balance_registry();
        let first = resolve_tokens("{balance} {name}", &reg);
        let second = resolve_tokens("{balance} {name}", &reg);
        assert_eq!(first, second);
    }
}
