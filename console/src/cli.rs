//! Command line interface of `prompthub-console`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use common::model::place_holder::{PlaceholderKind, PlaceholderToken};
use common::template::ParamsPanel;

use crate::error::{ConsoleError, Result};
use crate::session::DebugMode;

#[derive(Debug, Parser)]
#[command(version, about = "Inspect, validate and debug PromptHub prompts")]
pub struct Cli {
    /// Base URL of the PromptHub backend.
    #[arg(
        long = "base-url",
        env = "PROMPTHUB_URL",
        default_value = "http://127.0.0.1:8080",
        global = true
    )]
    pub base_url: String,

    /// Interval between task status reads in api mode.
    #[arg(long = "poll-interval-ms", default_value_t = 1500, global = true)]
    pub poll_interval_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the placeholders of a text, resolved against the scene registry.
    Tokens(TextArgs),
    /// Validate a text against the scene registry.
    Validate(TextArgs),
    /// Substitute the placeholders of a text without sending it anywhere.
    Render(DebugArgs),
    /// Run a debug conversation turn in chat or api mode.
    Debug(DebugArgs),
}

#[derive(Debug, Args)]
pub struct TextArgs {
    /// Scene whose placeholder registry applies.
    #[arg(long)]
    pub scene: String,

    /// Prompt text given inline.
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,

    /// File holding the prompt text.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Check locally against the fetched registry instead of asking the server.
    #[arg(long, default_value_t = false)]
    pub local: bool,
}

impl TextArgs {
    pub fn read_text(&self) -> Result<String> {
        match (&self.text, &self.file) {
            (Some(text), _) => Ok(text.clone()),
            (None, Some(path)) => Ok(std::fs::read_to_string(path)?),
            (None, None) => Err(ConsoleError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "either --text or --file is required",
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    #[default]
    Chat,
    Api,
}

#[derive(Debug, Args)]
pub struct DebugArgs {
    #[command(flatten)]
    pub source: TextArgs,

    /// Input placeholder value as KEY=VALUE (repeatable).
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// Table placeholder condition as KEY=COLUMN:VALUE (repeatable).
    #[arg(long = "condition", value_name = "KEY=COLUMN:VALUE", value_parser = parse_condition)]
    pub conditions: Vec<(String, String, String)>,

    #[arg(long, value_enum, default_value_t = ModeArg::Chat)]
    pub mode: ModeArg,

    /// Deliver the api-mode result to this URL instead of polling.
    #[arg(long = "notify-url", value_name = "URL")]
    pub notify_url: Option<String>,

    /// Print the session as JSON.
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

impl DebugArgs {
    pub fn debug_mode(&self) -> DebugMode {
        match self.mode {
            ModeArg::Chat => DebugMode::Chat,
            ModeArg::Api => DebugMode::Api {
                notify_url: self.notify_url.clone(),
            },
        }
    }

    /// Writes the command line values into a panel synced from `tokens`.
    ///
    /// `--param` only targets input placeholders and `--condition` only table
    /// placeholders of the text; anything else is rejected so the submitted
    /// shape always matches the placeholder kind.
    pub fn apply_to(
        &self,
        tokens: &[PlaceholderToken],
        panel: &mut ParamsPanel,
    ) -> std::result::Result<(), String> {
        let kind_of = |key: &str| {
            tokens
                .iter()
                .find(|token| token.key == key)
                .map(|token| token.kind)
                .ok_or_else(|| format!("{{{}}} does not appear in the text", key))
        };

        for (key, value) in &self.params {
            if kind_of(key.as_str())? == PlaceholderKind::Table {
                return Err(format!(
                    "{{{}}} is a table placeholder, use --condition {}=COLUMN:VALUE",
                    key, key
                ));
            }
            panel.set_input_value(key, value);
        }
        for (key, column, value) in &self.conditions {
            if kind_of(key.as_str())? == PlaceholderKind::Input {
                return Err(format!(
                    "{{{}}} is an input placeholder, use --param {}=VALUE",
                    key, key
                ));
            }
            panel.select_condition_column(key, column);
            panel.set_condition_value(key, value);
        }
        Ok(())
    }
}

fn parse_param(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", raw))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in '{}'", raw));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

fn parse_condition(raw: &str) -> std::result::Result<(String, String, String), String> {
    let (key, rest) = parse_param(raw)?;
    let (column, value) = rest
        .split_once(':')
        .ok_or_else(|| format!("expected KEY=COLUMN:VALUE, got '{}'", raw))?;
    if column.trim().is_empty() {
        return Err(format!("empty column in '{}'", raw));
    }
    Ok((key, column.trim().to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::place_holder::{PlaceholderDefinition, PlaceholderRegistry};
    use common::model::scene::Scene;
    use common::template::resolve_tokens;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn debug_command_parses_params_and_conditions() {
        let cli = Cli::try_parse_from([
            "prompthub-console",
            "--poll-interval-ms",
            "200",
            "debug",
            "--scene",
            "billing",
            "--text",
            "Hello {name}",
            "--param",
            "name=Ada Lovelace",
            "--condition",
            "balance=row_id:8",
            "--mode",
            "api",
        ])
        .expect("parse");

        assert_eq!(cli.poll_interval(), Duration::from_millis(200));
        let Command::Debug(args) = cli.command else {
            panic!("expected debug command");
        };
        assert_eq!(
            args.params,
            vec![("name".to_string(), "Ada Lovelace".to_string())]
        );
        assert_eq!(
            args.conditions,
            vec![("balance".to_string(), "row_id".to_string(), "8".to_string())]
        );
        assert_eq!(args.debug_mode(), DebugMode::Api { notify_url: None });
    }

    #[test]
    fn malformed_assignments_are_rejected() {
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
        assert!(parse_condition("balance=8").is_err());
        assert!(parse_condition("balance=:8").is_err());
    }

    #[test]
    fn text_and_file_conflict() {
        let parsed = Cli::try_parse_from([
            "prompthub-console",
            "tokens",
            "--scene",
            "s",
            "--text",
            "x",
            "--file",
            "y",
        ]);
        assert!(parsed.is_err());
    }

    fn billing_panel(text: &str) -> (Vec<PlaceholderToken>, ParamsPanel) {
        let registry = PlaceholderRegistry::new(
            Scene::from_code("billing"),
            vec![
                PlaceholderDefinition::user_input("billing", "name"),
                PlaceholderDefinition {
                    table_row_id_param_key: Some("row_id".to_string()),
                    ..PlaceholderDefinition::table_bound("billing", "balance", "t1", "amount")
                },
            ],
        );
        let tokens = resolve_tokens(text, &registry);
        let mut panel = ParamsPanel::new();
        panel.sync(&tokens, &registry);
        (tokens, panel)
    }

    fn render_args(assignments: &[&str]) -> DebugArgs {
        let mut argv = vec![
            "prompthub-console",
            "render",
            "--scene",
            "billing",
            "--text",
            "t",
        ];
        argv.extend_from_slice(assignments);
        let cli = Cli::try_parse_from(argv).expect("parse");
        let Command::Render(args) = cli.command else {
            panic!("expected render command");
        };
        args
    }

    #[test]
    fn apply_to_switches_condition_columns() {
        let (tokens, mut panel) = billing_panel("Hi {name}, you owe {balance}");
        let args = render_args(&["--param", "name=Ada", "--condition", "balance=account:A-1"]);
        args.apply_to(&tokens, &mut panel).expect("apply");

        assert_eq!(
            serde_json::Value::Object(panel.submission_values()),
            json!({"name": "Ada", "balance": {"account": "A-1"}})
        );
    }

    #[test]
    fn condition_for_unknown_key_fails() {
        let (tokens, mut panel) = billing_panel("Hi {name}");
        let args = render_args(&["--condition", "ghost=c:1"]);
        assert_eq!(
            args.apply_to(&tokens, &mut panel),
            Err("{ghost} does not appear in the text".to_string())
        );
    }

    #[test]
    fn param_for_unknown_key_fails() {
        let (tokens, mut panel) = billing_panel("Hi {name}");
        let args = render_args(&["--param", "ghost=boo"]);
        assert_eq!(
            args.apply_to(&tokens, &mut panel),
            Err("{ghost} does not appear in the text".to_string())
        );
        assert_eq!(panel.get("ghost"), None);
    }

    #[test]
    fn param_on_table_placeholder_keeps_the_condition_shape() {
        let (tokens, mut panel) = billing_panel("bal {balance}");
        let args = render_args(&["--param", "balance=8"]);
        assert_eq!(
            args.apply_to(&tokens, &mut panel),
            Err("{balance} is a table placeholder, use --condition balance=COLUMN:VALUE".to_string())
        );
        assert_eq!(panel.get("balance"), Some(&json!({"row_id": ""})));
    }

    #[test]
    fn condition_on_input_placeholder_fails() {
        let (tokens, mut panel) = billing_panel("Hi {name}");
        let args = render_args(&["--condition", "name=row_id:8"]);
        assert_eq!(
            args.apply_to(&tokens, &mut panel),
            Err("{name} is an input placeholder, use --param name=VALUE".to_string())
        );
        assert_eq!(panel.get("name"), Some(&json!({"value": ""})));
    }
}
