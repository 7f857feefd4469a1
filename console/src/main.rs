use std::process::ExitCode;

use clap::Parser;
use common::model::place_holder::PlaceholderKind;
use common::requests::{ValidateRequest, ValidationOutcome};
use env_logger::Env;
use prompthub_console::cli::{Cli, Command, DebugArgs, TextArgs};
use prompthub_console::session::{Role, SessionState};
use prompthub_console::{ApiClient, ConsoleError, DebugDialog};

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init_from_env(Env::default().default_filter_or("info"));
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, ConsoleError> {
    let client = ApiClient::new(&cli.base_url)?;
    log::debug!("using backend at {}", client.base_url());
    let poll_interval = cli.poll_interval();

    match cli.command {
        Command::Tokens(args) => {
            let dialog = open(client, &args).await?;
            for token in dialog.tokens() {
                let kind = match token.kind {
                    PlaceholderKind::Input => "input",
                    PlaceholderKind::Table => "table",
                };
                println!("{}\t{}\t{}", token.original_text, token.key, kind);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate(args) => {
            let outcome = if args.local {
                open(client, &args).await?.validate()
            } else {
                let text = args.read_text()?;
                client
                    .validate(&ValidateRequest {
                        scene: args.scene.clone(),
                        text,
                    })
                    .await?
            };
            Ok(report_validation(&outcome))
        }
        Command::Render(args) => {
            let dialog = prepared_dialog(client.clone(), &args).await?;
            let Some(dialog) = dialog else {
                return Ok(ExitCode::FAILURE);
            };
            let rendered = client.render(&dialog.request()).await?;
            println!("{}", rendered.content);
            if !rendered.unresolved.is_empty() {
                log::warn!("unresolved: {}", rendered.unresolved.join(", "));
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Debug(args) => {
            let Some(dialog) = prepared_dialog(client, &args).await? else {
                return Ok(ExitCode::FAILURE);
            };
            let mut dialog = dialog
                .with_mode(args.debug_mode())
                .with_poll_interval(poll_interval);
            dialog.send().await;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&dialog.session.messages)?);
            } else {
                for message in &dialog.session.messages {
                    let who = match message.role {
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    };
                    println!("[{}] {}", who, message.content);
                }
            }

            let code = match &dialog.session.state {
                SessionState::Completed => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
            dialog.close();
            Ok(code)
        }
    }
}

async fn open(client: ApiClient, args: &TextArgs) -> Result<DebugDialog, ConsoleError> {
    let text = args.read_text()?;
    DebugDialog::open(client, &args.scene, &text).await
}

/// Opens the dialog and fills the panel from the command line.
///
/// Returns `None` after reporting when the text is invalid or the arguments
/// do not fit it.
async fn prepared_dialog(
    client: ApiClient,
    args: &DebugArgs,
) -> Result<Option<DebugDialog>, ConsoleError> {
    let mut dialog = open(client, &args.source).await?;
    let outcome = dialog.validate();
    if !outcome.valid {
        report_validation(&outcome);
        return Ok(None);
    }
    let tokens = dialog.tokens().to_vec();
    if let Err(e) = args.apply_to(&tokens, &mut dialog.panel) {
        log::error!("{}", e);
        return Ok(None);
    }
    Ok(Some(dialog))
}

fn report_validation(outcome: &ValidationOutcome) -> ExitCode {
    match &outcome.error {
        None if outcome.valid => {
            println!("valid");
            ExitCode::SUCCESS
        }
        error => {
            println!("invalid: {}", error.as_deref().unwrap_or("unknown error"));
            ExitCode::FAILURE
        }
    }
}
