//! Study Partner terminal client
//!
//! Loads configuration, resolves the API key and runs the chat REPL.

use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use study_partner::{
    cli::{self, Cli, Command, ReplCommand},
    config::Config,
    conversation::{ConversationState, Role},
    credentials::{self, ApiKey},
    error::AppResult,
    provider::{CompletionProvider, OpenAiCompatClient},
    session::Tutor,
    surface::{ChatSurface, LineInput, LineSource, TerminalSurface},
    telemetry,
};
use tracing::Instrument;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::Config { output }) = cli.command {
        let template = cli::generate_config_template();
        match output {
            Some(path) => {
                std::fs::write(&path, template)?;
                eprintln!("Wrote configuration template to {}", path);
            }
            None => print!("{}", template),
        }
        return Ok(());
    }

    // A missing default config file is fine; an explicit path must exist
    let using_defaults = cli.config == DEFAULT_CONFIG_PATH && !Path::new(&cli.config).exists();
    let mut config = if using_defaults {
        Config::default()
    } else {
        Config::from_file(&cli.config)?
    };
    if let Some(condition) = cli.condition {
        config.session.condition = condition;
    }

    telemetry::init(&config.observability.log_level);
    if using_defaults {
        tracing::info!("No {} found, using default configuration", DEFAULT_CONFIG_PATH);
    }

    let mut input = LineInput::terminal()?;
    let mut surface = TerminalSurface::new();

    let credential = credentials::resolve(&config.provider, || {
        input
            .prompt_secret(&format!(
                "Enter API key ({} not set, leave blank to skip): ",
                config.provider.api_key_env()
            ))
            .ok()
            .flatten()
    });

    let provider = match credential {
        Some((key, source)) => {
            tracing::info!(source = ?source, "API key resolved");
            Some(build_provider(&config, key)?)
        }
        None => None,
    };

    let tutor = Tutor::new(&config, provider);
    let span = tracing::info_span!("session", session_id = %tutor.session_id());
    run_repl(tutor, &config, &mut input, &mut surface)
        .instrument(span)
        .await?;

    Ok(())
}

/// Read prompts and commands until `/quit` or end of input
async fn run_repl<S: LineSource>(
    mut tutor: Tutor,
    config: &Config,
    input: &mut LineInput<S>,
    surface: &mut TerminalSurface,
) -> AppResult<()> {
    let mut state = ConversationState::new(config.session.greeting.clone());

    tracing::info!(
        condition = tutor.condition().as_str(),
        model = %config.provider.model(),
        "Starting study session"
    );

    surface.render_notice(&format!(
        "condition: {} (type /help for commands)",
        tutor.condition().as_str()
    ));
    for message in state.messages() {
        surface.render_message(message.role, &message.content);
    }
    if !tutor.has_provider() {
        surface.render_notice("No API key configured. Type /key to enter one.");
    }

    loop {
        let prompt = if state.planning_active() {
            "plan> press Enter to fill in the form, or /reset: "
        } else {
            "you> "
        };
        let Some(line) = input.prompt_line(prompt)? else {
            break;
        };
        input.remember(&line);

        match ReplCommand::parse(&line) {
            ReplCommand::Quit => break,
            ReplCommand::Help => surface.render_notice(cli::REPL_HELP),
            ReplCommand::Reset => {
                state = tutor.reset(state);
                for message in state.messages() {
                    surface.render_message(message.role, &message.content);
                }
            }
            ReplCommand::Condition(condition) => {
                tutor.set_condition(condition);
                surface.render_notice(&format!("condition: {}", condition.as_str()));
            }
            ReplCommand::Key => {
                let entered = input.prompt_secret("Enter API key: ")?.and_then(ApiKey::new);
                match entered {
                    Some(key) => {
                        tutor.set_provider(build_provider(config, key)?);
                        surface.render_notice("Key loaded");
                    }
                    None => surface.render_error("No key entered"),
                }
            }
            ReplCommand::Unknown(command) => {
                surface.render_error(&format!("Unknown command '{}'. Type /help.", command));
            }
            ReplCommand::Prompt(_) if state.planning_active() => {
                let Some(plan) = input.collect_plan()? else {
                    break;
                };
                let (next, _outcome) = tutor.submit_plan(state, &plan, surface).await;
                state = next;
            }
            ReplCommand::Prompt(text) if text.is_empty() => {}
            ReplCommand::Prompt(text) => {
                let (next, _outcome) = tutor.submit_prompt(state, &text, surface).await;
                state = next;
            }
        }
    }

    tracing::info!(messages = state.messages().len(), "Study session ended");
    surface.render_message(Role::Assistant, "Goodbye!");

    Ok(())
}

fn build_provider(config: &Config, key: ApiKey) -> AppResult<Arc<dyn CompletionProvider>> {
    let client = OpenAiCompatClient::new(&config.provider, key)?;
    Ok(Arc::new(client))
}
