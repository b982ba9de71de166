//! Command-line interface for Study Partner
//!
//! Provides argument parsing, subcommand handling and the REPL command
//! syntax used inside a running session.

use crate::config::Condition;
use clap::{Parser, Subcommand};

/// Terminal study partner backed by a hosted LLM
#[derive(Parser)]
#[command(name = "study-partner")]
#[command(version)]
#[command(about = "Terminal study partner backed by a hosted LLM")]
#[command(
    long_about = "Study Partner answers questions about your reading. In the planning \
    condition it detects when you start a new topic and asks what you want to get out of \
    the answer before generating it."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,

    /// Run condition (overrides session.condition from the config file)
    #[arg(long, value_enum)]
    pub condition: Option<Condition>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// A line typed into the chat prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Ordinary question for the tutor
    Prompt(String),
    Reset,
    Condition(Condition),
    /// Enter an API key for this session
    Key,
    Help,
    Quit,
    /// Slash command that could not be understood
    Unknown(String),
}

impl ReplCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        let Some(command) = trimmed.strip_prefix('/') else {
            return Self::Prompt(trimmed.to_string());
        };

        let mut parts = command.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("reset"), None) => Self::Reset,
            (Some("key"), None) => Self::Key,
            (Some("help"), None) => Self::Help,
            (Some("quit" | "exit"), None) => Self::Quit,
            (Some("condition"), Some(value)) => match value.parse::<Condition>() {
                Ok(condition) => Self::Condition(condition),
                Err(_) => Self::Unknown(trimmed.to_string()),
            },
            _ => Self::Unknown(trimmed.to_string()),
        }
    }
}

/// Help text for the REPL
pub const REPL_HELP: &str = "Commands:
  /reset                       clear the chat back to the greeting
  /condition <standard|planning>  switch the run condition
  /key                         enter an API key
  /help                        show this help
  /quit                        leave";

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# Study Partner Configuration
# ===========================
#
# Every section is optional; missing values use the defaults shown here.

# ─────────────────────────────────────────────────────────────────────────────
# COMPLETION PROVIDER
# ─────────────────────────────────────────────────────────────────────────────

[provider]
# OpenAI-compatible API root (the client appends /chat/completions)
base_url = "https://api.groq.com/openai/v1"

# Model used for both routing and answering
model = "llama-3.3-70b-versatile"

# API key lookup: this environment variable first, then the same key inside
# secrets_file, then an interactive prompt
api_key_env = "GROQ_API_KEY"
secrets_file = "secrets.toml"

# Timeout for non-streaming requests in seconds (1-300)
request_timeout_seconds = 60

# ─────────────────────────────────────────────────────────────────────────────
# TOPIC ROUTER
# ─────────────────────────────────────────────────────────────────────────────

[router]
# Number of most recent messages shown to the classifier (1-10)
context_window = 2

# Output cap and sampling for the one-word classification
max_tokens = 5
temperature = 0.0

# Give up and treat the message as a new topic after this many seconds
timeout_seconds = 10

# ─────────────────────────────────────────────────────────────────────────────
# SESSION
# ─────────────────────────────────────────────────────────────────────────────

[session]
# "standard": always answer directly
# "planning_intervention": new topics go through the clarification form
condition = "standard"

greeting = "Hi! I'm your AI Study Partner. Ask me anything about the reading."

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# Log level: "trace", "debug", "info", "warn", "error"
log_level = "info"
"#
}
