use clap::{Parser, ValueEnum};

use recovery_shell::config::{TerminalConfig, DEFAULT_HISTORY_SIZE, DEFAULT_PROMPT};

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Recovery-environment shell over an in-memory filesystem")]
pub struct Cli {
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,
    #[clap(long, default_value = DEFAULT_PROMPT)]
    pub prompt: String,
    #[clap(long, default_value_t = DEFAULT_HISTORY_SIZE)]
    pub history_size: usize,
    /// Print the final filesystem snapshot as JSON when the session ends
    #[clap(long)]
    pub dump: bool,
}

impl From<&Cli> for TerminalConfig {
    fn from(cli: &Cli) -> Self {
        TerminalConfig::default()
            .with_prompt(cli.prompt.clone())
            .with_history_size(cli.history_size)
    }
}

#[derive(Debug, Clone, ValueEnum, Default)]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warn,
    Error,
    Silent,
}

impl LogLevel {
    pub fn to_tracing_level(&self) -> Option<tracing::Level> {
        match self {
            LogLevel::Debug => Some(tracing::Level::DEBUG),
            LogLevel::Info => Some(tracing::Level::INFO),
            LogLevel::Warn => Some(tracing::Level::WARN),
            LogLevel::Error => Some(tracing::Level::ERROR),
            LogLevel::Silent => None,
        }
    }
}
