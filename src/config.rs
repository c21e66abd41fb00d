pub const DEFAULT_PROMPT: &str = "~ #";
pub const DEFAULT_HISTORY_SIZE: usize = 1000;

/// Session settings for a [`Terminal`](crate::terminal::Terminal).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalConfig {
    /// Echoed in front of every command recorded in the transcript
    pub prompt: String,
    /// Number of commands kept in history; the oldest are dropped first
    pub history_size: usize,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            history_size: DEFAULT_HISTORY_SIZE,
        }
    }
}

impl TerminalConfig {
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_history_size(mut self, history_size: usize) -> Self {
        self.history_size = history_size;
        self
    }
}
