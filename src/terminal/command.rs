use super::vfs::VirtualTree;

pub trait Executable: Send + Sync {
    fn execute(&self, tree: &VirtualTree, args: Vec<&str>) -> CommandRes;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandRes {
    Output {
        is_err: bool,              // true if the command failed
        lines: Vec<String>,        // lines to display verbatim
        tree: Option<VirtualTree>, // replacement snapshot from a mutating command
    },
    /// Discard previously accumulated output. Carries no lines of its own.
    Clear,
}

impl Default for CommandRes {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRes {
    /// Create a new empty CommandRes with default values
    pub fn new() -> Self {
        Self::Output {
            is_err: false,
            lines: Vec::new(),
            tree: None,
        }
    }

    /// Shorthand for a failed command with a single message line
    pub fn error(line: impl Into<String>) -> Self {
        Self::new().with_error().with_line(line)
    }

    /// Mark this result as an error
    pub fn with_error(mut self) -> Self {
        if let Self::Output { is_err, .. } = &mut self {
            *is_err = true
        }
        self
    }

    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        if let Self::Output { lines, .. } = &mut self {
            lines.push(line.into());
        }
        self
    }

    pub fn with_lines<I, S>(mut self, new_lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Self::Output { lines, .. } = &mut self {
            lines.extend(new_lines.into_iter().map(Into::into));
        }
        self
    }

    /// Attach the snapshot that should replace the caller's tree
    pub fn with_tree(mut self, new_tree: VirtualTree) -> Self {
        if let Self::Output { tree, .. } = &mut self {
            *tree = Some(new_tree);
        }
        self
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Output { is_err: true, .. })
    }

    pub fn lines(&self) -> &[String] {
        match self {
            Self::Output { lines, .. } => lines,
            Self::Clear => &[],
        }
    }

    pub fn tree(&self) -> Option<&VirtualTree> {
        match self {
            Self::Output { tree, .. } => tree.as_ref(),
            Self::Clear => None,
        }
    }

    pub fn into_tree(self) -> Option<VirtualTree> {
        match self {
            Self::Output { tree, .. } => tree,
            Self::Clear => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cmd {
    Help,
    Ls,
    MkDir,
    Rm,
    Mv,
    Echo,
    Date,
    Clear,
    Reboot,
    Exit,
    Unknown,
}

impl From<&str> for Cmd {
    fn from(value: &str) -> Self {
        match value {
            "help" => Self::Help,
            "ls" => Self::Ls,
            "mkdir" => Self::MkDir,
            "rm" => Self::Rm,
            "mv" => Self::Mv,
            "echo" => Self::Echo,
            "date" => Self::Date,
            "clear" => Self::Clear,
            "reboot" => Self::Reboot,
            "exit" => Self::Exit,
            _ => Self::Unknown,
        }
    }
}

impl Cmd {
    pub fn all() -> Vec<&'static str> {
        vec![
            "help", "ls", "mkdir", "rm", "mv", "echo", "date", "clear", "reboot", "exit",
        ]
    }
}
