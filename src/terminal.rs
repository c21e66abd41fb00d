mod command;
pub mod fs;
mod fs_tools;
mod mv_tools;
mod simple_tools;
mod system_tools;
pub mod vfs;

pub use command::{Cmd, CommandRes, Executable};
pub use system_tools::SessionHooks;

use std::collections::{HashMap, VecDeque};

use tracing::{debug, info};

use crate::config::TerminalConfig;
use crate::mounts::MountTable;
use crate::operations::Operation;
use fs::{resolve, VfsPath};
use fs_tools::{LsCommand, MkdirCommand, RmCommand};
use mv_tools::MvCommand;
use simple_tools::{ClearCommand, DateCommand, EchoCommand, HelpCommand};
use system_tools::{ExitCommand, RebootCommand, UnknownCommand};
use vfs::{VfsError, VirtualTree};

/// Stateless dispatcher from a command line to its output and, for
/// mutating commands, the next snapshot.
pub struct Interpreter {
    commands: HashMap<Cmd, Box<dyn Executable>>,
}

impl Interpreter {
    pub fn new(hooks: SessionHooks) -> Self {
        let mut commands: HashMap<Cmd, Box<dyn Executable>> = HashMap::new();
        commands.insert(Cmd::Help, Box::new(HelpCommand));
        commands.insert(Cmd::Echo, Box::new(EchoCommand));
        commands.insert(Cmd::Date, Box::new(DateCommand::default()));
        commands.insert(Cmd::Clear, Box::new(ClearCommand));
        commands.insert(Cmd::Reboot, Box::new(RebootCommand::new(hooks.clone())));
        commands.insert(Cmd::Exit, Box::new(ExitCommand::new(hooks)));

        // Commands that read or replace the tree
        commands.insert(Cmd::Ls, Box::new(LsCommand));
        commands.insert(Cmd::MkDir, Box::new(MkdirCommand));
        commands.insert(Cmd::Rm, Box::new(RmCommand));
        commands.insert(Cmd::Mv, Box::new(MvCommand));

        Self { commands }
    }

    pub fn execute(&self, input: &str, tree: &VirtualTree) -> CommandRes {
        let mut parts = input.split_whitespace();
        let Some(cmd_text) = parts.next() else {
            return CommandRes::new();
        };
        let cmd = Cmd::from(cmd_text);
        debug!("Dispatching {cmd:?} for input '{}'", input.trim());

        match self.commands.get(&cmd) {
            Some(command) => command.execute(tree, parts.collect()),
            None => UnknownCommand::new(cmd_text.to_string()).execute(tree, parts.collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabCompletionItem {
    pub completion_text: String, // The text to insert when selected
    pub is_directory: bool,      // Whether this is a directory
}

/// One interactive session: the current snapshot plus what the user has seen
/// and typed so far.
pub struct Terminal {
    config: TerminalConfig,
    interpreter: Interpreter,
    tree: VirtualTree,
    mounts: MountTable,
    history: VecDeque<String>,
    transcript: Vec<String>,
}

impl Terminal {
    pub fn new(config: TerminalConfig, hooks: SessionHooks) -> Self {
        Self::with_tree(config, hooks, VirtualTree::recovery_layout())
    }

    pub fn with_tree(config: TerminalConfig, hooks: SessionHooks, tree: VirtualTree) -> Self {
        Self {
            config,
            interpreter: Interpreter::new(hooks),
            tree,
            mounts: MountTable::default(),
            history: VecDeque::new(),
            transcript: Vec::new(),
        }
    }

    pub fn config(&self) -> &TerminalConfig {
        &self.config
    }

    pub fn tree(&self) -> &VirtualTree {
        &self.tree
    }

    pub fn mounts(&self) -> &MountTable {
        &self.mounts
    }

    pub fn history(&self) -> &VecDeque<String> {
        &self.history
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Runs one command line against the session. A replacement snapshot is
    /// moved into the session, so the returned result only carries lines.
    pub fn handle_command(&mut self, input: &str) -> CommandRes {
        if input.trim().is_empty() {
            return CommandRes::new();
        }
        self.history.push_back(input.to_string());
        while self.history.len() > self.config.history_size {
            self.history.pop_front();
        }

        let mut res = self.interpreter.execute(input, &self.tree);
        if matches!(res, CommandRes::Clear) {
            self.transcript.clear();
        }
        self.transcript.push(format!("{} {input}", self.config.prompt));
        if let CommandRes::Output { lines, tree, .. } = &mut res {
            self.transcript.extend(lines.iter().cloned());
            if let Some(next) = tree.take() {
                info!("Swapping in snapshot produced by '{}'", input.trim());
                self.tree = next;
            }
        }
        res
    }

    /// Applies a completed recovery operation. The snapshot and mount table
    /// are only replaced when the whole operation succeeds.
    pub fn apply(&mut self, operation: &Operation) -> Result<(), VfsError> {
        let (tree, mounts) = operation.apply(&self.tree, &self.mounts)?;
        self.tree = tree;
        self.mounts = mounts;
        Ok(())
    }

    pub fn complete(&self, input: &str) -> Vec<TabCompletionItem> {
        let mut parts = input.split_whitespace();
        let Some(cmd_text) = parts.next() else {
            return Vec::new();
        };
        let parts = parts.collect::<Vec<_>>();

        if parts.is_empty() && !input.ends_with(' ') {
            let mut commands = Cmd::all()
                .into_iter()
                .filter(|s| s.starts_with(cmd_text))
                .map(|s| TabCompletionItem {
                    completion_text: s.to_string(),
                    is_directory: false,
                })
                .collect::<Vec<_>>();
            commands.sort_by(|a, b| a.completion_text.cmp(&b.completion_text));
            return commands;
        }

        let target = if input.ends_with(' ') {
            ""
        } else {
            parts.last().copied().unwrap_or_default()
        };
        self.complete_path(target)
    }

    fn complete_path(&self, target: &str) -> Vec<TabCompletionItem> {
        let (dir_path, prefix) = match target.rfind('/') {
            Some(pos) => (&target[..=pos], &target[pos + 1..]),
            None => ("/", target),
        };
        let dir_path = VfsPath::parse(dir_path);
        let Some(dir) = resolve(self.tree.root(), &dir_path)
            .ok()
            .and_then(|r| r.directory())
        else {
            return Vec::new();
        };

        dir.entries()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, node)| {
                let is_directory = node.is_directory();
                TabCompletionItem {
                    completion_text: if is_directory {
                        format!("{name}/")
                    } else {
                        name.to_string()
                    },
                    is_directory,
                }
            })
            .collect()
    }
}
