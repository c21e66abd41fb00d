use std::fmt;
use std::sync::Arc;

use tracing::info;

use super::command::{CommandRes, Executable};
use super::vfs::VirtualTree;

pub type Hook = Arc<dyn Fn() + Send + Sync>;

/// Notifications the hosting application receives from `reboot` and `exit`.
/// Fire-and-forget: nothing flows back into the interpreter.
#[derive(Clone)]
pub struct SessionHooks {
    on_reboot: Hook,
    on_session_exit: Hook,
}

impl SessionHooks {
    pub fn new(
        on_reboot: impl Fn() + Send + Sync + 'static,
        on_session_exit: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_reboot: Arc::new(on_reboot),
            on_session_exit: Arc::new(on_session_exit),
        }
    }

    /// Hooks that ignore both notifications
    pub fn noop() -> Self {
        Self::new(|| {}, || {})
    }

    pub fn reboot(&self) {
        (self.on_reboot)()
    }

    pub fn session_exit(&self) {
        (self.on_session_exit)()
    }
}

impl fmt::Debug for SessionHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHooks").finish_non_exhaustive()
    }
}

pub struct RebootCommand {
    hooks: SessionHooks,
}

impl RebootCommand {
    pub fn new(hooks: SessionHooks) -> Self {
        Self { hooks }
    }
}

impl Executable for RebootCommand {
    fn execute(&self, _tree: &VirtualTree, _args: Vec<&str>) -> CommandRes {
        info!("Reboot requested from the terminal");
        self.hooks.reboot();
        CommandRes::new().with_line("Rebooting system...")
    }
}

pub struct ExitCommand {
    hooks: SessionHooks,
}

impl ExitCommand {
    pub fn new(hooks: SessionHooks) -> Self {
        Self { hooks }
    }
}

impl Executable for ExitCommand {
    fn execute(&self, _tree: &VirtualTree, _args: Vec<&str>) -> CommandRes {
        info!("Session exit requested from the terminal");
        self.hooks.session_exit();
        CommandRes::new().with_line("Exiting terminal...")
    }
}

pub struct UnknownCommand {
    command_name: String,
}

impl UnknownCommand {
    pub fn new(command_name: String) -> Self {
        Self { command_name }
    }
}

impl Executable for UnknownCommand {
    fn execute(&self, _tree: &VirtualTree, _args: Vec<&str>) -> CommandRes {
        CommandRes::error(format!("sh: {}: command not found", self.command_name))
    }
}
