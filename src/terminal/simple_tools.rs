use chrono::prelude::*;

use super::command::{CommandRes, Executable};
use super::vfs::VirtualTree;

const HELP_TEXT: [&str; 11] = [
    "Available commands:",
    "  help             - Show this help message",
    "  ls [path]        - List a directory (defaults to /)",
    "  mkdir <path>     - Create a directory",
    "  rm [-r] <path>   - Remove a file, or a directory with -r",
    "  mv <src> <dest>  - Move or rename a file or directory",
    "  date             - Display the current date and time",
    "  echo [text]      - Print text to the terminal",
    "  clear            - Clear the command output",
    "  reboot           - Reboot the system",
    "  exit             - Go back to the main menu",
];

pub struct HelpCommand;

impl Executable for HelpCommand {
    fn execute(&self, _tree: &VirtualTree, _args: Vec<&str>) -> CommandRes {
        CommandRes::new().with_lines(HELP_TEXT)
    }
}

pub struct ClearCommand;

impl Executable for ClearCommand {
    fn execute(&self, _tree: &VirtualTree, _args: Vec<&str>) -> CommandRes {
        CommandRes::Clear
    }
}

pub struct EchoCommand;

impl Executable for EchoCommand {
    fn execute(&self, _tree: &VirtualTree, args: Vec<&str>) -> CommandRes {
        CommandRes::new().with_line(args.join(" "))
    }
}

pub struct DateCommand {
    clock: fn() -> DateTime<Local>,
}

impl Default for DateCommand {
    fn default() -> Self {
        Self { clock: Local::now }
    }
}

impl DateCommand {
    #[cfg(test)]
    fn with_clock(clock: fn() -> DateTime<Local>) -> Self {
        Self { clock }
    }

    fn get_date(&self) -> String {
        // Wed Dec 25 14:30:15 +00:00 2024
        (self.clock)().format("%a %b %d %H:%M:%S %Z %Y").to_string()
    }
}

impl Executable for DateCommand {
    fn execute(&self, _tree: &VirtualTree, _args: Vec<&str>) -> CommandRes {
        CommandRes::new().with_line(self.get_date())
    }
}
