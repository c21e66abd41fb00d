use tracing::debug;

use super::command::{CommandRes, Executable};
use super::fs::MoveError;
use super::vfs::VirtualTree;

pub struct MvCommand;

impl Executable for MvCommand {
    fn execute(&self, tree: &VirtualTree, args: Vec<&str>) -> CommandRes {
        let [source, destination] = args[..] else {
            return match args.get(2) {
                Some(extra) => CommandRes::error(format!("mv: extra operand '{extra}'")),
                None => CommandRes::error("mv: missing destination file operand"),
            };
        };

        match tree.move_node(source, destination) {
            Ok(next) => CommandRes::new().with_tree(next),
            Err(err) => {
                debug!("mv {source} {destination} refused: {err:?}");
                let blamed = match err {
                    MoveError::Source(_) => source,
                    MoveError::Destination(_) => destination,
                };
                CommandRes::error(format!("mv: {blamed}: {err}"))
            }
        }
    }
}
