use tracing::debug;

use super::command::{CommandRes, Executable};
use super::fs::{parse_flags, resolve, Resolution, VfsPath};
use super::vfs::{VfsNode, VirtualTree};

pub struct LsCommand;

impl LsCommand {
    fn listing(resolution: Resolution<'_>) -> Vec<String> {
        match resolution {
            Resolution::Entry {
                name,
                node: Some(VfsNode::File(_)),
                ..
            } => vec![name.to_string()],
            other => other
                .directory()
                .map(|dir| {
                    dir.entries()
                        .map(|(name, node)| {
                            if node.is_directory() {
                                format!("{name}/")
                            } else {
                                name.to_string()
                            }
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

impl Executable for LsCommand {
    fn execute(&self, tree: &VirtualTree, args: Vec<&str>) -> CommandRes {
        let target = args.first().copied().unwrap_or("/");
        let path = VfsPath::parse(target);
        match resolve(tree.root(), &path) {
            Ok(resolution) if resolution.exists() => {
                CommandRes::new().with_lines(Self::listing(resolution))
            }
            Ok(_) | Err(_) => {
                CommandRes::error(format!("ls: {target}: No such file or directory"))
            }
        }
    }
}

pub struct MkdirCommand;

impl Executable for MkdirCommand {
    fn execute(&self, tree: &VirtualTree, args: Vec<&str>) -> CommandRes {
        let Some(target) = args.first() else {
            return CommandRes::error("mkdir: missing operand");
        };
        match tree.make_directory(target) {
            Ok(next) => CommandRes::new().with_tree(next),
            Err(err) => {
                debug!("mkdir {target} refused: {err:?}");
                CommandRes::error(format!("mkdir: {target}: {err}"))
            }
        }
    }
}

pub struct RmCommand;

impl Executable for RmCommand {
    fn execute(&self, tree: &VirtualTree, args: Vec<&str>) -> CommandRes {
        let (flags, targets) = parse_flags(args, &["-r"]);
        let recursive = !flags.is_empty();
        if targets.is_empty() {
            return CommandRes::error("rm: missing operand");
        }

        // Operands are removed in order; one failure discards the whole batch
        let mut next: Option<VirtualTree> = None;
        let mut errors = Vec::new();
        for target in targets {
            match next.as_ref().unwrap_or(tree).remove(target, recursive) {
                Ok(removed) => next = Some(removed),
                Err(err) => {
                    debug!("rm {target} refused: {err:?}");
                    errors.push(format!("rm: {target}: {err}"));
                }
            }
        }

        match next {
            Some(next) if errors.is_empty() => CommandRes::new().with_tree(next),
            _ => CommandRes::new().with_error().with_lines(errors),
        }
    }
}
