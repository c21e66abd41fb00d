//! Tree mutations performed when a scripted recovery flow succeeds.
//!
//! The flows themselves (progress logs, simulated failures) live in the
//! presentation layer; once one reports success it hands the matching
//! [`Operation`] to [`Terminal::apply`](crate::terminal::Terminal::apply).

use tracing::{info, warn};

use crate::mounts::{FsType, MountTable};
use crate::terminal::fs::{resolve, VfsPath};
use crate::terminal::vfs::{VfsError, VirtualTree};

const SDCARD: &str = "/sdcard";
const SYSTEM: &str = "/system";
const TWRP: &str = "/sdcard/TWRP";
const BACKUPS: &str = "/sdcard/TWRP/BACKUPS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// A file fetched by the file manager lands on internal storage
    Download { file: String },
    /// Flash a package that is already on internal storage
    Install { package: String },
    /// Factory reset: data and cache
    Wipe,
    /// Advanced wipe of the selected partitions, by their display labels
    FormatPartitions { partitions: Vec<String> },
    Backup { partitions: Vec<String>, name: String },
    /// Mount or unmount one partition from the mount menu
    Mount { partition: String, mount: bool },
    /// Reformat a partition with another filesystem, emptying it
    ChangeFileSystem { partition: String, fs_type: FsType },
    Repair { partition: String },
}

impl Operation {
    pub fn describe(&self) -> String {
        match self {
            Self::Download { file } => format!("download {file}"),
            Self::Install { package } => format!("install {package}"),
            Self::Wipe => "factory reset".to_string(),
            Self::FormatPartitions { partitions } => {
                format!("format {}", partitions.join(", "))
            }
            Self::Backup { name, .. } => format!("backup {name}"),
            Self::Mount {
                partition,
                mount: true,
            } => format!("mount {partition}"),
            Self::Mount {
                partition,
                mount: false,
            } => format!("unmount {partition}"),
            Self::ChangeFileSystem { partition, fs_type } => {
                format!("change {partition} to {fs_type}")
            }
            Self::Repair { partition } => format!("repair {partition}"),
        }
    }

    /// Computes the snapshot and mount table after this operation. On `Err`
    /// the inputs are the ones to keep.
    pub fn apply(
        &self,
        tree: &VirtualTree,
        mounts: &MountTable,
    ) -> Result<(VirtualTree, MountTable), VfsError> {
        let mut next_mounts = mounts.clone();
        let next = match self {
            Self::Download { file } => {
                check_name(file)?;
                tree.create_file(&format!("{SDCARD}/{file}"), None)?
            }
            Self::Install { package } => install(tree, package)?,
            Self::Wipe => wipe(tree)?,
            Self::FormatPartitions { partitions } => {
                format_partitions(tree, mounts, partitions)?
            }
            Self::Backup { partitions, name } => backup(tree, partitions, name)?,
            Self::Mount { partition, mount } => {
                next_mounts.set_mounted(partition, *mount)?;
                tree.clone()
            }
            Self::ChangeFileSystem { partition, fs_type } => {
                next_mounts.set_fs_type(partition, *fs_type)?;
                match mount_path(partition) {
                    Some(path) => format_partition(tree.clone(), &path)?,
                    None => tree.clone(),
                }
            }
            Self::Repair { partition } => {
                if mounts.get(partition).is_none() {
                    return Err(VfsError::NotFound(partition.clone()));
                }
                tree.clone()
            }
        };
        info!("Operation '{}' applied", self.describe());
        Ok((next, next_mounts))
    }
}

/// `"Dalvik / ART Cache"` mounts at `/dalvik`, `"System"` at `/system`.
pub fn mount_path(label: &str) -> Option<String> {
    let first = label.split_whitespace().next()?;
    let name = first.to_lowercase().replace('/', "");
    (!name.is_empty()).then(|| format!("/{name}"))
}

fn check_name(name: &str) -> Result<(), VfsError> {
    if name.is_empty() || name.contains('/') {
        return Err(VfsError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// `Some(true)` for a directory, `Some(false)` for a file, `None` if absent.
fn probe(tree: &VirtualTree, path: &str) -> Option<bool> {
    let path = VfsPath::parse(path);
    let resolution = resolve(tree.root(), &path).ok()?;
    match resolution.directory() {
        Some(_) => Some(true),
        None if resolution.exists() => Some(false),
        None => None,
    }
}

fn ensure_directory(tree: VirtualTree, path: &str) -> Result<VirtualTree, VfsError> {
    match probe(&tree, path) {
        Some(true) => Ok(tree),
        Some(false) => Err(VfsError::NotADirectory(path.to_string())),
        None => tree.make_directory(path),
    }
}

fn install(tree: &VirtualTree, package: &str) -> Result<VirtualTree, VfsError> {
    check_name(package)?;
    if probe(tree, &format!("{SDCARD}/{package}")) != Some(false) {
        return Err(VfsError::NotFound(package.to_string()));
    }
    let next = match probe(tree, SYSTEM) {
        Some(true) => tree.reset_directory(SYSTEM)?,
        _ => tree.make_directory(SYSTEM)?,
    };
    next.create_file(
        &format!("{SYSTEM}/build.prop"),
        Some(format!("ro.build.display.id={package}")),
    )
}

/// Empties the directory a partition mounts at. Partitions with no directory
/// in the tree are left alone.
fn format_partition(tree: VirtualTree, path: &str) -> Result<VirtualTree, VfsError> {
    match tree.reset_directory(path) {
        Ok(formatted) => Ok(formatted),
        Err(VfsError::NotFound(_)) | Err(VfsError::PathNotFound { .. }) => {
            warn!("Partition {path} has no directory, skipping format");
            Ok(tree)
        }
        Err(err) => Err(err),
    }
}

// Factory reset mounts what it needs, so the mount table is not consulted
fn wipe(tree: &VirtualTree) -> Result<VirtualTree, VfsError> {
    let mut next = tree.clone();
    for path in ["/data", "/cache"] {
        next = format_partition(next, path)?;
    }
    if probe(&next, "/data") == Some(true) {
        next = next.make_directory("/data/media")?;
    }
    Ok(next)
}

fn format_partitions(
    tree: &VirtualTree,
    mounts: &MountTable,
    partitions: &[String],
) -> Result<VirtualTree, VfsError> {
    let mut next = tree.clone();
    for label in partitions {
        let Some(path) = mount_path(label) else {
            warn!("Skipping partition with empty label");
            continue;
        };
        if mounts.is_mounted(label) == Some(false) {
            warn!("Partition {path} is not mounted, skipping format");
            continue;
        }
        next = format_partition(next, &path)?;
    }
    Ok(next)
}

fn backup(tree: &VirtualTree, partitions: &[String], name: &str) -> Result<VirtualTree, VfsError> {
    check_name(name)?;
    let mut next = tree.clone();
    for dir in [TWRP, BACKUPS] {
        next = ensure_directory(next, dir)?;
    }
    let folder = format!("{BACKUPS}/{name}");
    next = next.make_directory(&folder)?;
    for label in partitions {
        let Some(path) = mount_path(label) else {
            continue;
        };
        let image = format!("{folder}/{}.ext4.win", path.trim_start_matches('/'));
        next = next.create_file(&image, Some(label.clone()))?;
    }
    Ok(next)
}
