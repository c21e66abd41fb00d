//! Partition mount state and filesystem types as the recovery reports them.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::terminal::vfs::VfsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsType {
    Ext4,
    F2fs,
    Btrfs,
    Vfat,
}

impl FromStr for FsType {
    type Err = VfsError;

    /// Accepts menu labels such as `"btrfs (exotic)"` by their first word.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_whitespace().next().unwrap_or_default() {
            "ext4" => Ok(Self::Ext4),
            "f2fs" => Ok(Self::F2fs),
            "btrfs" => Ok(Self::Btrfs),
            "vfat" => Ok(Self::Vfat),
            _ => Err(VfsError::InvalidArgument),
        }
    }
}

impl fmt::Display for FsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ext4 => "ext4",
            Self::F2fs => "f2fs",
            Self::Btrfs => "btrfs",
            Self::Vfat => "vfat",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub label: String,
    pub mounted: bool,
    pub fs_type: FsType,
}

impl Partition {
    fn new(label: &str, mounted: bool, fs_type: FsType) -> Self {
        Self {
            label: label.to_string(),
            mounted,
            fs_type,
        }
    }
}

/// Partitions the mount menu knows about, in menu order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountTable {
    partitions: Vec<Partition>,
}

impl Default for MountTable {
    /// System, Vendor and the SD card come up mounted; Data and Cache do not.
    fn default() -> Self {
        Self {
            partitions: vec![
                Partition::new("System", true, FsType::Ext4),
                Partition::new("Data", false, FsType::F2fs),
                Partition::new("Cache", false, FsType::Ext4),
                Partition::new("Vendor", true, FsType::Ext4),
                Partition::new("MicroSD Card", true, FsType::Vfat),
            ],
        }
    }
}

impl MountTable {
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    pub fn get(&self, label: &str) -> Option<&Partition> {
        self.partitions.iter().find(|p| p.label == label)
    }

    /// `None` for partitions the table does not track.
    pub fn is_mounted(&self, label: &str) -> Option<bool> {
        self.get(label).map(|p| p.mounted)
    }

    pub fn set_mounted(&mut self, label: &str, mounted: bool) -> Result<(), VfsError> {
        let partition = self.get_mut(label)?;
        if partition.mounted == mounted {
            debug!("{label} already in the requested mount state");
        }
        partition.mounted = mounted;
        Ok(())
    }

    pub fn set_fs_type(&mut self, label: &str, fs_type: FsType) -> Result<(), VfsError> {
        self.get_mut(label)?.fs_type = fs_type;
        Ok(())
    }

    fn get_mut(&mut self, label: &str) -> Result<&mut Partition, VfsError> {
        self.partitions
            .iter_mut()
            .find(|p| p.label == label)
            .ok_or_else(|| VfsError::NotFound(label.to_string()))
    }
}
