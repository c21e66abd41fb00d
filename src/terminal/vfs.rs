use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const BUILD_PROP: &str = "ro.build.display.id=stock";

// Factory-installed packages on internal storage, with their size labels
const SPARE_PARTS: [(&str, &str); 3] = [
    ("RiverOS_Performance_Mod_v2.1.zip", "1.2G"),
    ("Universal_GApps_Suite_lite.zip", "850M"),
    ("Helios_Custom_Kernel_r5-stable.zip", "24M"),
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VfsError {
    #[error("No such file or directory")]
    PathNotFound { segment: String },
    #[error("No such file or directory")]
    NotFound(String),
    #[error("File exists")]
    AlreadyExists(String),
    #[error("Not a directory")]
    NotADirectory(String),
    #[error("is a directory")]
    IsADirectory(String),
    #[error("Permission denied")]
    PermissionDenied,
    #[error("Invalid argument")]
    InvalidArgument,
    #[error("invalid name '{0}'")]
    InvalidName(String),
    #[error("malformed snapshot: {0}")]
    Snapshot(String),
}

/// A single element of the tree.
///
/// Serializes the way hosts exchange snapshots: directories become JSON
/// objects, files become `null` or their tag string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VfsNode {
    Directory(Directory),
    File(FileNode),
}

impl VfsNode {
    pub fn empty_directory() -> Self {
        Self::Directory(Directory::default())
    }

    pub fn file(tag: Option<String>) -> Self {
        Self::File(FileNode { tag })
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory(_))
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    pub fn as_directory(&self) -> Option<&Directory> {
        match self {
            Self::Directory(dir) => Some(dir),
            Self::File(_) => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileNode {
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Directory {
    children: BTreeMap<String, VfsNode>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&VfsNode> {
        self.children.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut VfsNode> {
        self.children.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.children.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Immediate child names in ordinal order, directories and files intermixed.
    pub fn child_names(&self) -> Vec<String> {
        // BTreeMap<String, _> iterates in byte order, which for UTF-8 is codepoint order
        self.children.keys().cloned().collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &VfsNode)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn attach(&mut self, name: &str, node: VfsNode) -> Result<(), VfsError> {
        validate_name(name)?;
        if self.children.contains_key(name) {
            return Err(VfsError::AlreadyExists(name.to_string()));
        }
        self.children.insert(name.to_string(), node);
        Ok(())
    }

    pub fn detach(&mut self, name: &str) -> Result<VfsNode, VfsError> {
        self.children
            .remove(name)
            .ok_or_else(|| VfsError::NotFound(name.to_string()))
    }

    // Names must be valid literals; they skip the checks `attach` performs
    fn from_literals<'a>(entries: impl IntoIterator<Item = (&'a str, VfsNode)>) -> Self {
        let children = entries
            .into_iter()
            .map(|(name, node)| (name.to_string(), node))
            .collect();
        Self { children }
    }

    fn validate(&self) -> Result<(), VfsError> {
        for (name, node) in &self.children {
            validate_name(name)?;
            if let VfsNode::Directory(dir) = node {
                dir.validate()?;
            }
        }
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), VfsError> {
    if name.is_empty() || name.contains('/') {
        return Err(VfsError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// A complete filesystem snapshot rooted at `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VirtualTree {
    root: Directory,
}

impl VirtualTree {
    pub fn new(root: Directory) -> Self {
        Self { root }
    }

    /// The layout a freshly booted recovery session starts with.
    pub fn recovery_layout() -> Self {
        let mut sdcard = vec![
            ("DCIM", VfsNode::empty_directory()),
            ("Download", VfsNode::empty_directory()),
        ];
        for (name, size) in SPARE_PARTS {
            sdcard.push((name, VfsNode::file(Some(size.to_string()))));
        }
        let data = [("media", VfsNode::empty_directory())];
        let system = [("build.prop", VfsNode::file(Some(BUILD_PROP.to_string())))];

        let root = Directory::from_literals([
            ("cache", VfsNode::empty_directory()),
            ("data", VfsNode::Directory(Directory::from_literals(data))),
            ("sdcard", VfsNode::Directory(Directory::from_literals(sdcard))),
            ("system", VfsNode::Directory(Directory::from_literals(system))),
            ("vendor", VfsNode::empty_directory()),
        ]);
        Self { root }
    }

    pub fn root(&self) -> &Directory {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Directory {
        &mut self.root
    }

    pub fn to_json(&self) -> Result<String, VfsError> {
        serde_json::to_string_pretty(self).map_err(|err| VfsError::Snapshot(err.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, VfsError> {
        let tree: Self =
            serde_json::from_str(json).map_err(|err| VfsError::Snapshot(err.to_string()))?;
        tree.root.validate()?;
        Ok(tree)
    }
}
