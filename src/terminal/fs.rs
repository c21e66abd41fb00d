use std::fmt;

use thiserror::Error;
use tracing::debug;

use super::vfs::{Directory, VfsError, VfsNode, VirtualTree};

/// Splits arguments into exact-match flags and positional targets.
pub fn parse_flags<'a>(args: Vec<&'a str>, known: &[&str]) -> (Vec<&'a str>, Vec<&'a str>) {
    args.into_iter()
        .partition(|arg| known.iter().any(|flag| flag == arg))
}

/// An absolute path, stored as its non-empty segments.
///
/// Every path is treated as absolute and `.`/`..` are ordinary names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VfsPath {
    segments: Vec<String>,
}

impl VfsPath {
    pub fn parse(raw: &str) -> Self {
        let segments = raw
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self { segments }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn parent_segments(&self) -> &[String] {
        match self.segments.split_last() {
            Some((_, parent)) => parent,
            None => &[],
        }
    }

    pub fn join(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    pub fn starts_with(&self, prefix: &VfsPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

impl From<&str> for VfsPath {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl fmt::Display for VfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

/// Where a path landed in a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The path named `/` itself: no parent, always present.
    Root(&'a Directory),
    /// Any other path. `node` is `None` when the final segment is free.
    Entry {
        parent: &'a Directory,
        name: &'a str,
        node: Option<&'a VfsNode>,
    },
}

impl<'a> Resolution<'a> {
    pub fn exists(&self) -> bool {
        match self {
            Self::Root(_) => true,
            Self::Entry { node, .. } => node.is_some(),
        }
    }

    pub fn parent(&self) -> Option<&'a Directory> {
        match self {
            Self::Root(_) => None,
            Self::Entry { parent, .. } => Some(parent),
        }
    }

    pub fn name(&self) -> Option<&'a str> {
        match self {
            Self::Root(_) => None,
            Self::Entry { name, .. } => Some(name),
        }
    }

    /// The located directory, if the path names one.
    pub fn directory(&self) -> Option<&'a Directory> {
        match self {
            Self::Root(root) => Some(root),
            Self::Entry { node, .. } => node.and_then(VfsNode::as_directory),
        }
    }
}

pub fn resolve<'a>(root: &'a Directory, path: &'a VfsPath) -> Result<Resolution<'a>, VfsError> {
    let Some((name, ancestors)) = path.segments.split_last() else {
        return Ok(Resolution::Root(root));
    };
    let mut current = root;
    for segment in ancestors {
        current = match current.get(segment) {
            Some(VfsNode::Directory(dir)) => dir,
            _ => {
                debug!("Resolution of {path} stopped at '{segment}'");
                return Err(VfsError::PathNotFound {
                    segment: segment.clone(),
                });
            }
        };
    }
    Ok(Resolution::Entry {
        parent: current,
        name,
        node: current.get(name),
    })
}

/// Walks to the directory named by `segments`, for mutating a cloned snapshot.
pub fn directory_mut<'a>(
    root: &'a mut Directory,
    segments: &[String],
) -> Result<&'a mut Directory, VfsError> {
    let mut current = root;
    for segment in segments {
        current = match current.get_mut(segment) {
            Some(VfsNode::Directory(dir)) => dir,
            _ => {
                return Err(VfsError::PathNotFound {
                    segment: segment.clone(),
                })
            }
        };
    }
    Ok(current)
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("{0}")]
    Source(VfsError),
    #[error("{0}")]
    Destination(VfsError),
}

// Path-aware mutations. Each one validates against `self` and only then
// clones, so an `Err` means the caller's snapshot is the one to keep.
impl VirtualTree {
    pub fn make_directory(&self, path: &str) -> Result<VirtualTree, VfsError> {
        self.create(&VfsPath::parse(path), VfsNode::empty_directory())
    }

    pub fn create_file(&self, path: &str, tag: Option<String>) -> Result<VirtualTree, VfsError> {
        self.create(&VfsPath::parse(path), VfsNode::file(tag))
    }

    fn create(&self, path: &VfsPath, node: VfsNode) -> Result<VirtualTree, VfsError> {
        let name = match resolve(self.root(), path)? {
            Resolution::Root(_) => return Err(VfsError::AlreadyExists("/".to_string())),
            Resolution::Entry {
                name,
                node: Some(_),
                ..
            } => return Err(VfsError::AlreadyExists(name.to_string())),
            Resolution::Entry { name, node: None, .. } => name,
        };

        let mut next = self.clone();
        directory_mut(next.root_mut(), path.parent_segments())?.attach(name, node)?;
        Ok(next)
    }

    pub fn remove(&self, path: &str, recursive: bool) -> Result<VirtualTree, VfsError> {
        let path = VfsPath::parse(path);
        let name = match resolve(self.root(), &path)? {
            Resolution::Root(_) => return Err(VfsError::PermissionDenied),
            Resolution::Entry { name, node: None, .. } => {
                return Err(VfsError::NotFound(name.to_string()))
            }
            Resolution::Entry {
                name,
                node: Some(VfsNode::Directory(_)),
                ..
            } if !recursive => return Err(VfsError::IsADirectory(name.to_string())),
            Resolution::Entry { name, .. } => name,
        };

        let mut next = self.clone();
        directory_mut(next.root_mut(), path.parent_segments())?.detach(name)?;
        Ok(next)
    }

    /// Moves `src` to `dest`, or into `dest` when it is an existing directory.
    /// Never overwrites: an occupied destination slot is an error.
    pub fn move_node(&self, src: &str, dest: &str) -> Result<VirtualTree, MoveError> {
        let src_path = VfsPath::parse(src);
        let dest_path = VfsPath::parse(dest);

        let src_name = match resolve(self.root(), &src_path).map_err(MoveError::Source)? {
            Resolution::Root(_) => return Err(MoveError::Source(VfsError::PermissionDenied)),
            Resolution::Entry { name, node: None, .. } => {
                return Err(MoveError::Source(VfsError::NotFound(name.to_string())))
            }
            Resolution::Entry { name, .. } => name,
        };

        let dest_resolution = resolve(self.root(), &dest_path).map_err(MoveError::Destination)?;
        let target = if let Some(dir) = dest_resolution.directory() {
            if dir.contains(src_name) {
                return Err(MoveError::Destination(VfsError::AlreadyExists(
                    src_name.to_string(),
                )));
            }
            dest_path.join(src_name)
        } else if dest_resolution.exists() {
            let name = dest_resolution.name().unwrap_or_default();
            return Err(MoveError::Destination(VfsError::AlreadyExists(
                name.to_string(),
            )));
        } else {
            dest_path.clone()
        };

        if target.starts_with(&src_path) {
            return Err(MoveError::Destination(VfsError::InvalidArgument));
        }
        let Some(target_name) = target.file_name() else {
            return Err(MoveError::Destination(VfsError::InvalidArgument));
        };

        let mut next = self.clone();
        let node = directory_mut(next.root_mut(), src_path.parent_segments())
            .and_then(|parent| parent.detach(src_name))
            .map_err(MoveError::Source)?;
        directory_mut(next.root_mut(), target.parent_segments())
            .and_then(|parent| parent.attach(target_name, node))
            .map_err(MoveError::Destination)?;
        Ok(next)
    }

    /// Empties an existing directory, keeping the directory itself.
    pub fn reset_directory(&self, path: &str) -> Result<VirtualTree, VfsError> {
        let path = VfsPath::parse(path);
        let name = match resolve(self.root(), &path)? {
            Resolution::Root(_) => return Err(VfsError::PermissionDenied),
            Resolution::Entry { name, node: None, .. } => {
                return Err(VfsError::NotFound(name.to_string()))
            }
            Resolution::Entry {
                name,
                node: Some(VfsNode::File(_)),
                ..
            } => return Err(VfsError::NotADirectory(name.to_string())),
            Resolution::Entry { name, .. } => name,
        };

        let mut next = self.clone();
        let parent = directory_mut(next.root_mut(), path.parent_segments())?;
        parent.detach(name)?;
        parent.attach(name, VfsNode::empty_directory())?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // { "sdcard": { "Download": {}, "boot.img": <file> } }
    fn sample_tree() -> VirtualTree {
        let mut sdcard = Directory::new();
        sdcard.attach("Download", VfsNode::empty_directory()).unwrap();
        sdcard.attach("boot.img", VfsNode::file(None)).unwrap();
        let mut root = Directory::new();
        root.attach("sdcard", VfsNode::Directory(sdcard)).unwrap();
        VirtualTree::new(root)
    }

    fn lookup<'a>(tree: &'a VirtualTree, segments: &[&str]) -> Option<&'a VfsNode> {
        let (last, parents) = segments.split_last()?;
        let mut dir = tree.root();
        for segment in parents {
            dir = dir.get(segment)?.as_directory()?;
        }
        dir.get(last)
    }

    #[test]
    fn test_parse_path() {
        assert!(VfsPath::parse("/").is_root());
        assert!(VfsPath::parse("").is_root());
        assert!(VfsPath::parse("///").is_root());
        assert_eq!(
            VfsPath::parse("//sdcard///Download/").segments(),
            &["sdcard".to_string(), "Download".to_string()]
        );
        // Leading slash is implied
        assert_eq!(VfsPath::parse("sdcard"), VfsPath::parse("/sdcard"));
        assert_eq!(VfsPath::parse("sdcard/DCIM/").to_string(), "/sdcard/DCIM");
        assert_eq!(VfsPath::parse("/").to_string(), "/");
    }

    #[test]
    fn test_parse_flags() {
        let (flags, targets) = parse_flags(vec!["-r", "/sdcard", "-rf"], &["-r"]);
        assert_eq!(flags, vec!["-r"]);
        assert_eq!(targets, vec!["/sdcard", "-rf"]);
    }

    #[test]
    fn test_resolve_root() {
        let tree = sample_tree();
        for raw in ["/", "", "////"] {
            let path = VfsPath::parse(raw);
            let resolution = resolve(tree.root(), &path).unwrap();
            assert!(matches!(resolution, Resolution::Root(_)));
            assert!(resolution.exists());
            assert!(resolution.parent().is_none());
            assert!(resolution.name().is_none());
        }
    }

    #[test]
    fn test_resolve_existing_matches_lookup() {
        let tree = sample_tree();
        for segments in [
            vec!["sdcard"],
            vec!["sdcard", "Download"],
            vec!["sdcard", "boot.img"],
        ] {
            let path = VfsPath::parse(&segments.join("/"));
            let resolution = resolve(tree.root(), &path).unwrap();
            assert!(resolution.exists());
            match resolution {
                Resolution::Entry { node, name, .. } => {
                    assert_eq!(node, lookup(&tree, &segments));
                    assert_eq!(Some(name), segments.last().copied());
                }
                Resolution::Root(_) => panic!("expected an entry"),
            }
        }
    }

    #[test]
    fn test_resolve_missing_final_segment() {
        let tree = sample_tree();
        let path = VfsPath::parse("/sdcard/NewFolder");
        let resolution = resolve(tree.root(), &path).unwrap();
        assert!(!resolution.exists());
        assert_eq!(resolution.name(), Some("NewFolder"));
        assert!(resolution.parent().is_some_and(|p| p.contains("boot.img")));
    }

    #[test]
    fn test_resolve_missing_intermediate() {
        let tree = sample_tree();
        let path = VfsPath::parse("/nonexistent/boot.img");
        assert_eq!(
            resolve(tree.root(), &path),
            Err(VfsError::PathNotFound {
                segment: "nonexistent".into()
            })
        );
    }

    #[test]
    fn test_resolve_through_file() {
        let tree = sample_tree();
        let path = VfsPath::parse("/sdcard/boot.img/inner");
        assert_eq!(
            resolve(tree.root(), &path),
            Err(VfsError::PathNotFound {
                segment: "boot.img".into()
            })
        );
    }

    #[test]
    fn test_dot_segments_are_literal() {
        let tree = sample_tree();
        let path = VfsPath::parse("/sdcard/../sdcard");
        assert_eq!(
            resolve(tree.root(), &path),
            Err(VfsError::PathNotFound {
                segment: "..".into()
            })
        );
        let path = VfsPath::parse("/sdcard/.");
        assert!(!resolve(tree.root(), &path).unwrap().exists());
    }

    #[test]
    fn test_resolve_is_case_sensitive() {
        let tree = sample_tree();
        let path = VfsPath::parse("/sdcard/download");
        assert!(!resolve(tree.root(), &path).unwrap().exists());
    }

    #[test]
    fn test_make_directory_then_remove_round_trips() {
        let tree = sample_tree();
        let with_dir = tree.make_directory("/sdcard/NewFolder").unwrap();
        assert!(lookup(&with_dir, &["sdcard", "NewFolder"]).is_some_and(VfsNode::is_directory));
        assert!(lookup(&tree, &["sdcard", "NewFolder"]).is_none());

        assert_eq!(
            with_dir.remove("/sdcard/NewFolder", false),
            Err(VfsError::IsADirectory("NewFolder".into()))
        );
        let back = with_dir.remove("/sdcard/NewFolder", true).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn test_make_directory_failures() {
        let tree = sample_tree();
        assert_eq!(
            tree.make_directory("/sdcard/Download"),
            Err(VfsError::AlreadyExists("Download".into()))
        );
        assert_eq!(
            tree.make_directory("/"),
            Err(VfsError::AlreadyExists("/".into()))
        );
        // No "mkdir -p"
        assert!(matches!(
            tree.make_directory("/a/b"),
            Err(VfsError::PathNotFound { .. })
        ));
    }

    #[test]
    fn test_create_file() {
        let tree = sample_tree();
        let next = tree.create_file("/sdcard/Download/rom.zip", Some("1G".into())).unwrap();
        assert_eq!(
            lookup(&next, &["sdcard", "Download", "rom.zip"]),
            Some(&VfsNode::file(Some("1G".into())))
        );
    }

    #[test]
    fn test_remove_failures() {
        let tree = sample_tree();
        assert_eq!(tree.remove("/", true), Err(VfsError::PermissionDenied));
        assert_eq!(
            tree.remove("/sdcard/missing", false),
            Err(VfsError::NotFound("missing".into()))
        );
        assert_eq!(
            tree.remove("/sdcard/Download", false),
            Err(VfsError::IsADirectory("Download".into()))
        );
        let next = tree.remove("/sdcard/Download", true).unwrap();
        assert!(lookup(&next, &["sdcard", "Download"]).is_none());
        let next = tree.remove("/sdcard/boot.img", false).unwrap();
        assert!(lookup(&next, &["sdcard", "boot.img"]).is_none());
    }

    #[test]
    fn test_move_file_into_directory() {
        let tree = sample_tree();
        let next = tree
            .move_node("/sdcard/boot.img", "/sdcard/Download/boot.img")
            .unwrap();
        assert!(lookup(&next, &["sdcard", "Download", "boot.img"]).is_some_and(VfsNode::is_file));
        assert!(lookup(&next, &["sdcard", "boot.img"]).is_none());

        // Same result when the destination is the directory itself
        let same = tree.move_node("/sdcard/boot.img", "/sdcard/Download").unwrap();
        assert_eq!(same, next);
    }

    #[test]
    fn test_move_directory_preserves_subtree() {
        let tree = sample_tree()
            .make_directory("/sdcard/Download/nested")
            .and_then(|t| t.create_file("/sdcard/Download/nested/a.zip", Some("tag".into())))
            .and_then(|t| t.make_directory("/backup"))
            .unwrap();
        let before = lookup(&tree, &["sdcard", "Download"]).cloned();

        let renamed = tree.move_node("/sdcard/Download", "/sdcard/Downloads").unwrap();
        assert_eq!(lookup(&renamed, &["sdcard", "Downloads"]).cloned(), before);
        assert!(lookup(&renamed, &["sdcard", "Download"]).is_none());

        let into = tree.move_node("/sdcard/Download", "/backup").unwrap();
        assert_eq!(lookup(&into, &["backup", "Download"]).cloned(), before);
        assert!(lookup(&into, &["sdcard", "Download"]).is_none());

        let to_root = tree.move_node("/sdcard/Download", "/").unwrap();
        assert_eq!(lookup(&to_root, &["Download"]).cloned(), before);
    }

    #[test]
    fn test_move_failures_leave_tree_alone() {
        let tree = sample_tree().make_directory("/sdcard/Download/boot.img").unwrap();
        let copy = tree.clone();
        assert_eq!(
            tree.move_node("/sdcard/missing", "/sdcard/Download"),
            Err(MoveError::Source(VfsError::NotFound("missing".into())))
        );
        assert_eq!(
            tree.move_node("/", "/sdcard"),
            Err(MoveError::Source(VfsError::PermissionDenied))
        );
        // Base name already present inside the destination directory
        assert_eq!(
            tree.move_node("/sdcard/boot.img", "/sdcard/Download"),
            Err(MoveError::Destination(VfsError::AlreadyExists(
                "boot.img".into()
            )))
        );
        assert!(matches!(
            tree.move_node("/sdcard/boot.img", "/nonexistent/boot.img"),
            Err(MoveError::Destination(VfsError::PathNotFound { .. }))
        ));
        assert_eq!(
            tree.move_node("/sdcard", "/sdcard/Download/inner"),
            Err(MoveError::Destination(VfsError::InvalidArgument))
        );
        assert_eq!(
            tree.move_node("/sdcard/Download", "/sdcard/Download"),
            Err(MoveError::Destination(VfsError::InvalidArgument))
        );
        assert_eq!(tree, copy);
    }

    #[test]
    fn test_move_onto_existing_file_is_refused() {
        let tree = sample_tree().create_file("/sdcard/other.img", None).unwrap();
        assert_eq!(
            tree.move_node("/sdcard/boot.img", "/sdcard/other.img"),
            Err(MoveError::Destination(VfsError::AlreadyExists(
                "other.img".into()
            )))
        );
    }

    #[test]
    fn test_reset_directory() {
        let tree = sample_tree();
        let next = tree.reset_directory("/sdcard").unwrap();
        assert_eq!(lookup(&next, &["sdcard"]), Some(&VfsNode::empty_directory()));
        assert_eq!(
            tree.reset_directory("/sdcard/boot.img"),
            Err(VfsError::NotADirectory("boot.img".into()))
        );
        assert_eq!(tree.reset_directory("/"), Err(VfsError::PermissionDenied));
    }
}
