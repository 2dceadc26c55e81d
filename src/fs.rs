//! Filesystem access used by the dispatcher.
//!
//! Every method takes a [`ResolvedPath`], so nothing outside the root can be
//! reached through this interface.

use std::collections::{BTreeMap, HashSet};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::resolver::ResolvedPath;

/// The subset of metadata the browser needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryMetadata {
    pub is_dir: bool,
    pub len: u64,
}

#[async_trait]
pub trait FileSystem: Send + Sync {
    /// Stat `path`, following symlinks.
    async fn metadata(&self, path: &ResolvedPath) -> io::Result<EntryMetadata>;

    /// Names of the immediate children of `path`, in enumeration order.
    async fn read_dir(&self, path: &ResolvedPath) -> io::Result<Vec<OsString>>;

    /// Entire contents of the file at `path`.
    async fn read(&self, path: &ResolvedPath) -> io::Result<Vec<u8>>;
}

/// The real filesystem, via `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

#[async_trait]
impl FileSystem for LocalFs {
    async fn metadata(&self, path: &ResolvedPath) -> io::Result<EntryMetadata> {
        let metadata = fs::metadata(path.as_path()).await?;
        Ok(EntryMetadata {
            is_dir: metadata.is_dir(),
            len: if metadata.is_dir() { 0 } else { metadata.len() },
        })
    }

    async fn read_dir(&self, path: &ResolvedPath) -> io::Result<Vec<OsString>> {
        let mut dir = fs::read_dir(path.as_path()).await?;
        let mut names = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            names.push(entry.file_name());
        }
        Ok(names)
    }

    async fn read(&self, path: &ResolvedPath) -> io::Result<Vec<u8>> {
        fs::read(path.as_path()).await
    }
}

#[derive(Debug, Clone)]
enum MemoryNode {
    Dir,
    File(Vec<u8>),
}

/// In-memory tree for tests and embedding.
///
/// Children are enumerated in byte order of their names. Individual paths
/// can be marked as failing `metadata` or failing reads to exercise error
/// handling.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    nodes: BTreeMap<PathBuf, MemoryNode>,
    broken_metadata: HashSet<PathBuf>,
    unreadable: HashSet<PathBuf>,
}

impl MemoryFs {
    /// Create a tree containing the directory `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::default().with_dir(root)
    }

    /// Add a directory, creating missing ancestors.
    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        self.add_ancestors(&path);
        self.nodes.insert(path, MemoryNode::Dir);
        self
    }

    /// Add a file, creating missing ancestor directories.
    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        let path = path.into();
        self.add_ancestors(&path);
        self.nodes.insert(path, MemoryNode::File(contents.into()));
        self
    }

    /// Make `metadata` fail for `path` while it still shows up in listings.
    pub fn with_broken_metadata(mut self, path: impl Into<PathBuf>) -> Self {
        self.broken_metadata.insert(path.into());
        self
    }

    /// Make `read_dir`/`read` fail for `path` while `metadata` still succeeds.
    pub fn with_unreadable(mut self, path: impl Into<PathBuf>) -> Self {
        self.unreadable.insert(path.into());
        self
    }

    fn add_ancestors(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            self.nodes
                .entry(ancestor.to_path_buf())
                .or_insert(MemoryNode::Dir);
        }
    }

    fn node(&self, path: &Path) -> io::Result<&MemoryNode> {
        self.nodes
            .get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such entry"))
    }

    fn check_readable(&self, path: &Path) -> io::Result<()> {
        if self.unreadable.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl FileSystem for MemoryFs {
    async fn metadata(&self, path: &ResolvedPath) -> io::Result<EntryMetadata> {
        let path = path.as_path();
        if self.broken_metadata.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            ));
        }
        Ok(match self.node(path)? {
            MemoryNode::Dir => EntryMetadata {
                is_dir: true,
                len: 0,
            },
            MemoryNode::File(contents) => EntryMetadata {
                is_dir: false,
                len: contents.len() as u64,
            },
        })
    }

    async fn read_dir(&self, path: &ResolvedPath) -> io::Result<Vec<OsString>> {
        let path = path.as_path();
        self.check_readable(path)?;
        match self.node(path)? {
            MemoryNode::Dir => Ok(self
                .nodes
                .keys()
                .filter(|candidate| candidate.parent() == Some(path))
                .filter_map(|candidate| candidate.file_name().map(|n| n.to_os_string()))
                .collect()),
            MemoryNode::File(_) => Err(io::Error::other("not a directory")),
        }
    }

    async fn read(&self, path: &ResolvedPath) -> io::Result<Vec<u8>> {
        let path = path.as_path();
        self.check_readable(path)?;
        match self.node(path)? {
            MemoryNode::File(contents) => Ok(contents.clone()),
            MemoryNode::Dir => Err(io::Error::other("is a directory")),
        }
    }
}
