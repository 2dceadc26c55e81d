//! One browse request, end to end: resolve, stat, list or read.

use std::cmp::Ordering;
use std::sync::Arc;

use tracing::{debug, error};

use crate::error::DispatchError;
use crate::fs::FileSystem;
use crate::resolver::{ResolvedPath, RootDirectory};
use crate::view::{DirectoryEntry, ViewModel};

/// Stateless request handler over a fixed root and filesystem.
#[derive(Clone)]
pub struct RequestDispatcher {
    root: RootDirectory,
    fs: Arc<dyn FileSystem>,
}

impl RequestDispatcher {
    pub fn new(root: RootDirectory, fs: Arc<dyn FileSystem>) -> Self {
        Self { root, fs }
    }

    pub fn root(&self) -> &RootDirectory {
        &self.root
    }

    /// Build the view for `request_path` (relative to the root, e.g. `/a.txt`).
    pub async fn handle(&self, request_path: &str) -> Result<ViewModel, DispatchError> {
        let path = self.root.resolve(request_path)?;

        let metadata = self.fs.metadata(&path).await.map_err(|err| {
            debug!("Stat failed for {}: {}", path.request_path(), err);
            DispatchError::NotFound
        })?;

        if metadata.is_dir {
            self.list_directory(path).await
        } else {
            self.read_file(path).await
        }
    }

    async fn list_directory(&self, path: ResolvedPath) -> Result<ViewModel, DispatchError> {
        let names = self.fs.read_dir(&path).await.map_err(|err| {
            error!("Cannot read directory {}: {}", path.as_path().display(), err);
            DispatchError::DirectoryUnreadable(err)
        })?;

        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let Some(child) = path.child(&name) else {
                debug!("Skipping unusable entry name {:?}", name);
                continue;
            };

            // A child that cannot be stat'ed (dangling symlink, permissions)
            // is still listed, as a zero-sized file.
            let (is_dir, size) = match self.fs.metadata(&child).await {
                Ok(metadata) if metadata.is_dir => (true, 0),
                Ok(metadata) => (false, metadata.len),
                Err(err) => {
                    debug!("Cannot stat {}: {}", child.request_path(), err);
                    (false, 0)
                }
            };

            // Non-UTF-8 names are shown lossily. Their request path carries
            // U+FFFD too, so following the link reports NotFound; URLs here
            // are UTF-8 only.
            entries.push(DirectoryEntry {
                name: name.to_string_lossy().to_string(),
                is_dir,
                size,
                path: child.request_path().to_string(),
            });
        }

        entries.sort_by(compare_entries);

        Ok(ViewModel::Directory {
            current_path: path.request_path().to_string(),
            entries,
        })
    }

    async fn read_file(&self, path: ResolvedPath) -> Result<ViewModel, DispatchError> {
        let bytes = self.fs.read(&path).await.map_err(|err| {
            error!("Cannot read file {}: {}", path.as_path().display(), err);
            DispatchError::FileUnreadable(err)
        })?;

        Ok(ViewModel::File {
            current_path: path.request_path().to_string(),
            file_name: path.file_name(),
            content: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// Directories first, then case-insensitive by name; raw name breaks ties.
fn compare_entries(a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
    b.is_dir
        .cmp(&a.is_dir)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}
