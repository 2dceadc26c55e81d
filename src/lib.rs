//! Read-only HTTP file browser.
//!
//! Exposes one directory tree over HTTP as HTML directory listings and file
//! views. Request paths are resolved lexically and never escape the root.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod fs;
pub mod handlers;
pub mod render;
pub mod resolver;
pub mod routes;
pub mod view;

use std::sync::Arc;

pub use config::Config;
pub use dispatcher::RequestDispatcher;
pub use error::{ConfigError, DispatchError, Rejection};
pub use fs::{FileSystem, LocalFs, MemoryFs};
pub use resolver::{ResolvedPath, RootDirectory};
pub use view::{DirectoryEntry, ViewModel};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: RequestDispatcher,
    pub config: Arc<Config>,
}

impl AppState {
    /// Serve `root` from the local filesystem with the given config.
    pub fn new(root: RootDirectory, config: Config) -> Self {
        Self::with_fs(root, Arc::new(LocalFs), config)
    }

    /// Serve `root` through an arbitrary filesystem implementation.
    pub fn with_fs(root: RootDirectory, fs: Arc<dyn FileSystem>, config: Config) -> Self {
        Self {
            dispatcher: RequestDispatcher::new(root, fs),
            config: Arc::new(config),
        }
    }
}
