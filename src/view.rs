use serde::Serialize;

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub is_dir: bool,
    /// Always 0 for directories and for entries whose metadata was unavailable.
    pub size: u64,
    /// Request path of the child, e.g. `/sub/a.txt`.
    pub path: String,
}

/// Rendering-ready result of one browse request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ViewModel {
    Directory {
        current_path: String,
        entries: Vec<DirectoryEntry>,
    },
    File {
        current_path: String,
        file_name: String,
        content: String,
    },
}

impl ViewModel {
    pub fn current_path(&self) -> &str {
        match self {
            ViewModel::Directory { current_path, .. } | ViewModel::File { current_path, .. } => {
                current_path
            }
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, ViewModel::File { .. })
    }
}
