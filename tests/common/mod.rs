//! Shared fixtures for HTTP tests.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response},
};
use filebrowser::{AppState, Config, MemoryFs, RootDirectory, config, routes};
use tempfile::TempDir;
use tower::ServiceExt;

/// A served temp directory holding `a.txt` ("hello") and an empty `sub/`.
pub struct TestTree {
    pub dir: TempDir,
    pub app: Router,
}

pub fn test_tree() -> TestTree {
    test_tree_with_config(Config::default())
}

pub fn test_tree_with_config(config: Config) -> TestTree {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), "hello").unwrap();
    std::fs::create_dir(dir.path().join("sub")).unwrap();

    let root = config::open_root(dir.path()).unwrap();
    let app = routes::app(AppState::new(root, config));
    TestTree { dir, app }
}

/// App backed by an in-memory tree rooted at `/srv`.
pub fn memory_app(fs: MemoryFs) -> Router {
    let root = RootDirectory::new("/srv").unwrap();
    routes::app(AppState::with_fs(root, Arc::new(fs), Config::default()))
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .method(Method::GET)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}
