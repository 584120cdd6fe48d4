//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: maps the request path onto the
//! document root and attaches the cross-origin isolation headers.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http::{self, mime};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response};
use std::convert::Infallible;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Path served in place of `/`
pub const INDEX_PATH: &str = "/index.html";

/// Per-request values derived from the request path
#[derive(Debug)]
pub struct RequestContext<'a> {
    /// URL path after the root rewrite
    pub path: &'a str,
    /// Filesystem path the URL path resolves to
    pub file_path: PathBuf,
    /// Content-Type inferred from the path's extension
    pub content_type: &'static str,
}

impl<'a> RequestContext<'a> {
    pub fn new(request_path: &'a str, root: &Path) -> Self {
        let path = rewrite_root(request_path);
        Self {
            path,
            file_path: resolve_file_path(root, path),
            content_type: mime::content_type_for(path),
        }
    }
}

/// Main entry point for HTTP request handling
///
/// Every method is served the same way. The request body is never read.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let ctx = RequestContext::new(req.uri().path(), &state.root);

    let mut response = static_files::serve_file(&ctx).await;
    http::apply_isolation_headers(response.headers_mut());

    Ok(response)
}

/// Rewrite `/` to the index document; every other path passes through untouched
pub fn rewrite_root(path: &str) -> &str {
    if path == "/" {
        INDEX_PATH
    } else {
        path
    }
}

/// Append the URL path to the textual form of `root`
///
/// `Path::join` would discard `root` for the absolute URL path, so the two are
/// concatenated instead. `..` segments are kept as-is.
pub fn resolve_file_path(root: &Path, url_path: &str) -> PathBuf {
    let mut joined = OsString::from(root.as_os_str());
    joined.push(url_path);
    PathBuf::from(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;

    fn scratch_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "coi-serve-router-{}-{name}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.html"), b"hello").unwrap();
        std::fs::write(dir.join("app.wasm"), [0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00])
            .unwrap();
        dir
    }

    fn state_for(root: &Path) -> Arc<AppState> {
        Arc::new(AppState::with_root(&Config::default(), root.to_path_buf()))
    }

    async fn get(state: &Arc<AppState>, uri: &str) -> Response<Full<Bytes>> {
        let req = Request::get(uri).body(()).unwrap();
        handle_request(req, Arc::clone(state)).await.unwrap()
    }

    fn assert_isolated(response: &Response<Full<Bytes>>) {
        assert_eq!(response.headers()["cross-origin-opener-policy"], "same-origin");
        assert_eq!(response.headers()["cross-origin-embedder-policy"], "require-corp");
    }

    async fn body_bytes(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[test]
    fn test_rewrite_root() {
        assert_eq!(rewrite_root("/"), "/index.html");
        assert_eq!(rewrite_root("/index.html"), "/index.html");
        assert_eq!(rewrite_root("/docs/"), "/docs/");
        assert_eq!(rewrite_root("//"), "//");
    }

    #[test]
    fn test_resolve_file_path() {
        let root = Path::new(".");
        assert_eq!(resolve_file_path(root, "/index.html"), Path::new("./index.html"));
        assert_eq!(resolve_file_path(root, "/foo/bar.wasm"), Path::new("./foo/bar.wasm"));
        assert_eq!(resolve_file_path(root, "/../secret"), Path::new("./../secret"));
    }

    #[test]
    fn test_request_context() {
        let ctx = RequestContext::new("/", Path::new("."));
        assert_eq!(ctx.path, "/index.html");
        assert_eq!(ctx.file_path, Path::new("./index.html"));
        assert_eq!(ctx.content_type, "text/html");

        let ctx = RequestContext::new("/pkg/app.worker.js", Path::new("."));
        assert_eq!(ctx.content_type, "text/javascript");
    }

    #[tokio::test]
    async fn test_root_matches_index() {
        let root = scratch_root("index");
        let state = state_for(&root);

        let via_root = get(&state, "/").await;
        let via_index = get(&state, "/index.html").await;

        assert_eq!(via_root.status(), 200);
        assert_eq!(via_root.status(), via_index.status());
        assert_eq!(via_root.headers()["content-type"], "text/html");
        assert_eq!(
            via_root.headers()["content-type"],
            via_index.headers()["content-type"]
        );
        assert_isolated(&via_root);
        assert_eq!(body_bytes(via_root).await, "hello");
        assert_eq!(body_bytes(via_index).await, "hello");

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_wasm_and_missing() {
        let root = scratch_root("wasm");
        let state = state_for(&root);

        let response = get(&state, "/app.wasm").await;
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["content-type"], "application/wasm");
        assert_isolated(&response);
        assert_eq!(
            body_bytes(response).await.as_ref(),
            std::fs::read(root.join("app.wasm")).unwrap().as_slice()
        );

        let response = get(&state, "/missing.txt").await;
        assert_eq!(response.status(), 404);
        assert_isolated(&response);
        assert_eq!(body_bytes(response).await, "File not found");

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_every_table_extension() {
        let root = scratch_root("table");
        let state = state_for(&root);

        for (ext, content_type) in http::mime::MIME_TYPES {
            let name = format!("asset{ext}");
            std::fs::write(root.join(&name), b"payload").unwrap();

            let response = get(&state, &format!("/{name}")).await;
            assert_eq!(response.status(), 200, "{name}");
            assert_eq!(response.headers()["content-type"], *content_type, "{name}");
            assert_isolated(&response);
        }

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_query_string_is_not_part_of_path() {
        let root = scratch_root("query");
        let state = state_for(&root);

        let response = get(&state, "/index.html?v=2").await;
        assert_eq!(response.status(), 200);
        assert_eq!(body_bytes(response).await, "hello");

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_server_error_is_isolated() {
        let root = scratch_root("error");
        std::fs::create_dir_all(root.join("nested")).unwrap();
        let state = state_for(&root);

        let response = get(&state, "/nested").await;
        assert_eq!(response.status(), 500);
        assert_isolated(&response);
        assert!(body_bytes(response).await.starts_with(b"Server Error: "));

        let _ = std::fs::remove_dir_all(root);
    }
}
