// Server loop module
// Accepts connections forever and hands each one to its own task

use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::handle_connection;
use crate::config::AppState;
use crate::logger;

/// Accept loop
///
/// Never returns: a failed accept is logged and the loop keeps going.
pub async fn start_server_loop(listener: TcpListener, state: Arc<AppState>) {
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                handle_connection(stream, peer_addr, Arc::clone(&state));
            }
            Err(e) => {
                logger::log_error(&format!("Failed to accept connection: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_reusable_listener;
    use http_body_util::{BodyExt, Empty};
    use hyper::body::Bytes;
    use hyper::client::conn::http1;
    use hyper::{Request, Response};
    use hyper_util::rt::TokioIo;
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use tokio::net::TcpStream;

    const WASM_BYTES: [u8; 12] = [
        0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00, 0x0d, 0x0a, 0xff, 0x00,
    ];

    fn scratch_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "coi-serve-e2e-{}-{name}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.html"), b"hello").unwrap();
        std::fs::write(dir.join("app.wasm"), WASM_BYTES).unwrap();
        std::fs::create_dir_all(dir.join("assets.d")).unwrap();
        dir
    }

    async fn start(root: PathBuf) -> SocketAddr {
        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(AppState::with_root(&Config::default(), root));
        tokio::spawn(start_server_loop(listener, state));
        addr
    }

    /// Issue `paths` in order over a single keep-alive connection
    async fn fetch_all(addr: SocketAddr, paths: &[&str]) -> Vec<(Response<()>, Bytes)> {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (mut sender, conn) = http1::handshake(TokioIo::new(stream)).await.unwrap();
        tokio::spawn(conn);

        let mut results = Vec::new();
        for path in paths {
            let req = Request::get(*path)
                .header("host", addr.to_string())
                .body(Empty::<Bytes>::new())
                .unwrap();
            let response = sender.send_request(req).await.unwrap();
            let (parts, body) = response.into_parts();
            let bytes = body.collect().await.unwrap().to_bytes();
            results.push((Response::from_parts(parts, ()), bytes));
        }
        results
    }

    fn assert_isolated(response: &Response<()>) {
        assert_eq!(response.headers()["cross-origin-opener-policy"], "same-origin");
        assert_eq!(response.headers()["cross-origin-embedder-policy"], "require-corp");
    }

    #[tokio::test]
    async fn test_serves_scenario_over_tcp() {
        let root = scratch_root("scenario");
        let addr = start(root.clone()).await;

        let paths = ["/", "/app.wasm", "/missing.txt", "/index.html", "/assets.d"];
        let results = fetch_all(addr, &paths).await;

        let (index, body) = &results[0];
        assert_eq!(index.status(), 200);
        assert_eq!(index.headers()["content-type"], "text/html");
        assert_eq!(index.headers()["content-length"], "5");
        assert_isolated(index);
        assert_eq!(body, "hello");

        let (wasm, body) = &results[1];
        assert_eq!(wasm.status(), 200);
        assert_eq!(wasm.headers()["content-type"], "application/wasm");
        assert_isolated(wasm);
        assert_eq!(body.as_ref(), WASM_BYTES.as_slice());

        let (missing, body) = &results[2];
        assert_eq!(missing.status(), 404);
        assert_isolated(missing);
        assert_eq!(body, "File not found");

        let (explicit, body) = &results[3];
        assert_eq!(explicit.status(), index.status());
        assert_eq!(explicit.headers()["content-type"], "text/html");
        assert_eq!(body, "hello");

        // Reading a directory fails, and the keep-alive connection survives it
        let (directory, body) = &results[4];
        assert_eq!(directory.status(), 500);
        assert_isolated(directory);
        assert!(body.starts_with(b"Server Error: "));
        #[cfg(target_os = "linux")]
        assert_eq!(body, "Server Error: EISDIR");

        let _ = std::fs::remove_dir_all(root);
    }

    #[tokio::test]
    async fn test_concurrent_connections() {
        let root = scratch_root("concurrent");
        let addr = start(root.clone()).await;

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let path = if i % 2 == 0 { "/" } else { "/app.wasm" };
                tokio::spawn(async move { fetch_all(addr, &[path]).await })
            })
            .collect();

        for task in tasks {
            let results = task.await.unwrap();
            let (response, _) = &results[0];
            assert_eq!(response.status(), 200);
            assert_isolated(response);
        }

        let _ = std::fs::remove_dir_all(root);
    }
}
