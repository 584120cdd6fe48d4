//! Static file serving module
//!
//! Reads a requested file into memory and turns the outcome into a response.

use crate::handler::router::RequestContext;
use crate::http;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::fmt;
use std::io;
use std::path::Path;
use tokio::fs;

/// Failure to read a requested file
#[derive(Debug)]
pub enum ReadError {
    /// Nothing exists at the path
    NotFound,
    /// Any other filesystem failure (permissions, descriptor exhaustion, ...)
    Io(io::Error),
}

impl ReadError {
    /// Short error code, e.g. `ENOENT` or `EACCES`
    ///
    /// Falls back to the `io::ErrorKind` name when the OS error number is not known.
    pub fn code(&self) -> String {
        match self {
            Self::NotFound => "ENOENT".to_string(),
            Self::Io(e) => {
                errno_name(e).map_or_else(|| format!("{:?}", e.kind()), str::to_string)
            }
        }
    }
}

impl From<io::Error> for ReadError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            Self::NotFound
        } else {
            Self::Io(e)
        }
    }
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "file not found"),
            Self::Io(e) => write!(f, "{}: {e}", self.code()),
        }
    }
}

impl std::error::Error for ReadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound => None,
            Self::Io(e) => Some(e),
        }
    }
}

/// POSIX name for the OS error number carried by `err`
///
/// Covers the errors `open(2)`/`read(2)` can report. Numbers outside the table
/// (and errors with no OS number at all) fall back to the `io::ErrorKind` name.
#[cfg(unix)]
fn errno_name(err: &io::Error) -> Option<&'static str> {
    match err.raw_os_error()? {
        1 => Some("EPERM"),
        2 => Some("ENOENT"),
        4 => Some("EINTR"),
        5 => Some("EIO"),
        6 => Some("ENXIO"),
        9 => Some("EBADF"),
        12 => Some("ENOMEM"),
        13 => Some("EACCES"),
        14 => Some("EFAULT"),
        16 => Some("EBUSY"),
        19 => Some("ENODEV"),
        20 => Some("ENOTDIR"),
        21 => Some("EISDIR"),
        22 => Some("EINVAL"),
        23 => Some("ENFILE"),
        24 => Some("EMFILE"),
        26 => Some("ETXTBSY"),
        27 => Some("EFBIG"),
        28 => Some("ENOSPC"),
        30 => Some("EROFS"),
        #[cfg(any(target_os = "linux", target_os = "android"))]
        11 => Some("EAGAIN"),
        #[cfg(any(target_os = "linux", target_os = "android"))]
        36 => Some("ENAMETOOLONG"),
        #[cfg(any(target_os = "linux", target_os = "android"))]
        37 => Some("ENOLCK"),
        #[cfg(any(target_os = "linux", target_os = "android"))]
        40 => Some("ELOOP"),
        #[cfg(any(target_os = "linux", target_os = "android"))]
        75 => Some("EOVERFLOW"),
        #[cfg(any(target_os = "linux", target_os = "android"))]
        116 => Some("ESTALE"),
        #[cfg(any(target_os = "linux", target_os = "android"))]
        122 => Some("EDQUOT"),
        #[cfg(any(target_os = "macos", target_os = "ios"))]
        35 => Some("EAGAIN"),
        #[cfg(any(target_os = "macos", target_os = "ios"))]
        62 => Some("ELOOP"),
        #[cfg(any(target_os = "macos", target_os = "ios"))]
        63 => Some("ENAMETOOLONG"),
        #[cfg(any(target_os = "macos", target_os = "ios"))]
        69 => Some("EDQUOT"),
        #[cfg(any(target_os = "macos", target_os = "ios"))]
        70 => Some("ESTALE"),
        #[cfg(any(target_os = "macos", target_os = "ios"))]
        77 => Some("ENOLCK"),
        #[cfg(any(target_os = "macos", target_os = "ios"))]
        84 => Some("EOVERFLOW"),
        _ => None,
    }
}

#[cfg(not(unix))]
fn errno_name(_err: &io::Error) -> Option<&'static str> {
    None
}

/// Read the whole file at `path`
pub async fn load_file(path: &Path) -> Result<Vec<u8>, ReadError> {
    Ok(fs::read(path).await?)
}

/// Serve the file the request context resolved to
///
/// One read per request, never retried. Failures only reach the client;
/// nothing is written to the error log.
pub async fn serve_file(ctx: &RequestContext<'_>) -> Response<Full<Bytes>> {
    match load_file(&ctx.file_path).await {
        Ok(content) => http::build_file_response(content, ctx.content_type),
        Err(ReadError::NotFound) => http::build_404_response(),
        Err(e) => http::build_500_response(&e.code()),
    }
}
