//! Request handler module
//!
//! Maps each request path onto a file below the document root and serves it.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
