//! HTTP protocol layer module
//!
//! Content-Type inference and response builders, independent of how a
//! request is mapped onto the filesystem.

pub mod mime;
pub mod response;

// Re-export commonly used items
pub use response::{
    apply_isolation_headers, build_404_response, build_500_response, build_file_response,
};
