// Server module entry point
// Listener creation, the accept loop, and per-connection serving

pub mod connection;
pub mod listener;

// `loop` is a keyword, so the file is mounted as `server_loop`
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::create_reusable_listener;
pub use server_loop::start_server_loop;
