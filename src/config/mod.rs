// Configuration module entry point
// Loads ambient configuration and holds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::Config;

/// Listening port, fixed
pub const PORT: u16 = 8000;

/// Default configuration file name (without extension)
pub const CONFIG_FILE: &str = "coi-serve";

/// Environment variable prefix, e.g. `COI_SERVE_LOGGING__ACCESS_LOG=true`
pub const ENV_PREFIX: &str = "COI_SERVE";

impl Config {
    /// Load configuration from `coi-serve.{toml,json,yaml,...}` and the environment
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from specified file path (without extension)
    ///
    /// A missing file is not an error; built-in defaults apply.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("logging.access_log", false)?
            .set_default("logging.access_log_format", "combined")?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{PORT}", self.server.host)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
