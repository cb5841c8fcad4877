//! Runtime configuration.

use std::env;

/// Everything the binary needs to know, read from the environment with
/// defaults matching local development.
#[derive(Clone, Debug)]
pub struct Config {
    /// `host:port` to bind. `TASKBOARD_ADDR`, default `127.0.0.1:8000`.
    pub addr: String,
    /// Root directory of the front-end assets (`html/`, `css/`, `js/`).
    /// `TASKBOARD_ASSETS`, default `frontend`.
    pub assets_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            addr: env::var("TASKBOARD_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".to_owned()),
            assets_dir: env::var("TASKBOARD_ASSETS").unwrap_or_else(|_| "frontend".to_owned()),
        }
    }
}
