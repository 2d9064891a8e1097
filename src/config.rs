//! Runtime configuration.
//!
//! Every path the application touches is carried by [`Config`] and handed to
//! the components that need it at construction time, so tests can point the
//! store and the channel reader at temporary directories.
//!
//! The file format is TOML; every key is optional:
//!
//! ```toml
//! [feeds]
//! channels_file = "boardgame_channels.txt"
//! host_pattern = "rss.app/feeds/"
//!
//! [storage]
//! data_dir = "data"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 3000
//!
//! [logging]
//! level = "info"
//! file = "data/gramfeed.log"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{GramfeedError, Result};

/// Name of the posts document inside the data directory.
const POSTS_FILE_NAME: &str = "posts.json";

/// Where feed URLs come from.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedsConfig {
    /// Line-oriented text file listing one feed URL per line.
    #[serde(default = "default_channels_file")]
    pub channels_file: PathBuf,
    /// Only lines containing this substring are treated as feed sources.
    #[serde(default = "default_host_pattern")]
    pub host_pattern: String,
}

fn default_channels_file() -> PathBuf {
    PathBuf::from("boardgame_channels.txt")
}

fn default_host_pattern() -> String {
    "rss.app/feeds/".to_string()
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            channels_file: default_channels_file(),
            host_pattern: default_host_pattern(),
        }
    }
}

/// Where the post store lives.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `posts.json`. Created on first write.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl StorageConfig {
    /// Full path of the posts document.
    pub fn posts_file(&self) -> PathBuf {
        self.data_dir.join(POSTS_FILE_NAME)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// HTTP API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file used while the terminal browser owns stdout.
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("data/gramfeed.log")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feeds: FeedsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            GramfeedError::Config(format!(
                "failed to read {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::parse(&content)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| GramfeedError::Config(e.to_string()))
    }

    /// Address the HTTP API binds to, as `host:port`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
