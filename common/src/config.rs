// common/src/config.rs
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use config::{Config as ConfigFile, File, Environment};

/// Central configuration for the relay
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address to listen on; `:PORT` binds every interface
    pub listen_addr: String,
    /// Forward non-API requests to `proxy_url` instead of serving static files
    pub dev: bool,
    pub proxy_url: String,
    pub request_timeout_secs: u64,

    // Static file serving configuration
    pub static_files: StaticFilesConfig,

    pub hub: HubConfig,

    /// Upstream coordinate feeds injected as bot participants
    pub feeds: Vec<FeedConfig>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    pub path: String,
    pub index: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Per-session outbound buffer; deliveries beyond it are dropped
    pub outbound_capacity: usize,
    pub heartbeat_interval_secs: u64,
    pub client_timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_feed_name")]
    pub name: String,
    pub url: String,
    #[serde(default = "default_dial_retry_ms")]
    pub dial_retry_ms: u64,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    /// Upper bound on connecting plus the websocket handshake
    #[serde(default = "default_dial_timeout_ms")]
    pub dial_timeout_ms: u64,
}

fn default_feed_name() -> String {
    "bot".to_string()
}

fn default_dial_retry_ms() -> u64 {
    10_000
}

fn default_backoff_ms() -> u64 {
    5_000
}

fn default_dial_timeout_ms() -> u64 {
    45_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: ":8080".to_string(),
            dev: false,
            proxy_url: "http://localhost:3000/".to_string(),
            request_timeout_secs: 10,
            static_files: StaticFilesConfig::default(),
            hub: HubConfig::default(),
            feeds: Vec::new(),
        }
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            path: "./reactsite/build".to_string(),
            index: "index.html".to_string(),
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            outbound_capacity: 32,
            heartbeat_interval_secs: 5,
            client_timeout_secs: 30,
        }
    }
}

impl HubConfig {
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs.max(1))
    }

    pub fn client_timeout(&self) -> Duration {
        Duration::from_secs(self.client_timeout_secs)
    }
}

impl FeedConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            dial_retry_ms: default_dial_retry_ms(),
            backoff_ms: default_backoff_ms(),
            dial_timeout_ms: default_dial_timeout_ms(),
        }
    }

    pub fn dial_retry(&self) -> Duration {
        Duration::from_millis(self.dial_retry_ms)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn dial_timeout(&self) -> Duration {
        Duration::from_millis(self.dial_timeout_ms)
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        // Get the run mode, defaulting to "development"
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        // Locate the config directory
        let config_dir = env::var("CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./config"));

        tracing::info!("Loading configuration from {}", config_dir.display());
        tracing::info!("Using run mode: {}", run_mode);

        Self::load_from(&config_dir, &run_mode)
    }

    pub fn load_from(config_dir: &Path, run_mode: &str) -> Result<Self, config::ConfigError> {
        ConfigFile::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", run_mode))).required(false))
            // Local overrides, never committed
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Load from files and environment, falling back to defaults
    pub fn from_env() -> Self {
        match Self::load() {
            Ok(config) => {
                tracing::info!("Configuration loaded from files and environment");
                config
            },
            Err(e) => {
                tracing::warn!("Failed to load configuration: {}", e);
                tracing::info!("Falling back to default configuration");
                Self::default()
            }
        }
    }

    /// Socket address suitable for binding, expanding `:PORT` to all interfaces
    pub fn bind_addr(&self) -> String {
        if self.listen_addr.starts_with(':') {
            format!("0.0.0.0{}", self.listen_addr)
        } else {
            self.listen_addr.clone()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
