use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "avatar-config-sync.yaml";

/// Prefix of environment overrides, e.g. `AVATAR_SYNC__IPC__RENDERER_ADDR`.
pub const ENV_PREFIX: &str = "AVATAR_SYNC";

/// Process configuration.
///
/// Every field has a default, so an empty or missing file is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ipc: IpcConfig,
    pub polling: PollingConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpcConfig {
    /// Renderer's datagram endpoint.
    pub renderer_addr: SocketAddr,
    /// Local endpoint the renderer replies to.
    pub listen_addr: SocketAddr,
    /// Zero disables the query timeout.
    pub query_timeout_ms: u64,
}

impl IpcConfig {
    pub fn query_timeout(&self) -> Option<Duration> {
        (self.query_timeout_ms > 0).then(|| Duration::from_millis(self.query_timeout_ms))
    }
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            renderer_addr: SocketAddr::from(([127, 0, 0, 1], 53241)),
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 53242)),
            query_timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub camera_interval_ms: u64,
    pub device_layout_interval_ms: u64,
}

impl PollingConfig {
    pub fn camera_interval(&self) -> Duration {
        Duration::from_millis(self.camera_interval_ms)
    }

    pub fn device_layout_interval(&self) -> Duration {
        Duration::from_millis(self.device_layout_interval_ms)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            camera_interval_ms: 2000,
            device_layout_interval_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `_autosave` and `_save1`..`_save3`.
    pub save_dir: Utf8PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            save_dir: Utf8PathBuf::from("SaveData"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: Utf8PathBuf,
    pub prefix: String,
    pub debug: bool,
    pub console: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: Utf8PathBuf::from("logs"),
            prefix: "avatar-config-sync".to_string(),
            debug: false,
            console: true,
        }
    }
}

impl AppConfig {
    /// Load defaults, then the YAML file (optional unless `path` is given),
    /// then `AVATAR_SYNC__*` environment overrides.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self> {
        let builder = config::Config::builder();
        let builder = match path {
            Some(path) => builder.add_source(
                config::File::new(path.as_str(), config::FileFormat::Yaml).required(true),
            ),
            None => builder.add_source(
                config::File::new(DEFAULT_CONFIG_FILE, config::FileFormat::Yaml).required(false),
            ),
        };

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| match path {
                Some(path) => format!("Failed to read configuration from {}", path),
                None => "Failed to read configuration".to_string(),
            })?;

        let config: AppConfig = settings
            .try_deserialize()
            .context("Invalid configuration values")?;

        tracing::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Load from the path in the first CLI argument, if any.
    pub fn from_args() -> Result<Self> {
        let path = std::env::args().nth(1).map(Utf8PathBuf::from);
        Self::load(path.as_deref())
    }
}
