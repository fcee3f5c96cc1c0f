//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `RECOMMENDER_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::constants::DEFAULT_TOP_K;
use crate::embedding::{DevicePreference, EmbedderConfig};

/// Service configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `RECOMMENDER_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8000`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Catalog file (`.csv` or `.json`). Default: `data/assessments.csv`.
    pub catalog_path: PathBuf,

    /// Embedding cache file. Default: `data/embeddings.bin`.
    pub embeddings_path: PathBuf,

    /// all-MiniLM-L6-v2 model directory. `None` runs the stub embedder.
    pub model_path: Option<PathBuf>,

    /// Encoder backend (`auto`, `cpu`, `metal`, `cuda`). Default: `auto`.
    pub device: DevicePreference,

    /// Results per recommendation. Default: `10`.
    pub top_k: usize,

    /// Browser origins allowed by CORS.
    pub cors_origins: Vec<String>,
}

pub const DEFAULT_CATALOG_PATH: &str = "data/assessments.csv";
pub const DEFAULT_EMBEDDINGS_PATH: &str = "data/embeddings.bin";
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:5500";

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            embeddings_path: PathBuf::from(DEFAULT_EMBEDDINGS_PATH),
            model_path: None,
            device: DevicePreference::Auto,
            top_k: DEFAULT_TOP_K,
            cors_origins: split_list(DEFAULT_CORS_ORIGINS),
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "RECOMMENDER_PORT";
    const ENV_BIND_ADDR: &'static str = "RECOMMENDER_BIND_ADDR";
    const ENV_CATALOG_PATH: &'static str = "RECOMMENDER_CATALOG_PATH";
    const ENV_EMBEDDINGS_PATH: &'static str = "RECOMMENDER_EMBEDDINGS_PATH";
    const ENV_MODEL_PATH: &'static str = EmbedderConfig::ENV_MODEL_PATH;
    const ENV_DEVICE: &'static str = "RECOMMENDER_DEVICE";
    const ENV_TOP_K: &'static str = "RECOMMENDER_TOP_K";
    const ENV_CORS_ORIGINS: &'static str = "RECOMMENDER_CORS_ORIGINS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let catalog_path = Self::parse_path_from_env(Self::ENV_CATALOG_PATH, defaults.catalog_path);
        let embeddings_path =
            Self::parse_path_from_env(Self::ENV_EMBEDDINGS_PATH, defaults.embeddings_path);
        let model_path = Self::parse_optional_path_from_env(Self::ENV_MODEL_PATH);
        let device = Self::parse_device_from_env(defaults.device)?;
        let top_k = Self::parse_top_k_from_env(defaults.top_k)?;
        let cors_origins = env::var(Self::ENV_CORS_ORIGINS)
            .map(|v| split_list(&v))
            .unwrap_or(defaults.cors_origins);

        Ok(Self {
            port,
            bind_addr,
            catalog_path,
            embeddings_path,
            model_path,
            device,
            top_k,
            cors_origins,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    ///
    /// A missing catalog is not an error here; the engine build reports it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 {
            return Err(ConfigError::InvalidTopK {
                value: self.top_k.to_string(),
            });
        }

        if self.catalog_path.exists() && !self.catalog_path.is_file() {
            return Err(ConfigError::NotAFile {
                path: self.catalog_path.clone(),
            });
        }

        if self.embeddings_path.is_dir() {
            return Err(ConfigError::NotAFile {
                path: self.embeddings_path.clone(),
            });
        }

        if let Some(ref path) = self.model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Embedder settings: the model directory when configured, otherwise the stub.
    pub fn embedder_config(&self) -> EmbedderConfig {
        match self.model_path {
            Some(ref path) => EmbedderConfig::new(path).with_device(self.device),
            None => EmbedderConfig::stub(),
        }
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_device_from_env(default: DevicePreference) -> Result<DevicePreference, ConfigError> {
        match env::var(Self::ENV_DEVICE) {
            Ok(value) => value
                .parse()
                .map_err(|reason| ConfigError::InvalidDevice { value, reason }),
            Err(_) => Ok(default),
        }
    }

    fn parse_top_k_from_env(default: usize) -> Result<usize, ConfigError> {
        match env::var(Self::ENV_TOP_K) {
            Ok(value) => match value.trim().parse::<usize>() {
                Ok(top_k) if top_k > 0 => Ok(top_k),
                _ => Err(ConfigError::InvalidTopK { value }),
            },
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }
}

/// Comma-separated list, trimmed, empties dropped.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
