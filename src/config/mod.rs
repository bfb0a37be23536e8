//! Configuration management for msa-monitor
//!
//! Settings come from three layers: command-line flags (with `MSA_*`
//! environment fallbacks), an optional YAML file, and built-in defaults.
//! The result is a [`ClientConfig`] value handed to the API client and the
//! session cache; nothing is kept in global state.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::credentials::HashAlgorithm;
use crate::error::{ConfigError, Result};

/// Directory name used below the platform config and temp directories
const APP_DIR: &str = "msa-monitor";

/// Optional YAML defaults file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// MSA user name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// File holding `login_password` or a ready login hash
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_file: Option<PathBuf>,

    /// HTTPS mode; plain HTTP when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https: Option<TlsMode>,

    /// PEM bundle used to verify the array certificate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_bundle: Option<PathBuf>,

    /// Login hash algorithm
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<HashAlgorithm>,

    /// Directory holding the session cache database
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.yaml"))
    }

    /// Load configuration from an explicit path or the default location.
    ///
    /// A missing default file yields the built-in defaults; a missing
    /// explicit file is an error.
    pub fn load_at(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::Invalid(format!(
                        "config file not found: {}",
                        path.display()
                    ))
                    .into());
                }
                Self::load_from(path)
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// HTTPS flavour selected with `--https`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TlsMode {
    /// Verify the array certificate
    Verify,
    /// Skip certificate verification
    Direct,
}

/// URL scheme, also part of the session cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http,
    Https,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

/// How the array is reached, fixed for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Http,
    HttpsVerify { ca_bundle: Option<PathBuf> },
    HttpsInsecure,
}

impl Transport {
    /// Build from the `--https` mode and optional CA bundle
    pub fn from_mode(mode: Option<TlsMode>, ca_bundle: Option<PathBuf>) -> Self {
        match mode {
            None => Transport::Http,
            Some(TlsMode::Verify) => Transport::HttpsVerify { ca_bundle },
            Some(TlsMode::Direct) => Transport::HttpsInsecure,
        }
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            Transport::Http => Protocol::Http,
            Transport::HttpsVerify { .. } | Transport::HttpsInsecure => Protocol::Https,
        }
    }
}

/// Settings shared by the API client and the session cache
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub transport: Transport,
    /// Reuse session tokens across invocations
    pub use_cache: bool,
    pub cache_dir: PathBuf,
    /// None keeps the HTTP client default
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Default cache directory under the platform temp dir
    pub fn default_cache_dir() -> PathBuf {
        std::env::temp_dir().join(APP_DIR)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Http,
            use_cache: true,
            cache_dir: Self::default_cache_dir(),
            timeout: None,
        }
    }
}
