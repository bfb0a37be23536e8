//! Command execution context
//!
//! Merges command-line flags with the optional config file into the values
//! one invocation needs: where the array is, how to reach it, and which
//! login hash to present.

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::Cli;
use crate::components::ComponentKind;
use crate::config::{ClientConfig, Config, Transport};
use crate::credentials::{self, HashAlgorithm};
use crate::error::{ConfigError, Result};

const DEFAULT_USER: &str = "monitor";
const DEFAULT_PASSWORD: &str = "!monitor";

/// Everything a poll needs, resolved once per invocation.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// `--msa` value, not yet resolved
    pub address: String,
    pub kind: ComponentKind,
    pub credential_hash: String,
    pub client: ClientConfig,
    pub save_xml: Option<PathBuf>,
}

impl CommandContext {
    /// Build the poll context. Flags win over the config file, which wins
    /// over built-in defaults.
    pub fn new(cli: &Cli, config: &Config) -> Result<Self> {
        let address = cli
            .msa
            .clone()
            .filter(|m| !m.trim().is_empty())
            .ok_or(ConfigError::MissingArgument("-m|--msa"))?;
        let kind = cli
            .component
            .ok_or(ConfigError::MissingArgument("-c|--component"))?;

        Ok(Self {
            address,
            kind,
            credential_hash: credential_hash(cli, config)?,
            client: client_config(cli, config),
            save_xml: cli.save_xml.clone(),
        })
    }
}

/// Login hash from explicit user/password, a login file, or the defaults.
fn credential_hash(cli: &Cli, config: &Config) -> Result<String> {
    let algorithm: HashAlgorithm = cli.hash.or(config.hash).unwrap_or_default();
    let explicit = cli.user.is_some() || cli.password.is_some();

    if !explicit && let Some(path) = cli.login_file.as_ref().or(config.login_file.as_ref()) {
        log::debug!("Reading credentials from {}", path.display());
        return credentials::hash_from_file(path, algorithm);
    }

    let user = cli
        .user
        .as_deref()
        .or(config.user.as_deref())
        .unwrap_or(DEFAULT_USER);
    let password = cli.password.as_deref().unwrap_or(DEFAULT_PASSWORD);
    Ok(credentials::hash_login(user, password, algorithm))
}

/// Transport and cache settings shared by the `--show-cache` path and polls.
pub fn client_config(cli: &Cli, config: &Config) -> ClientConfig {
    let ca_bundle = cli.ca_bundle.clone().or_else(|| config.ca_bundle.clone());
    let transport = Transport::from_mode(cli.https.or(config.https), ca_bundle);

    ClientConfig {
        transport,
        use_cache: !cli.no_cache,
        cache_dir: cli
            .cache_dir
            .clone()
            .or_else(|| config.cache_dir.clone())
            .unwrap_or_else(ClientConfig::default_cache_dir),
        timeout: cli
            .timeout
            .or(config.timeout_secs)
            .map(Duration::from_secs),
    }
}
