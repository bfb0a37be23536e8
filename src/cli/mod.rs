//! Command-line interface definition

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::components::ComponentKind;
use crate::config::TlsMode;
use crate::credentials::HashAlgorithm;
use crate::error::{ConfigError, Result};

pub mod cache;
pub mod context;
pub mod poll;

pub use context::CommandContext;

/// Zabbix helper for HP MSA storage arrays.
///
/// Prints low-level discovery JSON, the health of one component, or detail
/// JSON for every component of a kind.
#[derive(Parser, Debug)]
#[command(name = "msa-monitor")]
#[command(version, about, long_about = None)]
#[command(group(ArgGroup::new("mode").args(["discovery", "get"])))]
pub struct Cli {
    /// Storage array DNS name or IP address (optionally with :port)
    #[arg(short, long, env = "MSA_HOST", hide_env = true)]
    pub msa: Option<String>,

    /// Component kind to query
    #[arg(short, long, env = "MSA_COMPONENT", hide_env = true)]
    pub component: Option<ComponentKind>,

    /// Print low-level discovery JSON
    #[arg(short, long)]
    pub discovery: bool,

    /// Print the health of one item, or detail JSON for 'all'.
    ///
    /// Controller detail nests compact-flash health as "flash": {"health": ...}
    /// instead of a flat "cf_health" key; Zabbix templates reading
    /// "cf_health" need their JSONPath updated.
    #[arg(short, long, value_name = "ID|all")]
    pub get: Option<String>,

    /// MSA user name [default: monitor]
    #[arg(short, long, env = "MSA_USER", hide_env = true)]
    pub user: Option<String>,

    /// MSA password [default: !monitor]
    #[arg(short, long, env = "MSA_PASSWORD", hide_env = true)]
    pub password: Option<String>,

    /// File holding 'login_password' or a ready login hash on its first line
    #[arg(
        short = 'f',
        long,
        env = "MSA_LOGIN_FILE",
        hide_env = true,
        conflicts_with_all = ["user", "password"]
    )]
    pub login_file: Option<PathBuf>,

    /// Talk HTTPS: 'verify' checks the certificate, 'direct' does not
    #[arg(long, env = "MSA_HTTPS", hide_env = true)]
    pub https: Option<TlsMode>,

    /// PEM bundle used to verify the array certificate
    #[arg(long, env = "MSA_CA_BUNDLE", hide_env = true)]
    pub ca_bundle: Option<PathBuf>,

    /// Login hash algorithm [default: md5]
    #[arg(long, env = "MSA_HASH", hide_env = true)]
    pub hash: Option<HashAlgorithm>,

    /// Write the raw XML of the data response to this file
    #[arg(long, env = "MSA_SAVE_XML", hide_env = true)]
    pub save_xml: Option<PathBuf>,

    /// Print all cached session keys and exit
    #[arg(long, conflicts_with = "mode")]
    pub show_cache: bool,

    /// Bypass the session cache
    #[arg(long, env = "MSA_NO_CACHE", hide_env = true)]
    pub no_cache: bool,

    /// Directory holding the session cache database
    #[arg(long, env = "MSA_CACHE_DIR", hide_env = true)]
    pub cache_dir: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, env = "MSA_TIMEOUT", hide_env = true)]
    pub timeout: Option<u64>,

    /// Override config file location
    #[arg(long, env = "MSA_CONFIG", hide_env = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(long, env = "MSA_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// What one invocation does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    ShowCache,
    Poll(Poll),
}

/// Request sent to the array by one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll {
    Discovery,
    Detail,
    Health(String),
}

impl Cli {
    /// Selected action; `--show-cache` wins over the poll modes.
    pub fn action(&self) -> Result<Action> {
        if self.show_cache {
            return Ok(Action::ShowCache);
        }
        if self.discovery {
            return Ok(Action::Poll(Poll::Discovery));
        }
        match self.get.as_deref() {
            Some("all") => Ok(Action::Poll(Poll::Detail)),
            Some(item) => Ok(Action::Poll(Poll::Health(item.to_string()))),
            None => Err(ConfigError::MissingArgument("-d|--discovery or -g|--get").into()),
        }
    }
}
