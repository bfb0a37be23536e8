//! Storage array address resolution

use std::net::IpAddr;

use crate::error::{ApiError, ConfigError, Result};

/// Port used only for name resolution when the address carries none
const DEFAULT_PORT: u16 = 80;

/// Address of one storage array controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageHost {
    /// `host[:port]` as used in request URLs
    authority: String,
    dns_name: String,
    ip: IpAddr,
}

impl StorageHost {
    pub fn new(authority: impl Into<String>, dns_name: impl Into<String>, ip: IpAddr) -> Self {
        Self {
            authority: authority.into(),
            dns_name: dns_name.into(),
            ip,
        }
    }

    /// Resolve a `--msa` value (DNS name or IP, optional `:port`).
    ///
    /// The first resolved address is used; a name that does not resolve is a
    /// transport error.
    pub async fn resolve(address: &str) -> Result<Self> {
        let authority = address.trim().trim_end_matches('/');
        if authority.is_empty() {
            return Err(ConfigError::MissingArgument("-m|--msa").into());
        }

        let url = reqwest::Url::parse(&format!("http://{}", authority)).map_err(|e| {
            ConfigError::Invalid(format!("invalid storage address '{}': {}", authority, e))
        })?;
        let host = url.host_str().ok_or_else(|| {
            ConfigError::Invalid(format!("invalid storage address '{}'", authority))
        })?;
        let dns_name = host.trim_start_matches('[').trim_end_matches(']');

        let ip = match dns_name.parse::<IpAddr>() {
            Ok(ip) => ip,
            Err(_) => {
                let port = url.port().unwrap_or(DEFAULT_PORT);
                let mut addrs = tokio::net::lookup_host((dns_name, port)).await.map_err(|e| {
                    ApiError::Network {
                        url: dns_name.to_string(),
                        reason: format!("name resolution failed: {}", e),
                    }
                })?;
                addrs
                    .next()
                    .map(|addr| addr.ip())
                    .ok_or_else(|| ApiError::Network {
                        url: dns_name.to_string(),
                        reason: "name resolved to no addresses".to_string(),
                    })?
            }
        };

        log::debug!("Storage {} resolved to {}", dns_name, ip);
        Ok(Self::new(authority, dns_name, ip))
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn dns_name(&self) -> &str {
        &self.dns_name
    }

    /// Resolved address as text, as stored in the session cache
    pub fn ip(&self) -> String {
        self.ip.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[tokio::test]
    async fn test_resolve_ipv4_literal() {
        let host = StorageHost::resolve("10.0.0.5").await.unwrap();
        assert_eq!(host.dns_name(), "10.0.0.5");
        assert_eq!(host.ip(), "10.0.0.5");
        assert_eq!(host.authority(), "10.0.0.5");
    }

    #[tokio::test]
    async fn test_resolve_keeps_port_in_authority() {
        let host = StorageHost::resolve("127.0.0.1:8080").await.unwrap();
        assert_eq!(host.authority(), "127.0.0.1:8080");
        assert_eq!(host.dns_name(), "127.0.0.1");
        assert_eq!(
            host,
            StorageHost::new(
                "127.0.0.1:8080",
                "127.0.0.1",
                IpAddr::V4(Ipv4Addr::LOCALHOST)
            )
        );
    }

    #[tokio::test]
    async fn test_resolve_ipv6_literal() {
        let host = StorageHost::resolve("[::1]").await.unwrap();
        assert_eq!(host.dns_name(), "::1");
        assert_eq!(host.ip(), Ipv6Addr::LOCALHOST.to_string());
    }

    #[tokio::test]
    async fn test_resolve_localhost_name() {
        let host = StorageHost::resolve("localhost").await.unwrap();
        assert_eq!(host.dns_name(), "localhost");
        assert!(host.ip.is_loopback());
    }

    #[tokio::test]
    async fn test_resolve_empty_is_config_error() {
        assert!(matches!(
            StorageHost::resolve("  ").await,
            Err(Error::Config(ConfigError::MissingArgument(_)))
        ));
    }

    #[tokio::test]
    async fn test_unresolvable_name_is_network_error() {
        assert!(matches!(
            StorageHost::resolve("msa.invalid").await,
            Err(Error::Api(ApiError::Network { .. }))
        ));
    }
}
