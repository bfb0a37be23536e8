//! HP MSA XML API client implementation

use async_trait::async_trait;
use reqwest::{Certificate, Client as HttpClient, Url};

use super::{Envelope, LoginOutcome, MsaApi, RawResponse, StorageHost};
use crate::config::{ClientConfig, Protocol, Transport};
use crate::error::{ApiError, ConfigError, Result};

/// Header carrying the session key on data requests
const SESSION_HEADER: &str = "sessionKey";

/// Login return code: session key in the response message
const LOGIN_OK: &str = "1";

/// Login return code: credentials rejected
const LOGIN_REJECTED: &str = "2";

/// MSA API client bound to one array
pub struct MsaClient {
    http: HttpClient,
    host: StorageHost,
    protocol: Protocol,
    base_url: Url,
}

impl MsaClient {
    /// Create a client for `host` using the transport settings in `config`
    pub fn new(host: StorageHost, config: &ClientConfig) -> Result<Self> {
        let mut builder = HttpClient::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        match &config.transport {
            Transport::Http => {}
            Transport::HttpsVerify { ca_bundle } => {
                if let Some(path) = ca_bundle {
                    let pem = std::fs::read(path).map_err(|e| {
                        ConfigError::Invalid(format!(
                            "cannot read CA bundle {}: {}",
                            path.display(),
                            e
                        ))
                    })?;
                    let certs = Certificate::from_pem_bundle(&pem).map_err(|e| {
                        ConfigError::Invalid(format!("invalid CA bundle {}: {}", path.display(), e))
                    })?;
                    for cert in certs {
                        builder = builder.add_root_certificate(cert);
                    }
                }
            }
            Transport::HttpsInsecure => {
                log::debug!("TLS certificate verification disabled");
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        let http = builder.build().map_err(|e| ApiError::Network {
            url: host.authority().to_string(),
            reason: format!("cannot build HTTP client: {}", e),
        })?;

        let protocol = config.transport.protocol();
        let base = format!("{}://{}/api", protocol.as_str(), host.authority());
        let base_url = Url::parse(&base)
            .map_err(|e| ConfigError::Invalid(format!("invalid array address {}: {}", base, e)))?;

        Ok(Self {
            http,
            host,
            protocol,
            base_url,
        })
    }

    /// `/api` URL extended by `segments`, each percent-encoded on its own
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ConfigError::Invalid(format!("{} cannot carry a path", self.base_url)))?
            .extend(segments);
        Ok(url)
    }

    /// GET `url`, returning the raw body. `shown_url` is used in errors.
    async fn get(&self, url: &str, shown_url: &str, session_key: Option<&str>) -> Result<Vec<u8>> {
        let mut request = self.http.get(url);
        if let Some(key) = session_key {
            request = request.header(SESSION_HEADER, key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::network(shown_url, e))?;

        let status = response.status();
        log::debug!("GET {} -> {}", shown_url, status);
        if !status.is_success() {
            log::warn!("{} answered with HTTP {}", shown_url, status);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::network(shown_url, e))?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl MsaApi for MsaClient {
    fn host(&self) -> &StorageHost {
        &self.host
    }

    fn protocol(&self) -> Protocol {
        self.protocol
    }

    async fn login(&self, credential_hash: &str) -> Result<LoginOutcome> {
        let url = self.endpoint(&["login", credential_hash])?;
        let shown_url = format!("{}/login/<hash>", self.base_url);

        let body = self.get(url.as_str(), &shown_url, None).await?;
        let envelope = Envelope::parse(&body)?;

        match envelope.return_code() {
            LOGIN_OK => Ok(LoginOutcome::Session(envelope.message().to_string())),
            LOGIN_REJECTED => {
                log::debug!("Login rejected by {}", self.host.dns_name());
                Ok(LoginOutcome::Rejected)
            }
            code => Err(ApiError::UnexpectedReturnCode {
                code: code.to_string(),
                message: envelope.message().to_string(),
            }
            .into()),
        }
    }

    async fn request(&self, path: &[&str], session_key: &str) -> Result<RawResponse> {
        let url = self.endpoint(path)?;

        let body = self.get(url.as_str(), url.as_str(), Some(session_key)).await?;
        let envelope = Envelope::parse(&body)?;

        Ok(RawResponse { body, envelope })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::fixtures;
    use crate::error::Error;
    use mockito::Server;
    use std::path::PathBuf;

    fn login_body(code: &str, message: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<RESPONSE VERSION="L100">
  <OBJECT basetype="status" name="status" oid="1">
    <PROPERTY name="response-type" type="string">Success</PROPERTY>
    <PROPERTY name="response" type="string">{}</PROPERTY>
    <PROPERTY name="return-code" type="sint32">{}</PROPERTY>
  </OBJECT>
</RESPONSE>"#,
            message, code
        )
    }

    async fn client_for(server: &Server) -> MsaClient {
        let host = StorageHost::resolve(&server.host_with_port()).await.unwrap();
        MsaClient::new(host, &ClientConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_login_returns_session_key() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/login/abc123")
            .with_status(200)
            .with_body(login_body("1", "TOKEN123"))
            .create_async()
            .await;

        let client = client_for(&server).await;
        let outcome = client.login("abc123").await.unwrap();

        assert_eq!(outcome, LoginOutcome::Session("TOKEN123".to_string()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/login/bad")
            .with_body(login_body("2", "Authentication Unsuccessful"))
            .create_async()
            .await;

        let client = client_for(&server).await;
        assert_eq!(client.login("bad").await.unwrap(), LoginOutcome::Rejected);
    }

    #[tokio::test]
    async fn test_login_unexpected_code() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/login/odd")
            .with_body(login_body("-1", "Something else"))
            .create_async()
            .await;

        let client = client_for(&server).await;
        assert!(matches!(
            client.login("odd").await,
            Err(Error::Api(ApiError::UnexpectedReturnCode { .. }))
        ));
    }

    #[tokio::test]
    async fn test_request_sends_session_header() {
        let mut server = Server::new_async().await;
        let body = fixtures::response(fixtures::VDISKS);
        let mock = server
            .mock("GET", "/api/show/vdisks")
            .match_header("sessionKey", "TOKEN123")
            .with_body(&body)
            .create_async()
            .await;

        let client = client_for(&server).await;
        let response = client.request(&["show", "vdisks"], "TOKEN123").await.unwrap();

        assert_eq!(response.body, body.as_bytes());
        assert!(response.envelope.is_success());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_item_with_reserved_characters_stays_one_segment() {
        let mut server = Server::new_async().await;
        let body = fixtures::response(fixtures::VDISKS);
        let mock = server
            .mock("GET", "/api/show/vdisks/vd%231%2Fa%3Fb")
            .match_header("sessionKey", "TOKEN123")
            .with_body(&body)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server).await;
        let path = crate::components::ComponentKind::Vdisks.health_path("vd#1/a?b");
        let response = client.request(&path, "TOKEN123").await.unwrap();

        assert!(response.envelope.is_success());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_request_with_garbage_body_is_parse_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/show/disks")
            .with_status(500)
            .with_body("Internal Server Error")
            .create_async()
            .await;

        let client = client_for(&server).await;
        assert!(matches!(
            client.request(&["show", "disks"], "TOKEN123").await,
            Err(Error::Api(ApiError::Parse(_)))
        ));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Bind and drop a listener to get a port nobody listens on
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let host = StorageHost::resolve(&format!("127.0.0.1:{}", port))
            .await
            .unwrap();
        let client = MsaClient::new(host, &ClientConfig::default()).unwrap();

        match client.login("abc").await {
            Err(Error::Api(ApiError::Network { url, .. })) => {
                assert!(url.ends_with("/api/login/<hash>"));
            }
            other => panic!("Expected Network error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_login_error_reason_hides_hash() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/login/0123abcd")
            .with_status(302)
            .with_header("location", "/api/login/0123abcd")
            .create_async()
            .await;

        let client = client_for(&server).await;
        match client.login("0123abcd").await {
            Err(Error::Api(ApiError::Network { url, reason })) => {
                assert!(url.ends_with("/api/login/<hash>"));
                assert!(!reason.contains("0123abcd"), "reason leaks hash: {}", reason);
            }
            other => panic!("Expected Network error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_https_base_url() {
        let host = StorageHost::resolve("10.0.0.5").await.unwrap();
        let config = ClientConfig {
            transport: Transport::HttpsInsecure,
            ..ClientConfig::default()
        };
        let client = MsaClient::new(host, &config).unwrap();

        assert_eq!(client.base_url.as_str(), "https://10.0.0.5/api");
        assert_eq!(client.protocol(), Protocol::Https);
    }

    #[tokio::test]
    async fn test_missing_ca_bundle_is_config_error() {
        let host = StorageHost::resolve("10.0.0.5").await.unwrap();
        let config = ClientConfig {
            transport: Transport::HttpsVerify {
                ca_bundle: Some(PathBuf::from("/nonexistent/ca.pem")),
            },
            ..ClientConfig::default()
        };

        assert!(matches!(
            MsaClient::new(host, &config),
            Err(Error::Config(ConfigError::Invalid(_)))
        ));
    }
}
