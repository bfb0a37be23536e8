//! Login hash generation for the MSA `/api/login/<hash>` endpoint

use std::path::Path;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{ConfigError, Result};

/// Separator between login and password in the hashed string
const SEPARATOR: char = '_';

/// Digest used to build the login hash
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// MD5, accepted by every firmware
    #[default]
    Md5,
    /// SHA-256, accepted by newer firmware
    Sha256,
}

/// Hex-encoded digest of `login_password`.
pub fn hash_login(login: &str, password: &str, algorithm: HashAlgorithm) -> String {
    hash_joined(&format!("{}{}{}", login, SEPARATOR, password), algorithm)
}

fn hash_joined(joined: &str, algorithm: HashAlgorithm) -> String {
    match algorithm {
        HashAlgorithm::Md5 => format!("{:x}", Md5::digest(joined.as_bytes())),
        HashAlgorithm::Sha256 => format!("{:x}", Sha256::digest(joined.as_bytes())),
    }
}

/// Read a login hash from the first line of `path`.
///
/// A line containing the `_` separator is taken as `login_password` and
/// hashed; anything else is assumed to be a ready-made hash.
pub fn hash_from_file(path: &Path, algorithm: HashAlgorithm) -> Result<String> {
    if !path.exists() {
        return Err(ConfigError::CredentialsFile(path.display().to_string()).into());
    }

    let contents = std::fs::read_to_string(path)?;
    let line = contents.lines().next().unwrap_or("").trim();
    if line.is_empty() {
        return Err(ConfigError::EmptyCredentials(path.display().to_string()).into());
    }

    if line.contains(SEPARATOR) {
        Ok(hash_joined(line, algorithm))
    } else {
        Ok(line.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    #[test]
    fn test_hash_login_md5_known_value() {
        // md5("monitor_!monitor")
        assert_eq!(
            hash_login("monitor", "!monitor", HashAlgorithm::Md5),
            format!("{:x}", Md5::digest(b"monitor_!monitor"))
        );
        assert_eq!(hash_login("monitor", "!monitor", HashAlgorithm::Md5).len(), 32);
    }

    #[test]
    fn test_hash_login_deterministic() {
        let h1 = hash_login("manage", "secret", HashAlgorithm::Md5);
        let h2 = hash_login("manage", "secret", HashAlgorithm::Md5);
        assert_eq!(h1, h2);
        assert!(h1.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_hash_login_different_inputs() {
        let base = hash_login("manage", "secret", HashAlgorithm::Md5);
        assert_ne!(base, hash_login("manage", "secret2", HashAlgorithm::Md5));
        assert_ne!(base, hash_login("monitor", "secret", HashAlgorithm::Md5));
    }

    #[test]
    fn test_hash_login_sha256() {
        let hash = hash_login("manage", "secret", HashAlgorithm::Sha256);
        assert_eq!(hash.len(), 64);
        assert_ne!(hash, hash_login("manage", "secret", HashAlgorithm::Md5));
    }

    #[test]
    fn test_file_with_login_password_is_hashed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("msa.cred");
        std::fs::write(&path, "  manage_secret  \nignored\n").unwrap();

        assert_eq!(
            hash_from_file(&path, HashAlgorithm::Md5).unwrap(),
            hash_login("manage", "secret", HashAlgorithm::Md5)
        );
    }

    #[test]
    fn test_file_with_hash_is_reused() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("msa.hash");
        std::fs::write(&path, "0123456789abcdef0123456789abcdef\n").unwrap();

        assert_eq!(
            hash_from_file(&path, HashAlgorithm::Md5).unwrap(),
            "0123456789abcdef0123456789abcdef"
        );
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent");

        match hash_from_file(&path, HashAlgorithm::Md5) {
            Err(Error::Config(ConfigError::CredentialsFile(p))) => assert!(p.contains("absent")),
            other => panic!("Expected CredentialsFile error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty");
        std::fs::write(&path, "\n").unwrap();

        assert!(matches!(
            hash_from_file(&path, HashAlgorithm::Md5),
            Err(Error::Config(ConfigError::EmptyCredentials(_)))
        ));
    }
}
