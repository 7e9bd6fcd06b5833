//! Configuration for netboot auth
//!
//! `ServiceConfig` holds the process-level settings (listener, file
//! locations, logging). The authentication documents themselves are not
//! part of it: they are re-read on every attempt from the paths it names.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("NETBOOT_BIND_ADDRESS") {
            config.server.bind_address = addr;
        }
        if let Ok(port) = std::env::var("NETBOOT_PORT") {
            if let Ok(p) = port.parse() {
                config.server.port = p;
            }
        }
        if let Ok(path) = std::env::var("AUTH_CONFIG_PATH") {
            config.paths.auth_config = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("AUTH_USERS_PATH") {
            config.paths.users = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("IPXE_MENU_PATH") {
            config.paths.menu = PathBuf::from(path);
        }
        if let Ok(level) = std::env::var("NETBOOT_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("NETBOOT_LOG_FORMAT") {
            config.logging.format = format;
        }

        config
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: crate::DEFAULT_PORT,
        }
    }
}

/// Locations of the externally managed files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Authentication mode and LDAP settings (YAML)
    pub auth_config: PathBuf,
    /// Local credential store (YAML)
    pub users: PathBuf,
    /// iPXE menu served after a successful check
    pub menu: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            auth_config: PathBuf::from(crate::DEFAULT_AUTH_CONFIG_PATH),
            users: PathBuf::from(crate::DEFAULT_USERS_PATH),
            menu: PathBuf::from(crate::DEFAULT_MENU_PATH),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Read and deserialize a YAML document.
///
/// An unreadable file and an unparseable document are both errors. An empty
/// or null document is `Ok(None)`.
pub fn read_yaml_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    parse_yaml_document(&content).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a YAML document that may be empty
pub fn parse_yaml_document<T: DeserializeOwned>(
    content: &str,
) -> std::result::Result<Option<T>, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(None);
    }
    serde_yaml::from_str(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_deployment_layout() {
        let config = ServiceConfig::default();

        assert_eq!(config.listen_address(), "0.0.0.0:8081");
        assert_eq!(config.paths.auth_config, PathBuf::from("/etc/netboot/auth.yml"));
        assert_eq!(config.paths.users, PathBuf::from("/etc/netboot/users.yml"));
        assert_eq!(config.paths.menu, PathBuf::from("/srv/ipxe/menu.ipxe"));
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_missing_document_is_read_error() {
        let result: Result<Option<serde_yaml::Value>> =
            read_yaml_document(Path::new("/nonexistent/netboot/auth.yml"));

        assert!(matches!(result, Err(Error::ConfigRead { .. })));
    }

    #[test]
    fn test_empty_document_is_none() {
        let parsed: Option<LoggingConfig> = parse_yaml_document("  \n").unwrap();
        assert!(parsed.is_none());

        let parsed: Option<LoggingConfig> = parse_yaml_document("~\n").unwrap();
        assert!(parsed.is_none());

        let parsed: Option<LoggingConfig> =
            parse_yaml_document("level: debug\nformat: json\n").unwrap();
        assert_eq!(parsed.unwrap().format, "json");
    }
}
