//! LDAP/Active Directory settings
//!
//! Supports:
//! - direct_bind: DN built from `user_dn_pattern`
//! - search_bind: service account bind, user search, user bind
//! - LDAPS and STARTTLS connections

use netboot_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::escape::fill_username_template;

/// Default port for `ldap://`
pub const LDAP_PORT: u16 = 389;

/// Default port for `ldaps://`
pub const LDAPS_PORT: u16 = 636;

const USERNAME_PLACEHOLDER: &str = "{username}";

// ============================================================================
// LDAP Settings
// ============================================================================

/// The `ldap` section of the authentication document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdapSettings {
    /// Server URI or bare host name
    /// Example: "ldaps://dc.example.com" or "ldap.example.com"
    pub server: String,

    /// Port; defaults to 636 with SSL and 389 without
    #[serde(default)]
    pub port: Option<u16>,

    /// Defaults to true for `ldaps://` URIs
    #[serde(default)]
    pub use_ssl: Option<bool>,

    #[serde(default)]
    pub bind_mode: BindMode,

    /// DN template for direct_bind
    /// Example: "uid={username},ou=people,dc=example,dc=com"
    #[serde(default)]
    pub user_dn_pattern: Option<String>,

    /// Service account for search_bind
    #[serde(default)]
    pub service_account: Option<ServiceAccount>,

    /// Base DN for user searches
    #[serde(default)]
    pub search_base: Option<String>,

    /// User search filter
    /// Example: "(uid={username})" or "(sAMAccountName={username})"
    #[serde(default)]
    pub search_filter: Option<String>,

    /// Connection timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Upgrade plain connections with STARTTLS
    #[serde(default)]
    pub start_tls: bool,
}

fn default_timeout() -> u64 {
    10
}

impl LdapSettings {
    pub fn new(server: impl Into<String>, bind_mode: BindMode) -> Self {
        Self {
            server: server.into(),
            port: None,
            use_ssl: None,
            bind_mode,
            user_dn_pattern: None,
            service_account: None,
            search_base: None,
            search_filter: None,
            timeout_seconds: default_timeout(),
            start_tls: false,
        }
    }

    pub fn use_ssl(&self) -> bool {
        self.use_ssl
            .unwrap_or_else(|| self.server.trim().to_ascii_lowercase().starts_with("ldaps://"))
    }

    /// Resolve the connection target
    pub fn endpoint(&self) -> Result<DirectoryEndpoint> {
        let server = self.server.trim();
        if server.is_empty() {
            return Err(Error::config("ldap.server is required"));
        }

        let (host, uri_port) = if server.contains("://") {
            let parsed = Url::parse(server)
                .map_err(|e| Error::config(format!("invalid ldap.server '{}': {}", server, e)))?;
            if !matches!(parsed.scheme(), "ldap" | "ldaps") {
                return Err(Error::config(format!(
                    "ldap.server must use ldap:// or ldaps://, got '{}'",
                    server
                )));
            }
            let host = parsed
                .host_str()
                .filter(|h| !h.is_empty())
                .ok_or_else(|| Error::config(format!("ldap.server '{}' has no host", server)))?
                .to_string();
            (host, parsed.port())
        } else {
            (server.to_string(), None)
        };

        let use_ssl = self.use_ssl();
        let (scheme, default_port) = if use_ssl {
            ("ldaps", LDAPS_PORT)
        } else {
            ("ldap", LDAP_PORT)
        };
        let port = self.port.or(uri_port).unwrap_or(default_port);

        let url = Url::parse(&format!("{}://{}:{}", scheme, host, port))
            .map_err(|e| Error::config(format!("invalid ldap.server '{}': {}", server, e)))?;

        Ok(DirectoryEndpoint {
            url,
            timeout: Duration::from_secs(self.timeout_seconds),
            start_tls: self.start_tls && !use_ssl,
        })
    }

    /// DN for direct_bind with the escaped username substituted
    pub fn user_dn(&self, username: &str) -> Result<String> {
        let pattern = required_template(&self.user_dn_pattern, "ldap.user_dn_pattern")?;
        Ok(fill_username_template(pattern, username))
    }

    pub fn service_account(&self) -> Result<&ServiceAccount> {
        let account = self
            .service_account
            .as_ref()
            .ok_or_else(|| Error::config("ldap.service_account is required for search_bind"))?;
        if account.bind_dn.is_empty() {
            return Err(Error::config("ldap.service_account.bind_dn is required"));
        }
        Ok(account)
    }

    /// User search for search_bind with the escaped username substituted
    pub fn user_search(&self, username: &str) -> Result<UserSearch> {
        let base = self
            .search_base
            .as_deref()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| Error::config("ldap.search_base is required for search_bind"))?;
        let filter = required_template(&self.search_filter, "ldap.search_filter")?;

        Ok(UserSearch {
            base: base.to_string(),
            filter: fill_username_template(filter, username),
        })
    }

    /// Check that everything the configured bind mode needs is present
    pub fn validate(&self) -> Result<()> {
        self.endpoint()?;
        match &self.bind_mode {
            BindMode::DirectBind => {
                required_template(&self.user_dn_pattern, "ldap.user_dn_pattern")?;
            }
            BindMode::SearchBind => {
                self.service_account()?;
                self.user_search("")?;
            }
            BindMode::Unknown(_) => {}
        }
        Ok(())
    }
}

fn required_template<'a>(template: &'a Option<String>, key: &str) -> Result<&'a str> {
    let template = template
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::config(format!("{} is required", key)))?;
    if !template.contains(USERNAME_PLACEHOLDER) {
        return Err(Error::config(format!(
            "{} must contain {} placeholder",
            key, USERNAME_PLACEHOLDER
        )));
    }
    Ok(template)
}

/// LDAP bind protocol
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BindMode {
    DirectBind,
    #[default]
    SearchBind,
    Unknown(String),
}

impl From<String> for BindMode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "direct_bind" => BindMode::DirectBind,
            "search_bind" => BindMode::SearchBind,
            _ => BindMode::Unknown(value),
        }
    }
}

impl From<BindMode> for String {
    fn from(mode: BindMode) -> Self {
        mode.to_string()
    }
}

impl fmt::Display for BindMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindMode::DirectBind => f.write_str("direct_bind"),
            BindMode::SearchBind => f.write_str("search_bind"),
            BindMode::Unknown(other) => f.write_str(other),
        }
    }
}

/// Service account used for the search step of search_bind
#[derive(Clone, Serialize, Deserialize)]
pub struct ServiceAccount {
    pub bind_dn: String,
    #[serde(default)]
    pub bind_password: String,
}

impl fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("bind_dn", &self.bind_dn)
            .field("bind_password", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Connection inputs
// ============================================================================

/// Where and how to connect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEndpoint {
    pub url: Url,
    pub timeout: Duration,
    pub start_tls: bool,
}

/// Subtree search for a user entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSearch {
    pub base: String,
    pub filter: String,
}
