//! The authentication document (`auth.yml`)
//!
//! ```yaml
//! mode: both            # local | ldap | both
//! ldap:
//!   server: ldaps://dc.example.com
//!   bind_mode: search_bind
//!   ...
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ldap::LdapSettings;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,

    #[serde(default)]
    pub ldap: Option<LdapSettings>,
}

/// Backend selection.
///
/// Unrecognised values are kept rather than rejected at parse time so that
/// the router can deny them as a decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuthMode {
    #[default]
    Local,
    Ldap,
    /// Local first, LDAP when local denies
    Both,
    Unknown(String),
}

impl From<String> for AuthMode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "local" => AuthMode::Local,
            "ldap" => AuthMode::Ldap,
            "both" => AuthMode::Both,
            _ => AuthMode::Unknown(value),
        }
    }
}

impl From<AuthMode> for String {
    fn from(mode: AuthMode) -> Self {
        mode.to_string()
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Local => f.write_str("local"),
            AuthMode::Ldap => f.write_str("ldap"),
            AuthMode::Both => f.write_str("both"),
            AuthMode::Unknown(other) => f.write_str(other),
        }
    }
}
