//! Error types for netboot auth
//!
//! Only conditions that make an authentication attempt impossible to
//! evaluate are errors. Credential failures, unavailable backends and
//! unknown modes are ordinary denials and never surface here.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::ConfigRead { .. } => "ConfigUnreadable",
            Error::ConfigParse { .. } => "ConfigMalformed",
            Error::Config(_) => "ConfigInvalid",
            Error::InternalError(_) | Error::Io(_) => "InternalError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_names_path() {
        let err = Error::ConfigRead {
            path: PathBuf::from("/etc/netboot/auth.yml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };

        assert!(err.to_string().contains("/etc/netboot/auth.yml"));
        assert_eq!(err.code(), "ConfigUnreadable");
    }

    #[test]
    fn test_config_helper() {
        let err = Error::config("ldap.server is required");
        assert_eq!(err.to_string(), "configuration error: ldap.server is required");
    }
}
