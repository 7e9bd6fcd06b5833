//! Directory client capability
//!
//! The authenticator talks to the directory only through these traits.
//! Whether a real client exists is decided at compile time by the `ldap`
//! feature and reported as [`DirectoryCapability::Unavailable`].

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::ldap::types::{DirectoryEndpoint, UserSearch};

/// LDAP result code for noSuchObject
pub const RC_NO_SUCH_OBJECT: u32 = 32;

/// LDAP result code for invalidCredentials
pub const RC_INVALID_CREDENTIALS: u32 = 49;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    /// The server refused the credentials
    #[error("bind rejected with result code {0}")]
    BindRejected(u32),

    /// The server could not process the bind (busy, unavailable, unwilling)
    #[error("bind not processed, result code {0}")]
    BindNotProcessed(u32),

    #[error("directory unreachable: {0}")]
    Unreachable(String),

    #[error("search failed: {0}")]
    Search(String),
}

/// Classify a simple-bind result code.
///
/// Only invalidCredentials and noSuchObject say anything about the
/// credentials; every other non-zero code is a directory condition.
pub fn check_bind_result(rc: u32) -> Result<(), DirectoryError> {
    match rc {
        0 => Ok(()),
        RC_INVALID_CREDENTIALS | RC_NO_SUCH_OBJECT => Err(DirectoryError::BindRejected(rc)),
        other => Err(DirectoryError::BindNotProcessed(other)),
    }
}

/// Opens authenticated connections
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    /// Connect and simple-bind as `dn`. The session is only returned when
    /// the bind succeeded.
    async fn bind(
        &self,
        endpoint: &DirectoryEndpoint,
        dn: &str,
        password: &str,
    ) -> Result<Box<dyn DirectorySession>, DirectoryError>;
}

/// An authenticated connection. Callers must `unbind` before dropping it.
#[async_trait]
pub trait DirectorySession: Send {
    /// Subtree search returning the DNs of matching entries in server order
    async fn search_dns(&mut self, search: &UserSearch) -> Result<Vec<String>, DirectoryError>;

    async fn unbind(&mut self);
}

/// Whether a directory client is present in this build
#[derive(Clone)]
pub enum DirectoryCapability {
    Available(Arc<dyn DirectoryConnector>),
    Unavailable,
}

impl DirectoryCapability {
    /// The client compiled into this build
    pub fn detect() -> Self {
        #[cfg(feature = "ldap")]
        {
            DirectoryCapability::Available(Arc::new(crate::ldap::client::Ldap3Connector::new()))
        }
        #[cfg(not(feature = "ldap"))]
        {
            DirectoryCapability::Unavailable
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, DirectoryCapability::Available(_))
    }
}

impl std::fmt::Debug for DirectoryCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectoryCapability::Available(_) => f.write_str("DirectoryCapability::Available"),
            DirectoryCapability::Unavailable => f.write_str("DirectoryCapability::Unavailable"),
        }
    }
}
