//! LDAP/Active Directory authentication module
//!
//! Provides network-boot authentication via:
//! - LDAP (OpenLDAP, 389 Directory Server)
//! - Microsoft Active Directory
//!
//! Features:
//! - direct_bind and search_bind protocols
//! - Filter escaping of every user-supplied value
//! - TLS/STARTTLS support

mod authenticator;
#[cfg(feature = "ldap")]
mod client;
mod connector;
mod types;

pub use authenticator::DirectoryAuthenticator;
#[cfg(feature = "ldap")]
pub use client::Ldap3Connector;
pub use connector::{
    check_bind_result, DirectoryCapability, DirectoryConnector, DirectoryError, DirectorySession,
    RC_INVALID_CREDENTIALS, RC_NO_SUCH_OBJECT,
};
pub use types::*;
