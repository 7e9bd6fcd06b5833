//! Authentication for netboot
//!
//! Decides whether a username/password pair may receive the boot menu,
//! using a local bcrypt credential store, an LDAP/AD directory, or both.

pub mod config;
pub mod decision;
pub mod escape;
pub mod ldap;
pub mod local;
pub mod router;
pub mod source;

#[cfg(test)]
mod testing;

pub use config::{AuthConfig, AuthMode};
pub use decision::{AuthDecision, Backend, DenyReason, FailureKind};
pub use escape::escape_filter_value;
pub use ldap::{BindMode, DirectoryAuthenticator, DirectoryCapability, LdapSettings};
pub use local::LocalCredentialStore;
pub use router::AuthRouter;
pub use source::{FileSnapshotSource, MemorySnapshotSource, SnapshotSource};
