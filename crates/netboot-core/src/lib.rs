//! Netboot Core Library
//!
//! Shared error type, service configuration and credential-store records
//! for the netboot authentication service.

pub mod config;
pub mod error;
pub mod types;

pub use config::ServiceConfig;
pub use error::{Error, Result};

/// Netboot auth version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default listener port
pub const DEFAULT_PORT: u16 = 8081;

/// Default authentication configuration path
pub const DEFAULT_AUTH_CONFIG_PATH: &str = "/etc/netboot/auth.yml";

/// Default local credential store path
pub const DEFAULT_USERS_PATH: &str = "/etc/netboot/users.yml";

/// Default iPXE menu path
pub const DEFAULT_MENU_PATH: &str = "/srv/ipxe/menu.ipxe";
