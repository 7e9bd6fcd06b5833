//! Per-attempt snapshots of the externally managed documents
//!
//! Nothing is cached: each authentication attempt asks its source for a
//! fresh configuration and user list, so edits to the files take effect on
//! the next request.

use netboot_core::config::{read_yaml_document, PathsConfig};
use netboot_core::types::{UserEntry, UsersDocument};
use netboot_core::Result;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::config::AuthConfig;

/// Loads read-only snapshots of the authentication documents
pub trait SnapshotSource: Send + Sync {
    fn load_config(&self) -> Result<AuthConfig>;

    fn load_users(&self) -> Result<Vec<UserEntry>>;
}

/// Reads `auth.yml` and `users.yml` from disk on every call
#[derive(Debug, Clone)]
pub struct FileSnapshotSource {
    config_path: PathBuf,
    users_path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(config_path: impl Into<PathBuf>, users_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            users_path: users_path.into(),
        }
    }

    pub fn from_paths(paths: &PathsConfig) -> Self {
        Self::new(&paths.auth_config, &paths.users)
    }
}

impl SnapshotSource for FileSnapshotSource {
    fn load_config(&self) -> Result<AuthConfig> {
        let config = read_yaml_document::<AuthConfig>(&self.config_path)?;
        Ok(config.unwrap_or_default())
    }

    fn load_users(&self) -> Result<Vec<UserEntry>> {
        let document = read_yaml_document::<UsersDocument>(&self.users_path)?;
        Ok(document.map(|d| d.entries()).unwrap_or_default())
    }
}

/// Snapshots held in memory, replaceable at runtime
#[derive(Debug, Default)]
pub struct MemorySnapshotSource {
    config: RwLock<AuthConfig>,
    users: RwLock<Vec<UserEntry>>,
}

impl MemorySnapshotSource {
    pub fn new(config: AuthConfig, users: Vec<UserEntry>) -> Self {
        Self {
            config: RwLock::new(config),
            users: RwLock::new(users),
        }
    }

    pub fn set_config(&self, config: AuthConfig) {
        *self.config.write().unwrap_or_else(|e| e.into_inner()) = config;
    }

    pub fn set_users(&self, users: Vec<UserEntry>) {
        *self.users.write().unwrap_or_else(|e| e.into_inner()) = users;
    }
}

impl SnapshotSource for MemorySnapshotSource {
    fn load_config(&self) -> Result<AuthConfig> {
        Ok(self.config.read().unwrap_or_else(|e| e.into_inner()).clone())
    }

    fn load_users(&self) -> Result<Vec<UserEntry>> {
        Ok(self.users.read().unwrap_or_else(|e| e.into_inner()).clone())
    }
}
