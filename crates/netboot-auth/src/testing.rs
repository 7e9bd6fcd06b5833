//! In-memory fakes for unit tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use netboot_core::types::{UserEntry, UserRecord};
use netboot_core::Result;

use crate::config::AuthConfig;
use crate::ldap::{
    check_bind_result, DirectoryCapability, DirectoryConnector, DirectoryEndpoint,
    DirectoryError, DirectorySession, UserSearch, RC_INVALID_CREDENTIALS,
};
use crate::source::SnapshotSource;

/// Cheap bcrypt cost for tests
pub const TEST_COST: u32 = 4;

pub fn hashed(username: &str, password: &str) -> UserEntry {
    let hash = netboot_crypto::hash_password(password, TEST_COST).unwrap();
    UserEntry::from(UserRecord::new(username, hash))
}

/// Snapshot source that counts how often each document is loaded
pub struct CountingSource {
    config: AuthConfig,
    users: Vec<UserEntry>,
    pub config_loads: AtomicUsize,
    pub user_loads: AtomicUsize,
}

impl CountingSource {
    pub fn new(config: AuthConfig, users: Vec<UserEntry>) -> Arc<Self> {
        Arc::new(Self {
            config,
            users,
            config_loads: AtomicUsize::new(0),
            user_loads: AtomicUsize::new(0),
        })
    }

    pub fn user_loads(&self) -> usize {
        self.user_loads.load(Ordering::SeqCst)
    }

    pub fn config_loads(&self) -> usize {
        self.config_loads.load(Ordering::SeqCst)
    }
}

impl SnapshotSource for CountingSource {
    fn load_config(&self) -> Result<AuthConfig> {
        self.config_loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.config.clone())
    }

    fn load_users(&self) -> Result<Vec<UserEntry>> {
        self.user_loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.users.clone())
    }
}

/// Scripted directory that records every bind and search
#[derive(Default)]
pub struct FakeDirectory {
    accounts: HashMap<String, String>,
    entries: HashMap<String, Vec<String>>,
    bind_results: HashMap<String, u32>,
    unreachable: bool,
    failing_search: bool,
    binds: Mutex<Vec<String>>,
    searches: Mutex<Vec<UserSearch>>,
    open_sessions: AtomicUsize,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, dn: &str, password: &str) -> Self {
        self.accounts.insert(dn.to_string(), password.to_string());
        self
    }

    /// Entries returned for an exact filter string
    pub fn with_entries(mut self, filter: &str, dns: &[&str]) -> Self {
        self.entries
            .insert(filter.to_string(), dns.iter().map(|d| d.to_string()).collect());
        self
    }

    /// Answer binds as `dn` with a fixed result code
    pub fn with_bind_result(mut self, dn: &str, rc: u32) -> Self {
        self.bind_results.insert(dn.to_string(), rc);
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.failing_search = true;
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn bound_dns(&self) -> Vec<String> {
        self.binds.lock().unwrap().clone()
    }

    pub fn bind_count(&self) -> usize {
        self.binds.lock().unwrap().len()
    }

    pub fn searches(&self) -> Vec<UserSearch> {
        self.searches.lock().unwrap().clone()
    }

    /// Sessions handed out and not yet unbound
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }
}

pub fn capability(directory: &Arc<FakeDirectory>) -> DirectoryCapability {
    DirectoryCapability::Available(Arc::new(FakeConnector(directory.clone())))
}

struct FakeConnector(Arc<FakeDirectory>);

#[async_trait]
impl DirectoryConnector for FakeConnector {
    async fn bind(
        &self,
        _endpoint: &DirectoryEndpoint,
        dn: &str,
        password: &str,
    ) -> std::result::Result<Box<dyn DirectorySession>, DirectoryError> {
        let directory = &self.0;
        directory.binds.lock().unwrap().push(dn.to_string());

        if directory.unreachable {
            return Err(DirectoryError::Unreachable("connection refused".to_string()));
        }
        let rc = match (directory.bind_results.get(dn), directory.accounts.get(dn)) {
            (Some(rc), _) => *rc,
            (None, Some(expected)) if expected == password => 0,
            _ => RC_INVALID_CREDENTIALS,
        };
        check_bind_result(rc)?;

        directory.open_sessions.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            directory: directory.clone(),
            bound: true,
        }))
    }
}

struct FakeSession {
    directory: Arc<FakeDirectory>,
    bound: bool,
}

#[async_trait]
impl DirectorySession for FakeSession {
    async fn search_dns(
        &mut self,
        search: &UserSearch,
    ) -> std::result::Result<Vec<String>, DirectoryError> {
        self.directory.searches.lock().unwrap().push(search.clone());
        if self.directory.failing_search {
            return Err(DirectoryError::Search("sizeLimitExceeded".to_string()));
        }
        Ok(self
            .directory
            .entries
            .get(&search.filter)
            .cloned()
            .unwrap_or_default())
    }

    async fn unbind(&mut self) {
        if std::mem::replace(&mut self.bound, false) {
            self.directory.open_sessions.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
