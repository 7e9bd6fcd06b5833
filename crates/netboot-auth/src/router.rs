//! Backend selection
//!
//! | mode    | backends consulted                          |
//! |---------|---------------------------------------------|
//! | `local` | local store                                 |
//! | `ldap`  | directory                                   |
//! | `both`  | local store, then directory if local denied |
//!
//! Every decision is logged once with its backend, stage and reason code.
//! Callers only learn pass or fail.

use netboot_core::{Error, Result};
use std::sync::Arc;
use tracing::debug;

use crate::config::{AuthConfig, AuthMode};
use crate::decision::{AuthDecision, Backend, DenyReason};
use crate::ldap::{DirectoryAuthenticator, DirectoryCapability};
use crate::local::LocalCredentialStore;
use crate::source::SnapshotSource;

pub struct AuthRouter {
    source: Arc<dyn SnapshotSource>,
    local: LocalCredentialStore,
    directory: DirectoryAuthenticator,
}

impl AuthRouter {
    pub fn new(source: Arc<dyn SnapshotSource>, directory: DirectoryCapability) -> Self {
        Self {
            local: LocalCredentialStore::new(source.clone()),
            directory: DirectoryAuthenticator::new(directory),
            source,
        }
    }

    /// Router over the directory client compiled into this build
    pub fn with_detected_directory(source: Arc<dyn SnapshotSource>) -> Self {
        Self::new(source, DirectoryCapability::detect())
    }

    /// Decide whether `username` may boot.
    ///
    /// `Err` means the attempt could not be evaluated at all: an unreadable
    /// or malformed document, or settings missing a field the active mode
    /// requires. Everything else is `Ok(false)`.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<bool> {
        if username.is_empty() || password.is_empty() {
            let decision =
                AuthDecision::denied(Backend::Router, "precheck", DenyReason::EmptyCredentials);
            decision.log(username);
            return Ok(false);
        }

        let config = self.source.load_config()?;
        debug!(username, mode = %config.mode, "Routing authentication attempt");

        match &config.mode {
            AuthMode::Local => self.try_local(username, password).await,
            AuthMode::Ldap => self.try_ldap(username, password, &config).await,
            AuthMode::Both => {
                if self.try_local(username, password).await? {
                    return Ok(true);
                }
                self.try_ldap(username, password, &config).await
            }
            AuthMode::Unknown(mode) => {
                let decision = AuthDecision::denied(
                    Backend::Router,
                    "mode",
                    DenyReason::UnknownMode(mode.clone()),
                );
                decision.log(username);
                Ok(false)
            }
        }
    }

    async fn try_local(&self, username: &str, password: &str) -> Result<bool> {
        let decision = self.local.verify(username, password).await?;
        decision.log(username);
        Ok(decision.is_granted())
    }

    async fn try_ldap(&self, username: &str, password: &str, config: &AuthConfig) -> Result<bool> {
        let settings = config.ldap.as_ref().ok_or_else(|| {
            Error::config(format!("mode '{}' requires an ldap section", config.mode))
        })?;

        let decision = self.directory.verify(username, password, settings).await?;
        decision.log(username);
        Ok(decision.is_granted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ldap::{BindMode, LdapSettings};
    use crate::testing::{capability, hashed, CountingSource, FakeDirectory};
    use netboot_core::types::UserEntry;

    const ALICE_DN: &str = "uid=alice,dc=example";

    fn ldap_settings() -> LdapSettings {
        let mut s = LdapSettings::new("ldap://dc.example.com", BindMode::DirectBind);
        s.user_dn_pattern = Some("uid={username},dc=example".to_string());
        s
    }

    fn config(mode: AuthMode) -> AuthConfig {
        AuthConfig {
            mode,
            ldap: Some(ldap_settings()),
        }
    }

    #[tokio::test]
    async fn test_empty_credentials_consult_nothing() {
        let source = CountingSource::new(config(AuthMode::Both), vec![hashed("alice", "secret")]);
        let directory = FakeDirectory::new().with_account(ALICE_DN, "secret").shared();
        let router = AuthRouter::new(source.clone(), capability(&directory));

        assert!(!router.authenticate("", "secret").await.unwrap());
        assert!(!router.authenticate("alice", "").await.unwrap());
        assert!(!router.authenticate("", "").await.unwrap());

        assert_eq!(source.config_loads(), 0);
        assert_eq!(source.user_loads(), 0);
        assert_eq!(directory.bind_count(), 0);
    }

    #[tokio::test]
    async fn test_local_mode() {
        let source = CountingSource::new(config(AuthMode::Local), vec![hashed("alice", "secret")]);
        let directory = FakeDirectory::new().with_account("uid=bob,dc=example", "x").shared();
        let router = AuthRouter::new(source.clone(), capability(&directory));

        assert!(router.authenticate("alice", "secret").await.unwrap());
        assert!(!router.authenticate("alice", "wrong").await.unwrap());
        assert!(!router.authenticate("bob", "x").await.unwrap());

        assert_eq!(directory.bind_count(), 0);
        assert_eq!(source.config_loads(), 3);
        assert_eq!(source.user_loads(), 3);
    }

    #[tokio::test]
    async fn test_ldap_mode_skips_local_store() {
        let source = CountingSource::new(config(AuthMode::Ldap), vec![hashed("alice", "local-pw")]);
        let directory = FakeDirectory::new().with_account(ALICE_DN, "secret").shared();
        let router = AuthRouter::new(source.clone(), capability(&directory));

        assert!(router.authenticate("alice", "secret").await.unwrap());
        assert!(!router.authenticate("alice", "local-pw").await.unwrap());
        assert_eq!(source.user_loads(), 0);
    }

    #[tokio::test]
    async fn test_both_falls_back_to_directory() {
        let source = CountingSource::new(config(AuthMode::Both), vec![hashed("alice", "local-pw")]);
        let directory = FakeDirectory::new().with_account(ALICE_DN, "secret").shared();
        let router = AuthRouter::new(source.clone(), capability(&directory));

        assert!(router.authenticate("alice", "secret").await.unwrap());
        assert_eq!(source.user_loads(), 1);
        assert_eq!(directory.bind_count(), 1);
    }

    #[tokio::test]
    async fn test_both_falls_back_past_unusable_local_hash() {
        let broken = UserEntry {
            username: Some("alice".to_string()),
            password_hash: Some(
                "$2b$03$abcdefghijklmnopqrstuuABCDEFGHIJKLMNOPQRSTUVWXYZ01234".to_string(),
            ),
        };
        let source = CountingSource::new(config(AuthMode::Both), vec![broken]);
        let directory = FakeDirectory::new().with_account(ALICE_DN, "secret").shared();
        let router = AuthRouter::new(source, capability(&directory));

        assert!(router.authenticate("alice", "secret").await.unwrap());
        assert_eq!(directory.bind_count(), 1);
    }

    #[tokio::test]
    async fn test_both_short_circuits_on_local_success() {
        let source = CountingSource::new(config(AuthMode::Both), vec![hashed("alice", "local-pw")]);
        let directory = FakeDirectory::new().with_account(ALICE_DN, "secret").shared();
        let router = AuthRouter::new(source.clone(), capability(&directory));

        assert!(router.authenticate("alice", "local-pw").await.unwrap());
        assert_eq!(directory.bind_count(), 0);
    }

    #[tokio::test]
    async fn test_both_denies_when_both_deny() {
        let source = CountingSource::new(config(AuthMode::Both), vec![hashed("alice", "local-pw")]);
        let directory = FakeDirectory::new().with_account(ALICE_DN, "secret").shared();
        let router = AuthRouter::new(source, capability(&directory));

        assert!(!router.authenticate("alice", "neither").await.unwrap());
        assert_eq!(directory.bind_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_mode_is_denied() {
        let source = CountingSource::new(
            config(AuthMode::Unknown("kerberos".to_string())),
            vec![hashed("alice", "secret")],
        );
        let directory = FakeDirectory::new().with_account(ALICE_DN, "secret").shared();
        let router = AuthRouter::new(source.clone(), capability(&directory));

        assert!(!router.authenticate("alice", "secret").await.unwrap());
        assert_eq!(source.user_loads(), 0);
        assert_eq!(directory.bind_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_bind_mode_is_denied() {
        let mut settings = ldap_settings();
        settings.bind_mode = BindMode::Unknown("sasl".to_string());
        let source = CountingSource::new(
            AuthConfig {
                mode: AuthMode::Ldap,
                ldap: Some(settings),
            },
            vec![],
        );
        let directory = FakeDirectory::new().with_account(ALICE_DN, "secret").shared();
        let router = AuthRouter::new(source, capability(&directory));

        assert!(!router.authenticate("alice", "secret").await.unwrap());
        assert_eq!(directory.bind_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_ldap_section_is_error() {
        let source = CountingSource::new(
            AuthConfig {
                mode: AuthMode::Ldap,
                ldap: None,
            },
            vec![],
        );
        let router = AuthRouter::new(source, DirectoryCapability::Unavailable);

        let result = router.authenticate("alice", "secret").await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_missing_directory_client_fails_closed() {
        let source = CountingSource::new(config(AuthMode::Both), vec![]);
        let router = AuthRouter::new(source, DirectoryCapability::Unavailable);

        assert!(!router.authenticate("alice", "secret").await.unwrap());
    }

    #[tokio::test]
    async fn test_unreadable_store_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("auth.yml");
        std::fs::write(&config_path, "mode: local\n").unwrap();
        let source = Arc::new(crate::source::FileSnapshotSource::new(
            &config_path,
            dir.path().join("missing-users.yml"),
        ));
        let router = AuthRouter::new(source, DirectoryCapability::Unavailable);

        let result = router.authenticate("alice", "secret").await;
        assert!(matches!(result, Err(Error::ConfigRead { .. })));
    }
}
