//! Local credential store
//!
//! Users and bcrypt hashes from `users.yml`, re-read on every attempt.

use netboot_core::{Error, Result};
use netboot_crypto::verify_password;
use std::sync::Arc;
use tracing::debug;

use crate::decision::{AuthDecision, Backend, DenyReason};
use crate::source::SnapshotSource;

const STAGE: &str = "verify";

pub struct LocalCredentialStore {
    source: Arc<dyn SnapshotSource>,
}

impl LocalCredentialStore {
    pub fn new(source: Arc<dyn SnapshotSource>) -> Self {
        Self { source }
    }

    /// Check `password` for `username`.
    ///
    /// The first entry with a matching username decides; later duplicates
    /// are never consulted. Only an unusable store file is an error.
    pub async fn verify(&self, username: &str, password: &str) -> Result<AuthDecision> {
        let entries = self.source.load_users()?;

        let Some(entry) = entries.into_iter().find(|e| e.matches(username)) else {
            return Ok(AuthDecision::denied(Backend::Local, STAGE, DenyReason::UnknownUser));
        };

        let Some(stored_hash) = entry.password_hash else {
            debug!(username, "Local user entry has no password_hash");
            return Ok(AuthDecision::denied(Backend::Local, STAGE, DenyReason::MalformedRecord));
        };

        let password = password.to_string();
        let matched = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| Error::InternalError(format!("Task join error: {}", e)))?;

        let reason = match matched {
            Ok(true) => return Ok(AuthDecision::granted(Backend::Local, STAGE)),
            Ok(false) => DenyReason::BadPassword,
            Err(e) => {
                debug!(username, error = %e, "Local user entry has an unusable hash");
                DenyReason::MalformedRecord
            }
        };
        Ok(AuthDecision::denied(Backend::Local, STAGE, reason))
    }
}
