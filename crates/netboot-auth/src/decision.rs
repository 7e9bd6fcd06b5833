//! Authentication decisions
//!
//! A decision carries the reason it was reached so that it can be logged
//! with enough context for audit. Callers outside this crate only ever see
//! the boolean.

use std::fmt;
use tracing::{error, info, warn};

/// Backend that produced a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Router,
    Local,
    Ldap,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Backend::Router => "router",
            Backend::Local => "local",
            Backend::Ldap => "ldap",
        })
    }
}

/// Broad class of a denial, which decides how loudly it is logged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Credential,
    BackendUnavailable,
    Configuration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    EmptyCredentials,
    UnknownUser,
    BadPassword,
    /// Matching store entry lacks a field or holds an unusable hash
    MalformedRecord,
    /// direct_bind was rejected; wrong password and unknown DN look the same
    BindRejected,
    UserNotInDirectory,
    UserBindRejected,
    ServiceBindFailed(String),
    SearchFailed(String),
    DirectoryUnreachable(String),
    /// Built without a directory client
    DirectoryUnavailable,
    UnknownMode(String),
    UnknownBindMode(String),
}

impl DenyReason {
    pub fn kind(&self) -> FailureKind {
        match self {
            DenyReason::EmptyCredentials
            | DenyReason::UnknownUser
            | DenyReason::BadPassword
            | DenyReason::MalformedRecord
            | DenyReason::BindRejected
            | DenyReason::UserNotInDirectory
            | DenyReason::UserBindRejected => FailureKind::Credential,

            DenyReason::ServiceBindFailed(_)
            | DenyReason::SearchFailed(_)
            | DenyReason::DirectoryUnreachable(_)
            | DenyReason::DirectoryUnavailable => FailureKind::BackendUnavailable,

            DenyReason::UnknownMode(_) | DenyReason::UnknownBindMode(_) => {
                FailureKind::Configuration
            }
        }
    }

    /// Stable reason code for log lines
    pub fn code(&self) -> &'static str {
        match self {
            DenyReason::EmptyCredentials => "empty_credentials",
            DenyReason::UnknownUser => "user_not_found",
            DenyReason::BadPassword => "bad_password",
            DenyReason::MalformedRecord => "malformed_record",
            DenyReason::BindRejected => "bind_rejected",
            DenyReason::UserNotInDirectory => "user_not_found",
            DenyReason::UserBindRejected => "bad_password",
            DenyReason::ServiceBindFailed(_) => "service_bind_failed",
            DenyReason::SearchFailed(_) => "search_failed",
            DenyReason::DirectoryUnreachable(_) => "directory_unreachable",
            DenyReason::DirectoryUnavailable => "directory_client_unavailable",
            DenyReason::UnknownMode(_) => "unknown_mode",
            DenyReason::UnknownBindMode(_) => "unknown_bind_mode",
        }
    }

    fn detail(&self) -> Option<&str> {
        match self {
            DenyReason::ServiceBindFailed(d)
            | DenyReason::SearchFailed(d)
            | DenyReason::DirectoryUnreachable(d)
            | DenyReason::UnknownMode(d)
            | DenyReason::UnknownBindMode(d) => Some(d),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Granted,
    Denied(DenyReason),
}

/// Result of one backend (or the router itself) evaluating an attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthDecision {
    pub backend: Backend,
    /// Protocol step that produced the decision, e.g. `direct_bind`
    pub stage: &'static str,
    pub outcome: Outcome,
}

impl AuthDecision {
    pub fn granted(backend: Backend, stage: &'static str) -> Self {
        Self {
            backend,
            stage,
            outcome: Outcome::Granted,
        }
    }

    pub fn denied(backend: Backend, stage: &'static str, reason: DenyReason) -> Self {
        Self {
            backend,
            stage,
            outcome: Outcome::Denied(reason),
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self.outcome, Outcome::Granted)
    }

    pub fn reason(&self) -> Option<&DenyReason> {
        match &self.outcome {
            Outcome::Granted => None,
            Outcome::Denied(reason) => Some(reason),
        }
    }

    /// Emit the audit line for this decision
    pub fn log(&self, username: &str) {
        let (backend, stage) = (self.backend, self.stage);
        let reason = match &self.outcome {
            Outcome::Granted => {
                info!(%backend, stage, username, "Authentication succeeded");
                return;
            }
            Outcome::Denied(reason) => reason,
        };

        let code = reason.code();
        let detail = reason.detail().unwrap_or("");
        match reason.kind() {
            FailureKind::Credential => {
                warn!(%backend, stage, username, reason = code, "Authentication failed");
            }
            FailureKind::BackendUnavailable => {
                error!(%backend, stage, username, reason = code, detail, "Authentication backend unavailable");
            }
            FailureKind::Configuration => {
                error!(%backend, stage, username, reason = code, detail, "Authentication configuration error");
            }
        }
    }
}
