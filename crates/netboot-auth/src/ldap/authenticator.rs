//! Directory authentication protocols
//!
//! direct_bind: bind as the DN built from `user_dn_pattern`.
//!
//! search_bind: `ServiceBind -> Search -> UserBind`. Each step only runs when
//! the previous one succeeded; the service session is unbound as soon as the
//! search is done, before the user bind.

use netboot_core::Result;
use tracing::{debug, warn};

use crate::decision::{AuthDecision, Backend, DenyReason};
use crate::ldap::connector::{
    DirectoryCapability, DirectoryConnector, DirectoryError, DirectorySession,
};
use crate::ldap::types::{BindMode, DirectoryEndpoint, LdapSettings};

const STAGE_DIRECT_BIND: &str = "direct_bind";
const STAGE_SERVICE_BIND: &str = "service_bind";
const STAGE_SEARCH: &str = "search";
const STAGE_USER_BIND: &str = "user_bind";

/// Verifies credentials against a directory service
#[derive(Debug, Clone)]
pub struct DirectoryAuthenticator {
    capability: DirectoryCapability,
}

impl DirectoryAuthenticator {
    pub fn new(capability: DirectoryCapability) -> Self {
        Self { capability }
    }

    /// Evaluate one attempt.
    ///
    /// Returns `Err` only when the settings lack what the bind mode needs;
    /// every directory outcome, including an unknown bind mode or a missing
    /// client, is a decision.
    pub async fn verify(
        &self,
        username: &str,
        password: &str,
        settings: &LdapSettings,
    ) -> Result<AuthDecision> {
        if let BindMode::Unknown(mode) = &settings.bind_mode {
            return Ok(AuthDecision::denied(
                Backend::Ldap,
                "bind_mode",
                DenyReason::UnknownBindMode(mode.clone()),
            ));
        }

        settings.validate()?;
        let endpoint = settings.endpoint()?;

        let connector = match &self.capability {
            DirectoryCapability::Available(connector) => connector.as_ref(),
            DirectoryCapability::Unavailable => {
                return Ok(AuthDecision::denied(
                    Backend::Ldap,
                    "connect",
                    DenyReason::DirectoryUnavailable,
                ));
            }
        };

        // An empty password turns a simple bind into an anonymous bind
        if password.is_empty() {
            return Ok(AuthDecision::denied(
                Backend::Ldap,
                "connect",
                DenyReason::EmptyCredentials,
            ));
        }

        match settings.bind_mode {
            BindMode::DirectBind => {
                direct_bind(connector, &endpoint, settings, username, password).await
            }
            _ => search_bind(connector, &endpoint, settings, username, password).await,
        }
    }
}

async fn direct_bind(
    connector: &dyn DirectoryConnector,
    endpoint: &DirectoryEndpoint,
    settings: &LdapSettings,
    username: &str,
    password: &str,
) -> Result<AuthDecision> {
    let user_dn = settings.user_dn(username)?;
    debug!(username, user_dn = %user_dn, "LDAP direct_bind");

    let decision = match connector.bind(endpoint, &user_dn, password).await {
        Ok(mut session) => {
            session.unbind().await;
            AuthDecision::granted(Backend::Ldap, STAGE_DIRECT_BIND)
        }
        Err(DirectoryError::BindRejected(rc)) => {
            debug!(username, rc, "LDAP direct_bind rejected");
            AuthDecision::denied(Backend::Ldap, STAGE_DIRECT_BIND, DenyReason::BindRejected)
        }
        Err(e) => AuthDecision::denied(
            Backend::Ldap,
            STAGE_DIRECT_BIND,
            DenyReason::DirectoryUnreachable(e.to_string()),
        ),
    };
    Ok(decision)
}

/// Steps of search_bind; `Done` carries the terminal decision
enum SearchBindState {
    ServiceBind,
    Search(Box<dyn DirectorySession>),
    UserBind(String),
    Done(AuthDecision),
}

async fn search_bind(
    connector: &dyn DirectoryConnector,
    endpoint: &DirectoryEndpoint,
    settings: &LdapSettings,
    username: &str,
    password: &str,
) -> Result<AuthDecision> {
    let account = settings.service_account()?;
    let search = settings.user_search(username)?;

    let mut state = SearchBindState::ServiceBind;
    loop {
        state = match state {
            SearchBindState::ServiceBind => {
                match connector
                    .bind(endpoint, &account.bind_dn, &account.bind_password)
                    .await
                {
                    Ok(session) => SearchBindState::Search(session),
                    Err(e) => SearchBindState::Done(AuthDecision::denied(
                        Backend::Ldap,
                        STAGE_SERVICE_BIND,
                        DenyReason::ServiceBindFailed(e.to_string()),
                    )),
                }
            }

            SearchBindState::Search(mut session) => {
                let found = session.search_dns(&search).await;
                session.unbind().await;

                match found {
                    Err(e) => SearchBindState::Done(AuthDecision::denied(
                        Backend::Ldap,
                        STAGE_SEARCH,
                        DenyReason::SearchFailed(e.to_string()),
                    )),
                    Ok(dns) => match select_entry(username, dns) {
                        Some(user_dn) => SearchBindState::UserBind(user_dn),
                        None => SearchBindState::Done(AuthDecision::denied(
                            Backend::Ldap,
                            STAGE_SEARCH,
                            DenyReason::UserNotInDirectory,
                        )),
                    },
                }
            }

            SearchBindState::UserBind(user_dn) => {
                debug!(username, user_dn = %user_dn, "LDAP user bind");
                let decision = match connector.bind(endpoint, &user_dn, password).await {
                    Ok(mut session) => {
                        session.unbind().await;
                        AuthDecision::granted(Backend::Ldap, STAGE_USER_BIND)
                    }
                    Err(DirectoryError::BindRejected(_)) => AuthDecision::denied(
                        Backend::Ldap,
                        STAGE_USER_BIND,
                        DenyReason::UserBindRejected,
                    ),
                    Err(e) => AuthDecision::denied(
                        Backend::Ldap,
                        STAGE_USER_BIND,
                        DenyReason::DirectoryUnreachable(e.to_string()),
                    ),
                };
                SearchBindState::Done(decision)
            }

            SearchBindState::Done(decision) => return Ok(decision),
        };
    }
}

/// First entry wins when the filter matches several.
// TODO: decide with directory owners whether an ambiguous match should deny instead
fn select_entry(username: &str, dns: Vec<String>) -> Option<String> {
    if dns.len() > 1 {
        warn!(
            username,
            matches = dns.len(),
            "LDAP search matched multiple entries, using the first"
        );
    }
    dns.into_iter().next()
}
