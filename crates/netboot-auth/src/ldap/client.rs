//! LDAP Client implementation
//!
//! `ldap3`-backed directory connector. Supports LDAP, LDAPS (SSL), and
//! STARTTLS connections. Each bind opens its own connection.

use async_trait::async_trait;
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchEntry};
use tracing::debug;

use crate::ldap::connector::{
    check_bind_result, DirectoryConnector, DirectoryError, DirectorySession,
};
use crate::ldap::types::{DirectoryEndpoint, UserSearch};

/// Attribute requested from user searches; only the entry DN is used
const DN_ATTRIBUTES: [&str; 1] = ["distinguishedName"];

/// Directory connector over `ldap3`
#[derive(Debug, Default, Clone)]
pub struct Ldap3Connector;

impl Ldap3Connector {
    pub fn new() -> Self {
        Self
    }

    /// Create LDAP connection with proper TLS settings
    async fn create_connection(&self, endpoint: &DirectoryEndpoint) -> Result<Ldap, DirectoryError> {
        let settings = LdapConnSettings::new()
            .set_conn_timeout(endpoint.timeout)
            .set_starttls(endpoint.start_tls);

        debug!("Connecting to LDAP server: {}", endpoint.url);

        let (conn, ldap) = LdapConnAsync::with_settings(settings, endpoint.url.as_str())
            .await
            .map_err(|e| {
                DirectoryError::Unreachable(format!("Failed to connect to LDAP server: {}", e))
            })?;

        ldap3::drive!(conn);
        Ok(ldap)
    }
}

#[async_trait]
impl DirectoryConnector for Ldap3Connector {
    async fn bind(
        &self,
        endpoint: &DirectoryEndpoint,
        dn: &str,
        password: &str,
    ) -> Result<Box<dyn DirectorySession>, DirectoryError> {
        let mut ldap = self.create_connection(endpoint).await?;

        let result = match ldap.simple_bind(dn, password).await {
            Ok(result) => result,
            Err(e) => {
                let _ = ldap.unbind().await;
                return Err(DirectoryError::Unreachable(format!("Bind failed: {}", e)));
            }
        };

        if let Err(e) = check_bind_result(result.rc) {
            let _ = ldap.unbind().await;
            return Err(e);
        }

        Ok(Box::new(Ldap3Session { ldap }))
    }
}

struct Ldap3Session {
    ldap: Ldap,
}

#[async_trait]
impl DirectorySession for Ldap3Session {
    async fn search_dns(&mut self, search: &UserSearch) -> Result<Vec<String>, DirectoryError> {
        debug!("Searching for user with filter: {}", search.filter);

        let (rs, _res) = self
            .ldap
            .search(&search.base, Scope::Subtree, &search.filter, DN_ATTRIBUTES.to_vec())
            .await
            .map_err(|e| DirectoryError::Search(format!("User search failed: {}", e)))?
            .success()
            .map_err(|e| DirectoryError::Search(format!("User search error: {}", e)))?;

        Ok(rs
            .into_iter()
            .map(|entry| SearchEntry::construct(entry).dn)
            .collect())
    }

    async fn unbind(&mut self) {
        if let Err(e) = self.ldap.unbind().await {
            debug!("LDAP unbind failed: {}", e);
        }
    }
}
