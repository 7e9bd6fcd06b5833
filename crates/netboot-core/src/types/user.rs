//! Local credential store records

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

/// A complete credential record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub password_hash: String,
}

impl UserRecord {
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }
}

/// One entry of the `users` list as found on disk.
///
/// Fields that are missing or not strings are kept as `None` so that a
/// single bad entry only affects lookups of that user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserEntry {
    pub username: Option<String>,
    pub password_hash: Option<String>,
}

impl UserEntry {
    pub fn matches(&self, username: &str) -> bool {
        self.username.as_deref() == Some(username)
    }
}

impl From<&Value> for UserEntry {
    fn from(value: &Value) -> Self {
        let field = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            username: field("username"),
            password_hash: field("password_hash"),
        }
    }
}

impl From<UserRecord> for UserEntry {
    fn from(record: UserRecord) -> Self {
        Self {
            username: Some(record.username),
            password_hash: Some(record.password_hash),
        }
    }
}

/// The credential store document: `users: [{username, password_hash}]`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsersDocument {
    #[serde(default)]
    users: Option<Vec<Value>>,
}

impl UsersDocument {
    pub fn entries(&self) -> Vec<UserEntry> {
        self.users
            .iter()
            .flatten()
            .map(UserEntry::from)
            .collect()
    }
}
