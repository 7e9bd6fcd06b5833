//! CLI command implementations

pub mod hash_password;
pub mod serve;
