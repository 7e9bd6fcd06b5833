//! Core types for netboot auth

mod user;

pub use user::*;
