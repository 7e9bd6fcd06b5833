//! Password hashing for netboot auth

pub mod hash;

pub use hash::*;
