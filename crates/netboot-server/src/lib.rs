//! HTTP front end for netboot auth
//!
//! iPXE posts credentials to `/auth/boot.ipxe` and receives either the boot
//! menu or a failure script.

pub mod routes;
pub mod server;

pub use server::{create_router, AppState, NetbootServer};
