//! Request handlers

use axum::{
    extract::{ConnectInfo, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use std::io::ErrorKind;
use std::net::SocketAddr;
use tracing::{error, info};

use crate::server::AppState;

const FAILURE_SCRIPT: &str = "#!ipxe\necho Authentication failed.\nsleep 3\n";
const MENU_MISSING_SCRIPT: &str = "#!ipxe\necho ERROR: Menu not found.\nshell\n";
const SERVICE_ERROR_SCRIPT: &str = "#!ipxe\necho Authentication service error.\nsleep 3\n";

/// Form fields posted by the iPXE `login` flow
#[derive(Debug, Deserialize)]
pub struct BootCredentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn ipxe(status: StatusCode, body: impl Into<String>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain")],
        body.into(),
    )
        .into_response()
}

/// POST /auth/boot.ipxe
pub async fn auth_boot(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    Form(credentials): Form<BootCredentials>,
) -> Response {
    info!(client = %peer.ip(), username = %credentials.username, "Auth attempt");

    match state
        .auth
        .authenticate(&credentials.username, &credentials.password)
        .await
    {
        Ok(true) => serve_menu(&state).await,
        Ok(false) => ipxe(StatusCode::UNAUTHORIZED, FAILURE_SCRIPT),
        Err(e) => {
            error!(username = %credentials.username, code = e.code(), "Auth attempt could not be evaluated: {}", e);
            ipxe(StatusCode::INTERNAL_SERVER_ERROR, SERVICE_ERROR_SCRIPT)
        }
    }
}

async fn serve_menu(state: &AppState) -> Response {
    match tokio::fs::read_to_string(state.menu_path.as_path()).await {
        Ok(menu) => ipxe(StatusCode::OK, menu),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            error!("Menu file not found: {}", state.menu_path.display());
            ipxe(StatusCode::OK, MENU_MISSING_SCRIPT)
        }
        Err(e) => {
            error!("Failed to read menu file {}: {}", state.menu_path.display(), e);
            ipxe(StatusCode::INTERNAL_SERVER_ERROR, SERVICE_ERROR_SCRIPT)
        }
    }
}

/// GET /health
pub async fn health() -> Response {
    ipxe(StatusCode::OK, "ok")
}
