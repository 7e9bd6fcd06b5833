//! Netboot auth server implementation

use axum::{
    routing::{get, post},
    Router,
};
use netboot_auth::{AuthRouter, DirectoryCapability, FileSnapshotSource};
use netboot_core::{config::ServiceConfig, Result};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::{info, warn};

use crate::routes;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthRouter>,
    pub menu_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(auth: AuthRouter, menu_path: impl Into<PathBuf>) -> Self {
        Self {
            auth: Arc::new(auth),
            menu_path: Arc::new(menu_path.into()),
        }
    }
}

/// Netboot auth HTTP server
pub struct NetbootServer {
    config: ServiceConfig,
}

impl NetbootServer {
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> Result<()> {
        let directory = DirectoryCapability::detect();
        if !directory.is_available() {
            warn!("Built without LDAP support; ldap and both modes will deny directory users");
        }

        let source = Arc::new(FileSnapshotSource::from_paths(&self.config.paths));
        let auth = AuthRouter::new(source, directory);
        let state = AppState::new(auth, self.config.paths.menu.clone());

        let app = create_router(state);
        let addr = self.config.listen_address();
        let listener = TcpListener::bind(&addr).await?;

        info!("Netboot auth service listening on http://{}", addr);
        info!("Auth config: {}", self.config.paths.auth_config.display());
        info!("Users file: {}", self.config.paths.users.display());
        info!("Menu file: {}", self.config.paths.menu.display());

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;
        Ok(())
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/auth/boot.ipxe", post(routes::auth_boot))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
        .with_state(state)
}
