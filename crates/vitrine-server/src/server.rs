//! Server startup.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::routes::build_router;
use crate::state::AppState;
use crate::watcher::{StoreWatcher, WatchEvent};

/// Configuration for the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// File store directory to watch for preview reloads
    pub watch_dir: Option<PathBuf>,

    /// Open browser on start
    pub open: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7777,
            watch_dir: None,
            open: false,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> Result<SocketAddr, ServerError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ServerError::InvalidAddress(addr))
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),
}

/// The vitrine HTTP server.
pub struct VitrineServer {
    config: ServerConfig,
    state: AppState,
}

impl VitrineServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Serve until Ctrl+C.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr = self.config.addr()?;

        let _watcher = match &self.config.watch_dir {
            Some(dir) => {
                let (watcher, mut rx) =
                    StoreWatcher::new(dir).map_err(|e| ServerError::WatchError(e.to_string()))?;

                let state = self.state.clone();
                tokio::spawn(async move {
                    while let Some(event) = rx.recv().await {
                        handle_watch_event(&state, event);
                    }
                });

                tracing::info!("Watching {} for changes", dir.display());
                Some(watcher)
            }
            None => None,
        };

        let app = build_router(self.state.clone());

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        tracing::info!("Serving sites at http://{}", addr);

        if self.config.open {
            let url = format!("http://{}", addr);
            if let Err(e) = open::that(&url) {
                tracing::warn!("Failed to open browser: {}", e);
            }
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        tracing::info!("Server shut down");
        Ok(())
    }
}

/// Handle file watch events.
fn handle_watch_event(state: &AppState, event: WatchEvent) {
    match event {
        WatchEvent::SiteChanged(client_id) => {
            tracing::info!("Site changed on disk: {}", client_id);
            state.reload().reload_site(&client_id);
        }
        WatchEvent::SiteRemoved(client_id) => {
            tracing::info!("Site removed on disk: {}", client_id);
            state.reload().reload_site(&client_id);
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received Ctrl+C, shutting down...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reload::ReloadMessage;
    use crate::routes::testing::state;

    #[test]
    fn default_config_listens_locally() {
        let config = ServerConfig::default();

        assert_eq!(config.addr().unwrap().to_string(), "127.0.0.1:7777");
    }

    #[test]
    fn rejects_bad_hosts() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };

        assert!(matches!(config.addr(), Err(ServerError::InvalidAddress(_))));
    }

    #[test]
    fn store_changes_reload_previews() {
        let state = state();
        let mut rx = state.reload().subscribe();

        handle_watch_event(&state, WatchEvent::SiteChanged("ana".to_string()));

        assert_eq!(
            rx.try_recv().unwrap(),
            ReloadMessage::Reload {
                client_id: Some("ana".to_string())
            }
        );
    }
}
