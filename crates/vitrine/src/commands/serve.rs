//! Serve sites, previews and the editing API.

use std::sync::Arc;

use anyhow::Result;
use vitrine_render::{RenderOptions, SiteRenderer};
use vitrine_server::{AppState, ServerConfig, VitrineServer};
use vitrine_store::StaticIdentity;

use crate::config::ConfigFile;

/// Run the serve command.
pub async fn run(config: ConfigFile, port: Option<u16>, open: bool) -> Result<()> {
    let repo = super::open_repo(&config)?;

    if config.users.is_empty() {
        tracing::warn!("No users configured; the editing API will reject every request");
    }

    let renderer = SiteRenderer::new(RenderOptions {
        base_url: "/".to_string(),
        minify: config.build.minify,
    });
    let identity = Arc::new(StaticIdentity::new(config.users));
    let state = AppState::new(repo, renderer, identity);

    let server_config = ServerConfig {
        host: config.server.host,
        port: port.unwrap_or(config.server.port),
        watch_dir: Some(config.site.store),
        open,
    };

    VitrineServer::new(server_config, state).start().await?;

    Ok(())
}
