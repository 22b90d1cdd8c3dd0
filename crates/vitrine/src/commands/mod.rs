pub mod build;
pub mod edit;
pub mod init;
pub mod logo;
pub mod models;
pub mod new;
pub mod serve;

use std::sync::Arc;

use anyhow::{Context, Result};
use vitrine_store::{FileStore, SiteRepository};

use crate::config::ConfigFile;

/// Open the configured file store.
pub fn open_repo(config: &ConfigFile) -> Result<SiteRepository> {
    let store = FileStore::open(&config.site.store)
        .with_context(|| format!("Failed to open store at {}", config.site.store.display()))?;
    Ok(SiteRepository::new(Arc::new(store)))
}
