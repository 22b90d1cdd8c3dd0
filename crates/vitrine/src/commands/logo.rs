//! Set a site's logo from an image file.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde_json::json;

use vitrine_core::{encode_data_url, mime_for_path};
use vitrine_store::SiteRepository;

use crate::config::ConfigFile;

/// Run the logo command.
pub fn run(config: &ConfigFile, client_id: &str, file: &Path) -> Result<()> {
    let repo = super::open_repo(config)?;
    set_logo(&repo, client_id, file)?;
    tracing::info!("Updated logo for '{}' from {}", client_id, file.display());
    Ok(())
}

pub(crate) fn set_logo(repo: &SiteRepository, client_id: &str, file: &Path) -> Result<()> {
    let mime = mime_for_path(file)
        .ok_or_else(|| anyhow!("Unrecognized image type: {}", file.display()))?;
    let bytes = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let logo = encode_data_url(&bytes, mime)?;

    if repo.load(client_id)?.is_none() {
        return Err(anyhow!("Site not found: {}", client_id));
    }
    repo.update(client_id, json!({ "logo": logo }))?;
    Ok(())
}
