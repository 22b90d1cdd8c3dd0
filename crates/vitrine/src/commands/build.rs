//! Static site build command.

use std::path::PathBuf;

use anyhow::{bail, Result};
use vitrine_render::{BuildConfig, SiteBuilder};

use crate::config::ConfigFile;

/// Run the build command.
pub fn run(config: &ConfigFile, output: Option<PathBuf>, minify: Option<bool>) -> Result<()> {
    tracing::info!("Building sites...");

    let repo = super::open_repo(config)?;
    let build_config = BuildConfig {
        output_dir: output.unwrap_or_else(|| config.site.output.clone()),
        base_url: config.site.base_url.clone(),
        minify: minify.unwrap_or(config.build.minify),
    };

    let result = SiteBuilder::new(build_config).build_all(&repo)?;

    tracing::info!(
        "Built {} sites ({} with the default template) in {}ms",
        result.pages,
        result.fallbacks,
        result.duration_ms
    );
    tracing::info!("Output: {}", result.output_dir.display());

    if !result.failed.is_empty() {
        for (client_id, reason) in &result.failed {
            tracing::error!("{}: {}", client_id, reason);
        }
        bail!("{} site(s) failed to build", result.failed.len());
    }

    Ok(())
}
