//! Initialize a vitrine workspace.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing vitrine...");

    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());

    let root = config_path.parent().unwrap_or_else(|| Path::new("."));
    let sites_dir = root.join("data").join("sites");
    fs::create_dir_all(&sites_dir).context("Failed to create site store")?;
    tracing::info!("Created {}", sites_dir.display());

    tracing::info!("");
    tracing::info!("Vitrine initialized! Next steps:");
    tracing::info!("  1. Run 'vitrine models' to list site models");
    tracing::info!("  2. Run 'vitrine new <model> <client>' to create a site");
    tracing::info!("  3. Run 'vitrine serve' to preview and edit it");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Vitrine configuration

[site]
# Directory holding stored site documents
store = "data"
# Output directory for 'vitrine build'
output = "dist"
base_url = "/"

[build]
minify = true

[server]
host = "127.0.0.1"
port = 7777

# API tokens. Admins edit every site; clients edit their own.
[[users]]
token = "change-me"
uid = "admin"
role = "admin"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config;
    use tempfile::tempdir;

    #[test]
    fn writes_a_loadable_config() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("vitrine.toml");

        run(&path, false).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.users.len(), 1);
        assert!(temp.path().join("data/sites").is_dir());
    }

    #[test]
    fn keeps_existing_config_without_yes() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("vitrine.toml");
        fs::write(&path, "# mine\n").unwrap();

        run(&path, false).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine\n");
    }
}
