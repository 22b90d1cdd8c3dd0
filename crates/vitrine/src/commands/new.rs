//! Create a client site from a site model.

use anyhow::{bail, Result};
use vitrine_core::{get_site_model, SiteEditor};
use vitrine_store::SiteRepository;

use crate::config::ConfigFile;

/// Run the new command.
pub fn run(
    config: &ConfigFile,
    model_id: &str,
    client_id: &str,
    name: Option<String>,
    force: bool,
) -> Result<()> {
    let repo = super::open_repo(config)?;
    create(&repo, model_id, client_id, name, force)?;
    tracing::info!("Created site '{}' from model '{}'", client_id, model_id);
    Ok(())
}

pub(crate) fn create(
    repo: &SiteRepository,
    model_id: &str,
    client_id: &str,
    name: Option<String>,
    force: bool,
) -> Result<()> {
    let Some(model) = get_site_model(model_id) else {
        bail!("Unknown site model: {} (see 'vitrine models')", model_id);
    };

    if !force && repo.load(client_id)?.is_some() {
        bail!("Site '{}' already exists. Use --force to replace it.", client_id);
    }

    let mut editor = SiteEditor::from_model(model, client_id);
    if let Some(name) = name {
        editor.set_document_field("nomeDoSite", serde_json::Value::String(name))?;
    }

    repo.submit(&editor)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use vitrine_store::MemoryStore;

    fn repo() -> SiteRepository {
        SiteRepository::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn creates_site_from_model() {
        let repo = repo();

        create(&repo, "representante", "ana", Some("Ana Cosméticos".into()), false).unwrap();

        let doc = repo.load("ana").unwrap().unwrap();
        assert_eq!(doc.site_name, "Ana Cosméticos");
        assert_eq!(doc.template.as_deref(), Some("representante"));
        assert!(!doc.sections_order.is_empty());
    }

    #[test]
    fn refuses_to_overwrite_without_force() {
        let repo = repo();
        create(&repo, "representante", "ana", None, false).unwrap();

        assert!(create(&repo, "landing-page", "ana", None, false).is_err());
        create(&repo, "landing-page", "ana", None, true).unwrap();
    }

    #[test]
    fn rejects_unknown_models() {
        assert!(create(&repo(), "nope", "ana", None, false).is_err());
    }
}
