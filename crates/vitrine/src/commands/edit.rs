//! Edit a stored site from the command line.
//!
//! Each invocation loads the site into an editor, applies one operation and
//! submits the result, so invalid edits never reach the store.

use anyhow::{anyhow, Result};
use clap::Subcommand;
use serde_json::Value;

use vitrine_core::{SectionKind, SiteEditor};
use vitrine_store::SiteRepository;

use crate::config::ConfigFile;

#[derive(Subcommand, Debug, Clone)]
pub enum EditAction {
    /// Print the stored document as JSON
    Show,

    /// Turn a section on or off
    Toggle { section: String },

    /// Move a section one position earlier
    Up { section: String },

    /// Move a section one position later
    Down { section: String },

    /// Set a field value (JSON, or a plain string)
    Set {
        /// Section to edit; omit to edit document fields
        #[arg(short, long)]
        section: Option<String>,

        /// Field path, such as `title` or `cards[0].text`
        path: String,

        value: String,
    },

    /// Append a placeholder card to a card section
    AddCard { section: String },

    /// Remove a card by position
    RemoveCard { section: String, index: usize },

    /// Add a section type the site does not have yet
    AddSection { section: String },
}

/// Run the edit command.
pub fn run(config: &ConfigFile, client_id: &str, action: EditAction) -> Result<()> {
    let repo = super::open_repo(config)?;
    if let Some(output) = apply(&repo, client_id, action)? {
        println!("{}", output);
    }
    Ok(())
}

/// Apply one edit and submit it. Returns text to print, if any.
pub(crate) fn apply(
    repo: &SiteRepository,
    client_id: &str,
    action: EditAction,
) -> Result<Option<String>> {
    let doc = repo
        .load(client_id)?
        .ok_or_else(|| anyhow!("Site not found: {}", client_id))?;

    let mut editor = SiteEditor::new(doc);
    let message = match action {
        EditAction::Show => {
            return Ok(Some(serde_json::to_string_pretty(editor.document())?));
        }
        EditAction::Toggle { section } => {
            let active = editor.toggle(&section)?;
            let state = if active { "on" } else { "off" };
            format!("Section '{}' is now {}", section, state)
        }
        EditAction::Up { section } => moved(&section, editor.move_up(&section)?, "up"),
        EditAction::Down { section } => moved(&section, editor.move_down(&section)?, "down"),
        EditAction::Set {
            section,
            path,
            value,
        } => {
            let value = parse_value(&value);
            match &section {
                Some(section) => editor.set_field_value(section, &path, value)?,
                None => editor.set_document_field(&path, value)?,
            }
            format!("Updated {}", path)
        }
        EditAction::AddCard { section } => {
            let card = editor.add_card(&section)?;
            format!("Added card '{}' to {}", card.id, section)
        }
        EditAction::RemoveCard { section, index } => {
            let card = editor.remove_card(&section, index)?;
            format!("Removed card '{}' from {}", card.id, section)
        }
        EditAction::AddSection { section } => {
            let kind = SectionKind::parse(&section)
                .ok_or_else(|| anyhow!("Unknown section type: {}", section))?;
            editor.add_section(kind)?;
            format!("Added section '{}'", kind)
        }
    };

    repo.submit(&editor)?;
    tracing::info!("{}", message);
    Ok(None)
}

fn moved(section: &str, changed: bool, direction: &str) -> String {
    if changed {
        format!("Moved '{}' {}", section, direction)
    } else {
        format!("'{}' is already at the edge", section)
    }
}

/// Values that parse as JSON are used as such; anything else is a string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::new::create;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use vitrine_store::MemoryStore;

    fn repo() -> SiteRepository {
        let repo = SiteRepository::new(Arc::new(MemoryStore::new()));
        create(&repo, "landing-page", "bob", None, false).unwrap();
        repo
    }

    #[test]
    fn parses_json_or_falls_back_to_string() {
        assert_eq!(parse_value("3"), Value::from(3));
        assert_eq!(parse_value("true"), Value::Bool(true));
        assert_eq!(parse_value("Olá mundo"), Value::String("Olá mundo".into()));
    }

    #[test]
    fn toggle_is_persisted() {
        let repo = repo();
        let before = repo.load("bob").unwrap().unwrap();
        let first = before.sections_order[0].clone();
        let was_active = before.is_active(&first);

        apply(&repo, "bob", EditAction::Toggle { section: first.clone() }).unwrap();

        let after = repo.load("bob").unwrap().unwrap();
        assert_eq!(after.is_active(&first), !was_active);
    }

    #[test]
    fn sets_document_fields() {
        let repo = repo();

        apply(
            &repo,
            "bob",
            EditAction::Set {
                section: None,
                path: "nomeDoSite".into(),
                value: "Loja do Bob".into(),
            },
        )
        .unwrap();

        assert_eq!(repo.load("bob").unwrap().unwrap().site_name, "Loja do Bob");
    }

    #[test]
    fn failed_edits_leave_the_store_alone() {
        let repo = repo();
        let before = repo.load("bob").unwrap().unwrap();

        let err = apply(
            &repo,
            "bob",
            EditAction::Set {
                section: None,
                path: "nomeDoSite".into(),
                value: "\"\"".into(),
            },
        );

        assert!(err.is_err());
        assert_eq!(repo.load("bob").unwrap().unwrap().site_name, before.site_name);
    }

    #[test]
    fn show_prints_the_document() {
        let repo = repo();

        let output = apply(&repo, "bob", EditAction::Show).unwrap().unwrap();

        assert!(output.contains("\"clientId\": \"bob\""));
    }

    #[test]
    fn missing_site_is_an_error() {
        assert!(apply(&repo(), "nobody", EditAction::Show).is_err());
    }
}
