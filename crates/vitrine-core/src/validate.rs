//! Site document validation.

use std::collections::HashSet;

use thiserror::Error;

use crate::model::SiteDocument;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    Required {
        field: &'static str,
        message: &'static str,
    },

    #[error("active section '{0}' is not in the section order")]
    ActiveNotOrdered(String),

    #[error("section '{0}' appears more than once in the section order")]
    DuplicateOrder(String),
}

impl ValidationError {
    /// Name of the document field the error belongs to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field, .. } => field,
            ValidationError::ActiveNotOrdered(_) => "activeSections",
            ValidationError::DuplicateOrder(_) => "sectionsOrder",
        }
    }
}

/// Check the structural invariants every stored document must hold.
pub fn validate_document(doc: &SiteDocument) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for section in &doc.sections_order {
        if !seen.insert(section.to_ascii_lowercase()) {
            return Err(ValidationError::DuplicateOrder(section.clone()));
        }
    }

    for active in &doc.active_sections {
        if !seen.contains(&active.to_ascii_lowercase()) {
            return Err(ValidationError::ActiveNotOrdered(active.clone()));
        }
    }

    Ok(())
}

/// Check a document before it is submitted for saving.
///
/// Collects every failure so the editor can show all field messages at once.
pub fn validate_for_submit(doc: &SiteDocument) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if doc.site_name.trim().is_empty() {
        errors.push(ValidationError::Required {
            field: "nomeDoSite",
            message: "O nome do site é obrigatório",
        });
    }

    if doc.client_id.trim().is_empty() {
        errors.push(ValidationError::Required {
            field: "clientId",
            message: "O cliente é obrigatório",
        });
    }

    if let Err(e) = validate_document(doc) {
        errors.push(e);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
