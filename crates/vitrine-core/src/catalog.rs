//! Site model registry.
//!
//! The built-in models live in `catalog/models.yaml`, embedded at compile
//! time and parsed once on first use. Lookups are case-insensitive and never
//! fail: an unknown id is simply `None`.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::model::{Colors, SectionKind, SiteDocument, SiteSection};

const BUILTIN_MODELS: &str = include_str!("../catalog/models.yaml");

static BUILTIN: LazyLock<Catalog> = LazyLock::new(|| {
    Catalog::from_yaml(BUILTIN_MODELS).expect("Built-in site model catalog is valid")
});

/// Site model categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Landing,
    Institutional,
    Portfolio,
    Representative,
    Catalog,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Landing => "landing",
            Category::Institutional => "institutional",
            Category::Portfolio => "portfolio",
            Category::Representative => "representative",
            Category::Catalog => "catalog",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "landing" => Ok(Category::Landing),
            "institutional" => Ok(Category::Institutional),
            "portfolio" => Ok(Category::Portfolio),
            "representative" => Ok(Category::Representative),
            "catalog" => Ok(Category::Catalog),
            other => Err(CatalogError::UnknownCategory(other.to_string())),
        }
    }
}

/// A predefined site composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteModel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    /// Template new documents start with
    pub template: String,
    #[serde(default)]
    pub colors: Colors,
    pub sections: Vec<SiteSection>,
}

impl SiteModel {
    /// Create the initial draft document for a client from this model.
    ///
    /// Every model section lands in the section order; only enabled ones are
    /// active.
    pub fn new_document(&self, client_id: &str) -> SiteDocument {
        let mut doc = SiteDocument::new(client_id);
        doc.template = Some(self.template.clone());
        doc.site_name = self.name.clone();
        doc.colors = self.colors.clone();

        let mut sections = BTreeMap::new();
        for section in &self.sections {
            let key = section.section_type.to_ascii_lowercase();
            doc.sections_order.push(key.clone());
            if section.enabled {
                doc.active_sections.push(key.clone());
            }
            sections.insert(key, section.content.clone());
        }
        doc.sections = sections;

        doc
    }
}

/// An immutable collection of site models.
#[derive(Debug, Clone)]
pub struct Catalog {
    models: Vec<SiteModel>,
}

impl Catalog {
    /// The catalog compiled into the binary.
    pub fn builtin() -> &'static Catalog {
        &BUILTIN
    }

    /// Parse and check a YAML list of site models.
    pub fn from_yaml(source: &str) -> Result<Self, CatalogError> {
        let models: Vec<SiteModel> =
            serde_yaml::from_str(source).map_err(|e| CatalogError::InvalidYaml(e.to_string()))?;

        let mut ids = HashSet::new();
        for model in &models {
            if !ids.insert(model.id.to_ascii_lowercase()) {
                return Err(CatalogError::DuplicateModel(model.id.clone()));
            }

            for section in &model.sections {
                let kind = SectionKind::parse(&section.section_type).ok_or_else(|| {
                    CatalogError::UnknownSection {
                        model: model.id.clone(),
                        section: section.section_type.clone(),
                    }
                })?;

                if section.content.kind() != Some(kind) {
                    return Err(CatalogError::ContentMismatch {
                        model: model.id.clone(),
                        section: section.section_type.clone(),
                    });
                }
            }
        }

        Ok(Self { models })
    }

    /// All models, in catalog order.
    pub fn models(&self) -> &[SiteModel] {
        &self.models
    }

    /// Look up a model by id (case-insensitive).
    pub fn get(&self, id: &str) -> Option<&SiteModel> {
        let id = id.trim();
        self.models.iter().find(|m| m.id.eq_ignore_ascii_case(id))
    }

    /// Models of a category, or every model when `category` is `None`.
    pub fn by_category(&self, category: Option<Category>) -> Vec<&SiteModel> {
        self.models
            .iter()
            .filter(|m| category.map_or(true, |c| m.category == c))
            .collect()
    }
}

/// Look up a built-in site model.
pub fn get_site_model(id: &str) -> Option<&'static SiteModel> {
    Catalog::builtin().get(id)
}

/// Built-in site models, optionally filtered by category.
pub fn site_models_by_category(category: Option<Category>) -> Vec<&'static SiteModel> {
    Catalog::builtin().by_category(category)
}

/// Errors that can occur when loading a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Invalid YAML in site model catalog: {0}")]
    InvalidYaml(String),

    #[error("Duplicate site model id: {0}")]
    DuplicateModel(String),

    #[error("Site model {model} has unknown section type '{section}'")]
    UnknownSection { model: String, section: String },

    #[error("Site model {model} has content of another type in section '{section}'")]
    ContentMismatch { model: String, section: String },

    #[error("Unknown site model category: {0}")]
    UnknownCategory(String),
}
