//! Template and section resolution.
//!
//! Resolution never fails. A document naming an unknown template gets the
//! default template; sections of unknown types are left out.

use vitrine_core::{SectionContent, SectionKind, SiteDocument};

use crate::templates::{TemplateSpec, TemplateTable};

/// One section scheduled for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedSection {
    pub kind: SectionKind,
    /// Section type as spelled in the document
    pub key: String,
    /// Content with cards sorted by `order`
    pub content: SectionContent,
}

/// The outcome of resolving a site document.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    pub template: &'a TemplateSpec,
    /// Whether the document named a template that does not exist
    pub fell_back: bool,
    pub sections: Vec<PlannedSection>,
}

impl Resolution<'_> {
    /// Section keys in render order.
    pub fn section_keys(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.key.as_str()).collect()
    }
}

/// Resolves site documents against a template table.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    templates: &'a TemplateTable,
}

impl Default for Resolver<'static> {
    fn default() -> Self {
        Self::new(TemplateTable::builtin())
    }
}

impl<'a> Resolver<'a> {
    pub fn new(templates: &'a TemplateTable) -> Self {
        Self { templates }
    }

    /// Decide the template and section plan for a document.
    ///
    /// A non-blank template id is looked up (falling back to the default
    /// template when unknown). Without one the document renders section by
    /// section.
    pub fn resolve(&self, doc: &SiteDocument) -> Resolution<'a> {
        let (template, fell_back) = match doc.template_id() {
            Some(id) => {
                let (spec, fell_back) = self.templates.resolve(id);
                if fell_back {
                    tracing::warn!(
                        "Unknown template '{}' for site {}, using '{}'",
                        id,
                        doc.client_id,
                        spec.id
                    );
                }
                (spec, fell_back)
            }
            None => (self.templates.sections_spec(), false),
        };

        Resolution {
            template,
            fell_back,
            sections: plan_sections(doc),
        }
    }
}

/// Build the ordered list of sections to render.
///
/// An explicit `layout` wins; otherwise the plan is `sectionsOrder` filtered
/// by `activeSections`. Disabled and unknown sections are dropped.
pub fn plan_sections(doc: &SiteDocument) -> Vec<PlannedSection> {
    match &doc.layout {
        Some(layout) => layout
            .iter()
            .filter(|section| section.enabled)
            .filter_map(|section| {
                let kind = known_kind(&section.section_type)?;
                let content = if section.content.kind() == Some(kind) {
                    section.content.clone()
                } else {
                    doc.content_for(kind)
                };
                Some(PlannedSection {
                    kind,
                    key: section.section_type.clone(),
                    content: content.sorted(),
                })
            })
            .collect(),
        None => doc
            .sections_order
            .iter()
            .filter(|key| doc.is_active(key))
            .filter_map(|key| {
                let kind = known_kind(key)?;
                Some(PlannedSection {
                    kind,
                    key: key.clone(),
                    content: doc.content_for(kind).sorted(),
                })
            })
            .collect(),
    }
}

fn known_kind(section_type: &str) -> Option<SectionKind> {
    let kind = SectionKind::parse(section_type);
    if kind.is_none() {
        tracing::debug!("Skipping unknown section type '{}'", section_type);
    }
    kind
}
