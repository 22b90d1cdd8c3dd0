//! The table of visual templates.
//!
//! Every template id, and every alias a stored document may carry, maps to one
//! [`TemplateSpec`]. Lookups normalize the id (trimmed, lowercase, `_` and
//! spaces read as `-`); ids that match nothing resolve to the default template.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Id of the general-purpose template unknown ids fall back to.
pub const DEFAULT_TEMPLATE: &str = "geral";

/// Id of the plain section-by-section page used when a document names no
/// template.
pub const SECTIONS_TEMPLATE: &str = "secoes";

/// Page skeleton a template renders its sections into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Top header with logo and navigation
    Classic,
    /// Fixed side navigation
    Split,
    /// Narrow single column without navigation
    Stacked,
    /// Bare sections, no chrome
    Sections,
}

impl Layout {
    /// Name of the page template in the engine.
    pub fn template_name(self) -> &'static str {
        match self {
            Layout::Classic => "layouts/classic.html",
            Layout::Split => "layouts/split.html",
            Layout::Stacked => "layouts/stacked.html",
            Layout::Sections => "layouts/sections.html",
        }
    }
}

/// A visual template.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TemplateSpec {
    pub id: &'static str,
    #[serde(skip)]
    pub aliases: &'static [&'static str],
    pub name: &'static str,
    pub layout: Layout,
    /// CSS font stack
    pub font: &'static str,
    /// Extra class on `<body>`
    pub body_class: &'static str,
    /// Dark surfaces with light text, regardless of document colors
    pub dark: bool,
}

const SANS: &str = "\"Inter\", system-ui, -apple-system, \"Segoe UI\", sans-serif";
const SERIF: &str = "\"Merriweather\", Georgia, \"Times New Roman\", serif";
const ROUNDED: &str = "\"Nunito\", \"Trebuchet MS\", system-ui, sans-serif";

static BUILTIN_TEMPLATES: &[TemplateSpec] = &[
    TemplateSpec {
        id: DEFAULT_TEMPLATE,
        aliases: &["general", "default", "padrao", "site-geral"],
        name: "Geral",
        layout: Layout::Classic,
        font: SANS,
        body_class: "tpl-geral",
        dark: false,
    },
    TemplateSpec {
        id: "landing",
        aliases: &["landing-page", "landingpage", "lp", "pagina-unica"],
        name: "Landing Page",
        layout: Layout::Stacked,
        font: SANS,
        body_class: "tpl-landing",
        dark: false,
    },
    TemplateSpec {
        id: "institucional",
        aliases: &["institutional", "site-institucional", "empresa", "corporativo"],
        name: "Institucional",
        layout: Layout::Classic,
        font: SERIF,
        body_class: "tpl-institucional",
        dark: false,
    },
    TemplateSpec {
        id: "portfolio",
        aliases: &["portfolio-pessoal", "portifolio", "galeria"],
        name: "Portfólio",
        layout: Layout::Split,
        font: SANS,
        body_class: "tpl-portfolio",
        dark: false,
    },
    TemplateSpec {
        id: "representante",
        aliases: &["representative", "mmn", "representante-mmn", "consultora", "revendedor"],
        name: "Representante",
        layout: Layout::Classic,
        font: ROUNDED,
        body_class: "tpl-representante",
        dark: false,
    },
    TemplateSpec {
        id: "catalogo",
        aliases: &["catalog", "catalogo-produtos", "loja", "vitrine"],
        name: "Catálogo",
        layout: Layout::Classic,
        font: ROUNDED,
        body_class: "tpl-catalogo",
        dark: false,
    },
    TemplateSpec {
        id: "minimal",
        aliases: &["minimo", "minimalista", "simples", "site-simples"],
        name: "Minimalista",
        layout: Layout::Stacked,
        font: SERIF,
        body_class: "tpl-minimal",
        dark: false,
    },
    TemplateSpec {
        id: "escuro",
        aliases: &["dark", "noturno", "dark-mode"],
        name: "Escuro",
        layout: Layout::Classic,
        font: SANS,
        body_class: "tpl-escuro",
        dark: true,
    },
    TemplateSpec {
        id: SECTIONS_TEMPLATE,
        aliases: &["sections", "dinamico", "dynamic"],
        name: "Seções",
        layout: Layout::Sections,
        font: SANS,
        body_class: "tpl-secoes",
        dark: false,
    },
];

static BUILTIN_TABLE: LazyLock<TemplateTable> =
    LazyLock::new(|| TemplateTable::new(BUILTIN_TEMPLATES));

/// Normalize a template id for lookup.
fn normalize(id: &str) -> String {
    id.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c.is_whitespace() { '-' } else { c })
        .collect()
}

/// Lookup table from template ids and aliases to specs.
#[derive(Debug, Clone)]
pub struct TemplateTable {
    specs: &'static [TemplateSpec],
    index: HashMap<String, usize>,
}

impl TemplateTable {
    /// Index a list of specs. The first spec claiming a key wins.
    pub fn new(specs: &'static [TemplateSpec]) -> Self {
        let mut index = HashMap::new();
        for (i, spec) in specs.iter().enumerate() {
            for key in std::iter::once(&spec.id).chain(spec.aliases.iter()) {
                index.entry(normalize(key)).or_insert(i);
            }
        }
        Self { specs, index }
    }

    /// The table of built-in templates.
    pub fn builtin() -> &'static TemplateTable {
        &BUILTIN_TABLE
    }

    /// All templates, in definition order.
    pub fn specs(&self) -> &[TemplateSpec] {
        self.specs
    }

    /// Exact lookup by id or alias.
    pub fn get(&self, id: &str) -> Option<&TemplateSpec> {
        self.index.get(&normalize(id)).map(|&i| &self.specs[i])
    }

    /// Lookup that never fails: unknown ids yield the default template.
    ///
    /// The flag reports whether the fallback was taken.
    pub fn resolve(&self, id: &str) -> (&TemplateSpec, bool) {
        match self.get(id) {
            Some(spec) => (spec, false),
            None => (self.default_spec(), true),
        }
    }

    /// The default template.
    pub fn default_spec(&self) -> &TemplateSpec {
        self.get(DEFAULT_TEMPLATE).unwrap_or(&self.specs[0])
    }

    /// The section-by-section template.
    pub fn sections_spec(&self) -> &TemplateSpec {
        self.get(SECTIONS_TEMPLATE)
            .unwrap_or_else(|| self.default_spec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looks_up_ids_and_aliases_case_insensitively() {
        let table = TemplateTable::builtin();

        assert_eq!(table.get("Landing").unwrap().id, "landing");
        assert_eq!(table.get("LANDING_PAGE").unwrap().id, "landing");
        assert_eq!(table.get(" representante mmn ").unwrap().id, "representante");
        assert!(table.get("unknown-template-x").is_none());
    }

    #[test]
    fn unknown_ids_fall_back_to_default() {
        let (spec, fell_back) = TemplateTable::builtin().resolve("unknown-template-x");

        assert_eq!(spec.id, DEFAULT_TEMPLATE);
        assert!(fell_back);
    }

    #[test]
    fn known_ids_do_not_fall_back() {
        let (spec, fell_back) = TemplateTable::builtin().resolve("escuro");

        assert_eq!(spec.id, "escuro");
        assert!(spec.dark);
        assert!(!fell_back);
    }

    #[test]
    fn every_catalog_model_template_exists() {
        for model in vitrine_core::Catalog::builtin().models() {
            assert!(
                TemplateTable::builtin().get(&model.template).is_some(),
                "model {} uses missing template {}",
                model.id,
                model.template
            );
        }
    }

    #[test]
    fn aliases_are_unique_across_templates() {
        let total: usize = BUILTIN_TEMPLATES
            .iter()
            .map(|s| 1 + s.aliases.len())
            .sum();

        assert_eq!(TemplateTable::builtin().index.len(), total);
    }
}
