//! Full-page rendering of site documents.

use vitrine_core::{Colors, SiteDocument};

use crate::engine::{NavLink, PageContext, SectionHtml, SiteLink, TemplateEngine};
use crate::links::whatsapp_number;
use crate::resolver::Resolver;
use crate::sections::SectionContext;
use crate::templates::TemplateTable;
use crate::theme::Theme;

/// Whether a page is served to visitors or to the site's editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Live,
    /// Forms disabled, reload client mounted
    Preview,
}

/// Options shared by every page a renderer produces.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Base URL the site is served under, ending in `/`
    pub base_url: String,
    /// Minify the inline stylesheet
    pub minify: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            base_url: "/".to_string(),
            minify: true,
        }
    }
}

/// A rendered site page.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub html: String,
    /// Id of the template actually used
    pub template_id: &'static str,
    /// Whether the document's template was unknown
    pub fell_back: bool,
    /// Section types rendered, in order
    pub sections: Vec<String>,
}

/// Errors that can occur while rendering.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Template error in {template}: {source}")]
    Template {
        template: String,
        #[source]
        source: minijinja::Error,
    },
}

impl RenderError {
    fn template(template: impl Into<String>) -> impl FnOnce(minijinja::Error) -> RenderError {
        let template = template.into();
        move |source| RenderError::Template { template, source }
    }
}

/// Renders site documents to HTML.
pub struct SiteRenderer {
    engine: TemplateEngine,
    templates: &'static TemplateTable,
    options: RenderOptions,
}

impl SiteRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self::with_engine(TemplateEngine::new(), options)
    }

    pub fn with_engine(engine: TemplateEngine, options: RenderOptions) -> Self {
        let mut options = options;
        if !options.base_url.ends_with('/') {
            options.base_url.push('/');
        }
        Self {
            engine,
            templates: TemplateTable::builtin(),
            options,
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Public URL of a site's live page.
    pub fn site_href(&self, client_id: &str) -> String {
        format!("{}sites/{}/", self.options.base_url, client_id)
    }

    /// Render a site document.
    ///
    /// Never fails on document content: unknown templates and sections
    /// degrade to defaults. Errors only come from the template engine.
    pub fn render(&self, doc: &SiteDocument, mode: RenderMode) -> Result<RenderedPage, RenderError> {
        let resolution = Resolver::new(self.templates).resolve(doc);
        let spec = resolution.template;
        let preview = mode == RenderMode::Preview;

        let ctx = SectionContext {
            site_name: doc.site_name.clone(),
            client_id: doc.client_id.clone(),
            whatsapp: doc.whatsapp.as_deref().and_then(whatsapp_number),
            preview,
            base_url: self.options.base_url.clone(),
            contact_action: format!("{}contact", self.site_href(&doc.client_id)),
        };

        let mut sections = Vec::with_capacity(resolution.sections.len());
        let mut nav = Vec::new();
        for planned in &resolution.sections {
            let html = self
                .engine
                .render_section(planned.kind, planned.kind.as_str(), &planned.content, &ctx)
                .map_err(RenderError::template(planned.kind.as_str()))?;

            if !matches!(
                planned.kind,
                vitrine_core::SectionKind::Hero | vitrine_core::SectionKind::Footer
            ) {
                nav.push(NavLink {
                    anchor: planned.kind.as_str().to_string(),
                    label: planned.kind.label().to_string(),
                });
            }
            sections.push(SectionHtml {
                key: planned.key.clone(),
                label: planned.kind.label().to_string(),
                html,
            });
        }

        let title = if doc.site_name.trim().is_empty() {
            doc.client_id.clone()
        } else {
            doc.site_name.clone()
        };

        let page = PageContext {
            title,
            site_name: doc.site_name.clone(),
            logo: doc.logo.clone(),
            body_class: spec.body_class.to_string(),
            styles: Theme::new(&doc.colors, spec).stylesheet(self.options.minify),
            nav,
            sections,
            base_url: self.options.base_url.clone(),
            preview,
        };

        let layout = spec.layout.template_name();
        let html = self
            .engine
            .render_page(layout, &page)
            .map_err(RenderError::template(layout))?;

        tracing::debug!(
            "Rendered {} with template '{}' ({} sections)",
            doc.client_id,
            spec.id,
            page.sections.len()
        );

        Ok(RenderedPage {
            html,
            template_id: spec.id,
            fell_back: resolution.fell_back,
            sections: page.sections.into_iter().map(|s| s.key).collect(),
        })
    }

    /// Render the list of sites.
    pub fn render_index(&self, sites: &[SiteDocument]) -> Result<String, RenderError> {
        let links: Vec<SiteLink> = sites
            .iter()
            .map(|doc| SiteLink {
                client_id: doc.client_id.clone(),
                name: doc.site_name.clone(),
                href: self.site_href(&doc.client_id),
                template: doc
                    .template_id()
                    .map(|id| self.templates.resolve(id).0.id)
                    .unwrap_or(self.templates.sections_spec().id)
                    .to_string(),
            })
            .collect();

        self.engine
            .render_index(&links, &self.options.base_url, &self.default_styles())
            .map_err(RenderError::template("index.html"))
    }

    /// Render the not-found page for a request path.
    pub fn render_not_found(&self, path: &str) -> Result<String, RenderError> {
        self.engine
            .render_not_found(path, &self.options.base_url, &self.default_styles())
            .map_err(RenderError::template("not_found.html"))
    }

    fn default_styles(&self) -> String {
        Theme::new(&Colors::default(), self.templates.default_spec()).stylesheet(self.options.minify)
    }
}

impl Default for SiteRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}
