//! Template engine for rendering site pages.

use minijinja::{context, Environment, Value};
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

use vitrine_core::{SectionContent, SectionKind};

use crate::links::{is_safe_url, safe_url, BLOCKED_URL};
use crate::sections::{SectionContext, SectionViews, MACROS};

/// A rendered section, ready to be placed in a layout.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SectionHtml {
    pub key: String,
    pub label: String,
    pub html: String,
}

/// A navigation link to a section anchor.
#[derive(Debug, Clone, serde::Serialize)]
pub struct NavLink {
    pub anchor: String,
    pub label: String,
}

/// Context for rendering a page layout.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PageContext {
    /// Page title
    pub title: String,
    pub site_name: String,
    /// Logo URL or data URL
    pub logo: Option<String>,
    /// Extra class on `<body>`
    pub body_class: String,
    /// Inline theme stylesheet
    pub styles: String,
    pub nav: Vec<NavLink>,
    pub sections: Vec<SectionHtml>,
    pub base_url: String,
    /// Preview pages load the reload client
    pub preview: bool,
}

/// A site listed on the index page.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SiteLink {
    pub client_id: String,
    pub name: String,
    pub href: String,
    pub template: String,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
    views: SectionViews,
}

impl TemplateEngine {
    /// Create an engine with the built-in section views.
    pub fn new() -> Self {
        Self::with_views(SectionViews::builtin().clone())
    }

    /// Create an engine with a custom table of section views.
    pub fn with_views(views: SectionViews) -> Self {
        let mut env = Environment::new();
        env.add_filter("markdown", markdown_filter);
        env.add_filter("safe_url", safe_url_filter);

        env.add_template("base.html", BASE_TEMPLATE)
            .expect("Failed to add base template");
        env.add_template("macros.html", MACROS)
            .expect("Failed to add macros template");
        env.add_template("layouts/classic.html", CLASSIC_TEMPLATE)
            .expect("Failed to add classic layout");
        env.add_template("layouts/split.html", SPLIT_TEMPLATE)
            .expect("Failed to add split layout");
        env.add_template("layouts/stacked.html", STACKED_TEMPLATE)
            .expect("Failed to add stacked layout");
        env.add_template("layouts/sections.html", SECTIONS_TEMPLATE)
            .expect("Failed to add sections layout");
        env.add_template("index.html", INDEX_TEMPLATE)
            .expect("Failed to add index template");
        env.add_template("not_found.html", NOT_FOUND_TEMPLATE)
            .expect("Failed to add not found template");

        for view in views.iter() {
            env.add_template(view.name, view.source)
                .expect("Failed to add section template");
        }

        Self { env, views }
    }

    pub fn views(&self) -> &SectionViews {
        &self.views
    }

    /// Render one section.
    ///
    /// Kinds without a view render as the empty string. Content of another
    /// kind is replaced by the kind's empty content.
    pub fn render_section(
        &self,
        kind: SectionKind,
        key: &str,
        content: &SectionContent,
        ctx: &SectionContext,
    ) -> Result<String, minijinja::Error> {
        let Some(view) = self.views.get(kind) else {
            tracing::debug!("No view for section '{}'", kind);
            return Ok(String::new());
        };

        let fallback;
        let content = if content.kind() == Some(kind) {
            content
        } else {
            fallback = kind.default_content().sorted();
            &fallback
        };

        let tmpl = self.env.get_template(view.name)?;
        tmpl.render(context! {
            kind => kind.as_str(),
            key => key,
            content => content,
            ctx => ctx,
        })
    }

    /// Render a page using the specified layout template.
    pub fn render_page(
        &self,
        template: &str,
        context: &PageContext,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(template)?;
        tmpl.render(context! { page => context })
    }

    /// Render the list of sites.
    pub fn render_index(
        &self,
        sites: &[SiteLink],
        base_url: &str,
        styles: &str,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("index.html")?;
        tmpl.render(context! {
            sites => sites,
            base_url => base_url,
            styles => styles,
        })
    }

    /// Render the not-found page.
    pub fn render_not_found(
        &self,
        path: &str,
        base_url: &str,
        styles: &str,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("not_found.html")?;
        tmpl.render(context! {
            path => path,
            base_url => base_url,
            styles => styles,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Render markdown to HTML. Raw HTML in the source is shown as text.
pub fn render_markdown(content: &str) -> String {
    let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
    let parser = Parser::new_ext(content, options).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_dest(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_dest(dest_url),
            title,
            id,
        }),
        other => other,
    });

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    html_output
}

fn safe_dest(dest: CowStr<'_>) -> CowStr<'_> {
    if is_safe_url(&dest) {
        dest
    } else {
        CowStr::Borrowed(BLOCKED_URL)
    }
}

fn safe_url_filter(value: String) -> String {
    safe_url(&value).to_string()
}

fn markdown_filter(value: String) -> Value {
    Value::from_safe_string(render_markdown(&value))
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="pt-BR">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ page.title }}</title>
  {% if page.logo %}<link rel="icon" href="{{ page.logo | safe_url }}">{% endif %}
  <style>{{ page.styles | safe }}</style>
</head>
<body class="{{ page.body_class }}">
{% block body %}{% endblock %}
{% if page.preview %}
  <script src="{{ page.base_url }}__reload.js"></script>
{% endif %}
</body>
</html>"##;

const CLASSIC_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block body %}
  <header class="site-header">
    <a class="site-brand" href="#">
      {% if page.logo %}<img class="site-logo" src="{{ page.logo | safe_url }}" alt="{{ page.site_name }}">{% endif %}
      <span>{{ page.site_name }}</span>
    </a>
    <nav class="site-nav">
      {% for link in page.nav %}<a href="#{{ link.anchor }}">{{ link.label }}</a>{% endfor %}
    </nav>
  </header>
  <main class="layout-classic">
    {% for section in page.sections %}{{ section.html | safe }}
    {% endfor %}
  </main>
{% endblock %}"##;

const SPLIT_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block body %}
  <div class="layout-split">
    <header class="site-header">
      <a class="site-brand" href="#">
        {% if page.logo %}<img class="site-logo" src="{{ page.logo | safe_url }}" alt="{{ page.site_name }}">{% endif %}
        <span>{{ page.site_name }}</span>
      </a>
      <nav class="site-nav">
        {% for link in page.nav %}<a href="#{{ link.anchor }}">{{ link.label }}</a>{% endfor %}
      </nav>
    </header>
    <main>
      {% for section in page.sections %}{{ section.html | safe }}
      {% endfor %}
    </main>
  </div>
{% endblock %}"##;

const STACKED_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block body %}
  <div class="layout-stacked">
    {% if page.logo %}<header class="site-header"><img class="site-logo" src="{{ page.logo | safe_url }}" alt="{{ page.site_name }}"></header>{% endif %}
    <main>
      {% for section in page.sections %}{{ section.html | safe }}
      {% endfor %}
    </main>
  </div>
{% endblock %}"##;

const SECTIONS_TEMPLATE: &str = r##"{% extends "base.html" %}
{% block body %}
  {% for section in page.sections %}{{ section.html | safe }}
  {% endfor %}
{% endblock %}"##;

const INDEX_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="pt-BR">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Sites</title>
  <style>{{ styles | safe }}</style>
</head>
<body>
  <main class="section">
    <h1 class="section-title">Sites</h1>
    {% if sites %}
    <ul class="site-list">
      {% for site in sites %}
      <li><a href="{{ site.href }}">{{ site.name or site.client_id }}</a> <small>{{ site.template }}</small></li>
      {% endfor %}
    </ul>
    {% else %}
    <p>Nenhum site publicado ainda.</p>
    {% endif %}
  </main>
</body>
</html>"##;

const NOT_FOUND_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="pt-BR">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Página não encontrada</title>
  <style>{{ styles | safe }}</style>
</head>
<body>
  <main class="section not-found">
    <h1 class="section-title">Página não encontrada</h1>
    <p>Não existe nada em <code>{{ path }}</code>.</p>
    <p><a class="button button-primary" href="{{ base_url }}">Voltar ao início</a></p>
  </main>
</body>
</html>"##;
