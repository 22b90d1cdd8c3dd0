//! Theme stylesheet generation.

use vitrine_core::Colors;

use crate::templates::TemplateSpec;

const DARK_BACKGROUND: &str = "#121417";
const DARK_TEXT: &str = "#eceff1";

/// Colors and fonts a page is styled with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub principal: String,
    pub background: String,
    pub accent: String,
    pub text: String,
    pub hero_from: String,
    pub hero_to: String,
    pub font: String,
}

impl Theme {
    /// Derive a theme from document colors and a template.
    ///
    /// Values that could break out of a declaration are replaced by the
    /// default palette. Dark templates keep the brand colors but force dark
    /// surfaces.
    pub fn new(colors: &Colors, spec: &TemplateSpec) -> Self {
        let defaults = Colors::default();
        let principal = css_value(&colors.principal, &defaults.principal);
        let accent = css_value(&colors.accent, &defaults.accent);

        let (background, text) = if spec.dark {
            (DARK_BACKGROUND.to_string(), DARK_TEXT.to_string())
        } else {
            (
                css_value(&colors.background, &defaults.background),
                css_value(&colors.text, &defaults.text),
            )
        };

        let (hero_from, hero_to) = match &colors.hero_gradient {
            Some(gradient) => (
                css_value(&gradient.from, &principal),
                css_value(&gradient.to, &principal),
            ),
            None => (principal.clone(), principal.clone()),
        };

        Self {
            principal,
            background,
            accent,
            text,
            hero_from,
            hero_to,
            font: spec.font.to_string(),
        }
    }

    /// The `:root` block declaring the theme's custom properties.
    pub fn variables(&self) -> String {
        format!(
            ":root {{\n  --color-principal: {};\n  --color-background: {};\n  --color-accent: {};\n  --color-text: {};\n  --hero-from: {};\n  --hero-to: {};\n  --font-body: {};\n}}\n",
            self.principal,
            self.background,
            self.accent,
            self.text,
            self.hero_from,
            self.hero_to,
            self.font
        )
    }

    /// Full page stylesheet, optionally minified.
    pub fn stylesheet(&self, minify: bool) -> String {
        let css = format!("{}{}", self.variables(), BASE_CSS);
        if !minify {
            return css;
        }
        match minify_css(&css) {
            Ok(minified) => minified,
            Err(e) => {
                tracing::warn!("Serving unminified theme: {}", e);
                css
            }
        }
    }
}

/// Minify CSS using lightningcss.
pub fn minify_css(css: &str) -> Result<String, String> {
    use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

    let stylesheet = StyleSheet::parse(css, ParserOptions::default())
        .map_err(|e| format!("CSS parse error: {}", e))?;

    let minified = stylesheet
        .to_css(PrinterOptions {
            minify: true,
            ..Default::default()
        })
        .map_err(|e| format!("CSS minify error: {}", e))?;

    Ok(minified.code)
}

fn css_value(value: &str, fallback: &str) -> String {
    let value = value.trim();
    if value.is_empty() || value.contains([';', '{', '}', '<', '>']) {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

const BASE_CSS: &str = r#"
* {
  box-sizing: border-box;
  margin: 0;
  padding: 0;
}

body {
  font-family: var(--font-body);
  background: var(--color-background);
  color: var(--color-text);
  line-height: 1.6;
}

img {
  max-width: 100%;
  display: block;
}

a {
  color: var(--color-principal);
}

.section {
  padding: 4rem 1.5rem;
  max-width: 1100px;
  margin: 0 auto;
}

.section-title {
  font-size: 2rem;
  margin-bottom: 0.5rem;
  color: var(--color-principal);
}

.section-subtitle {
  opacity: 0.8;
  margin-bottom: 2rem;
}

.button {
  display: inline-block;
  padding: 0.75rem 1.5rem;
  border-radius: 999px;
  border: none;
  font-weight: 600;
  text-decoration: none;
  cursor: pointer;
}

.button-primary {
  background: var(--color-principal);
  color: #fff;
}

.button-accent,
.button-small {
  background: var(--color-accent);
  color: #111;
}

.button-small {
  padding: 0.4rem 1rem;
  font-size: 0.9rem;
}

.button-whatsapp {
  background: #25d366;
  color: #fff;
}

/* Page chrome */
.site-header {
  display: flex;
  align-items: center;
  justify-content: space-between;
  padding: 1rem 1.5rem;
  border-bottom: 1px solid rgba(0, 0, 0, 0.08);
}

.site-brand {
  display: flex;
  align-items: center;
  gap: 0.75rem;
  font-weight: 700;
  color: var(--color-text);
  text-decoration: none;
}

.site-logo {
  height: 48px;
  width: auto;
}

.site-nav a {
  margin-left: 1rem;
  text-decoration: none;
}

.layout-split {
  display: grid;
  grid-template-columns: 240px 1fr;
  min-height: 100vh;
}

.layout-split .site-header {
  flex-direction: column;
  align-items: flex-start;
  position: sticky;
  top: 0;
  height: 100vh;
  border-bottom: none;
  border-right: 1px solid rgba(0, 0, 0, 0.08);
}

.layout-split .site-nav a {
  display: block;
  margin: 0.5rem 0;
}

.layout-stacked main {
  max-width: 760px;
  margin: 0 auto;
}

/* Sections */
.section-hero {
  max-width: none;
  background: linear-gradient(135deg, var(--hero-from), var(--hero-to));
  color: #fff;
}

.hero-inner {
  max-width: 1100px;
  margin: 0 auto;
  display: flex;
  gap: 2rem;
  align-items: center;
}

.section-hero h1 {
  font-size: 2.75rem;
  line-height: 1.2;
}

.hero-subtitle {
  font-size: 1.2rem;
  margin: 1rem 0 2rem;
}

.hero-image {
  max-width: 45%;
  border-radius: 1rem;
}

.about-body {
  display: flex;
  gap: 2rem;
}

.about-image {
  max-width: 40%;
  border-radius: 1rem;
}

.card-grid {
  display: grid;
  grid-template-columns: repeat(auto-fill, minmax(240px, 1fr));
  gap: 1.5rem;
}

.card,
.member {
  padding: 1.5rem;
  border-radius: 1rem;
  background: rgba(0, 0, 0, 0.03);
}

.card-icon {
  font-size: 2rem;
}

.card-image {
  border-radius: 0.75rem;
  margin-bottom: 1rem;
}

.price {
  font-weight: 700;
  color: var(--color-principal);
  margin: 0.5rem 0 1rem;
}

.quotes {
  display: grid;
  grid-template-columns: repeat(auto-fill, minmax(280px, 1fr));
  gap: 1.5rem;
}

.quote {
  padding: 1.5rem;
  border-left: 4px solid var(--color-accent);
}

.quote footer {
  display: flex;
  align-items: center;
  gap: 0.75rem;
  margin-top: 1rem;
}

.avatar {
  width: 48px;
  height: 48px;
  border-radius: 50%;
  object-fit: cover;
}

.gallery {
  display: grid;
  grid-template-columns: repeat(auto-fill, minmax(220px, 1fr));
  gap: 1rem;
}

.gallery img {
  border-radius: 0.75rem;
  aspect-ratio: 1;
  object-fit: cover;
}

.faq details {
  padding: 1rem 0;
  border-bottom: 1px solid rgba(0, 0, 0, 0.1);
}

.faq summary {
  font-weight: 600;
  cursor: pointer;
}

.section-cta {
  text-align: center;
  background: var(--color-principal);
  color: #fff;
  max-width: none;
}

.section-cta p {
  margin: 1rem 0 2rem;
}

.contact-grid {
  display: grid;
  grid-template-columns: 1fr 2fr;
  gap: 2rem;
}

.contact-info {
  list-style: none;
}

.contact-info li {
  margin-bottom: 0.75rem;
}

.contact-form label {
  display: block;
  margin-bottom: 1rem;
}

.contact-form input,
.contact-form textarea {
  display: block;
  width: 100%;
  padding: 0.6rem;
  border: 1px solid rgba(0, 0, 0, 0.2);
  border-radius: 0.5rem;
  font: inherit;
}

.contact-form fieldset {
  border: none;
}

.form-note {
  font-size: 0.85rem;
  opacity: 0.7;
}

.section-footer {
  text-align: center;
  font-size: 0.9rem;
  opacity: 0.8;
}

.social a {
  margin: 0 0.5rem;
}

/* Dark template */
.tpl-escuro .card,
.tpl-escuro .member {
  background: rgba(255, 255, 255, 0.06);
}

.tpl-escuro .site-header {
  border-color: rgba(255, 255, 255, 0.1);
}

@media (max-width: 720px) {
  .hero-inner,
  .about-body {
    flex-direction: column;
  }

  .hero-image,
  .about-image {
    max-width: 100%;
  }

  .contact-grid,
  .layout-split {
    grid-template-columns: 1fr;
  }

  .layout-split .site-header {
    position: static;
    height: auto;
  }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::TemplateTable;
    use vitrine_core::Gradient;

    fn spec(id: &str) -> &'static TemplateSpec {
        TemplateTable::builtin().get(id).unwrap()
    }

    #[test]
    fn exposes_document_colors_as_variables() {
        let colors = Colors {
            principal: "#123456".to_string(),
            ..Colors::default()
        };

        let css = Theme::new(&colors, spec("geral")).variables();

        assert!(css.contains("--color-principal: #123456;"));
        assert!(css.contains("--hero-from: #123456;"));
    }

    #[test]
    fn rejects_values_that_escape_the_declaration() {
        let colors = Colors {
            accent: "red;} body { display: none".to_string(),
            text: "  ".to_string(),
            ..Colors::default()
        };

        let theme = Theme::new(&colors, spec("geral"));

        assert_eq!(theme.accent, Colors::default().accent);
        assert_eq!(theme.text, Colors::default().text);
    }

    #[test]
    fn dark_templates_force_dark_surfaces() {
        let theme = Theme::new(&Colors::default(), spec("escuro"));

        assert_eq!(theme.background, DARK_BACKGROUND);
        assert_eq!(theme.text, DARK_TEXT);
        assert_eq!(theme.principal, Colors::default().principal);
    }

    #[test]
    fn uses_hero_gradient_when_present() {
        let colors = Colors {
            hero_gradient: Some(Gradient {
                from: "#000000".to_string(),
                to: "#ffffff".to_string(),
            }),
            ..Colors::default()
        };

        let theme = Theme::new(&colors, spec("landing"));

        assert_eq!(theme.hero_from, "#000000");
        assert_eq!(theme.hero_to, "#ffffff");
    }

    #[test]
    fn minified_stylesheet_is_smaller() {
        let theme = Theme::new(&Colors::default(), spec("geral"));

        let full = theme.stylesheet(false);
        let minified = theme.stylesheet(true);

        assert!(minified.len() < full.len());
        assert!(minified.contains("--color-principal"));
    }
}
