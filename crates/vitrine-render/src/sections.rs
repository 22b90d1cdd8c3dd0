//! Section views.
//!
//! Each section kind renders through its own minijinja template. The table of
//! views is fixed when the engine is built; a kind without a view renders as
//! nothing.

use std::collections::HashMap;
use std::sync::LazyLock;

use vitrine_core::SectionKind;

/// A section template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionView {
    pub kind: SectionKind,
    /// Name the template is registered under
    pub name: &'static str,
    pub source: &'static str,
}

/// Values shared by every section of a page.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct SectionContext {
    pub site_name: String,
    pub client_id: String,
    /// Normalized WhatsApp number, if the site has a dialable one
    pub whatsapp: Option<String>,
    /// Preview pages mount forms disabled
    pub preview: bool,
    pub base_url: String,
    /// Where the contact form posts to
    pub contact_action: String,
}

/// Lookup table from section kind to view.
#[derive(Debug, Clone)]
pub struct SectionViews {
    views: HashMap<SectionKind, SectionView>,
}

static BUILTIN_VIEWS: LazyLock<SectionViews> =
    LazyLock::new(|| SectionViews::new(BUILTIN.iter().copied()));

impl SectionViews {
    pub fn new(views: impl IntoIterator<Item = SectionView>) -> Self {
        Self {
            views: views.into_iter().map(|v| (v.kind, v)).collect(),
        }
    }

    /// A view for every section kind.
    pub fn builtin() -> &'static SectionViews {
        &BUILTIN_VIEWS
    }

    pub fn get(&self, kind: SectionKind) -> Option<&SectionView> {
        self.views.get(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SectionView> {
        self.views.values()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

/// Shared template macros.
pub(crate) const MACROS: &str = r##"{% macro whatsapp_link(number, message) -%}
https://wa.me/{{ number }}{% if message %}?text={{ message | urlencode }}{% endif %}
{%- endmacro %}

{% macro section_heading(title, subtitle) -%}
{% if title %}<h2 class="section-title">{{ title }}</h2>{% endif %}
{% if subtitle %}<p class="section-subtitle">{{ subtitle }}</p>{% endif %}
{%- endmacro %}"##;

const HERO: &str = r##"{% from "macros.html" import whatsapp_link %}
<section id="{{ key }}" class="section section-hero">
  <div class="hero-inner">
    <div class="hero-copy">
      <h1>{{ content.title or ctx.site_name }}</h1>
      {% if content.subtitle %}<p class="hero-subtitle">{{ content.subtitle }}</p>{% endif %}
      {% if content.ctaLabel %}
        {% if content.ctaLink %}
      <a class="button button-primary" href="{{ content.ctaLink | safe_url }}">{{ content.ctaLabel }}</a>
        {% elif ctx.whatsapp %}
      <a class="button button-primary" href="{{ whatsapp_link(ctx.whatsapp, '') }}" target="_blank" rel="noopener">{{ content.ctaLabel }}</a>
        {% endif %}
      {% endif %}
    </div>
    {% if content.image %}<img class="hero-image" src="{{ content.image | safe_url }}" alt="{{ content.title }}">{% endif %}
  </div>
</section>"##;

const ABOUT: &str = r##"{% from "macros.html" import section_heading %}
<section id="{{ key }}" class="section section-about">
  {{ section_heading(content.title, "") }}
  <div class="about-body">
    {% if content.image %}<img class="about-image" src="{{ content.image | safe_url }}" alt="{{ content.title }}">{% endif %}
    <div class="prose">{{ content.text | markdown }}</div>
  </div>
</section>"##;

/// Generic card grid used by services, benefits and opportunity sections.
const CARDS: &str = r##"{% from "macros.html" import section_heading %}
<section id="{{ key }}" class="section section-cards section-{{ kind }}">
  {{ section_heading(content.title, content.subtitle) }}
  {% if content.cards %}
  <div class="card-grid">
    {% for card in content.cards %}
    <article class="card" data-card="{{ card.id }}">
      {% if card.icon %}<span class="card-icon">{{ card.icon }}</span>{% endif %}
      {% if card.image %}<img class="card-image" src="{{ card.image | safe_url }}" alt="{{ card.title }}">{% endif %}
      <h3>{{ card.title }}</h3>
      {% if card.text %}<p>{{ card.text }}</p>{% endif %}
    </article>
    {% endfor %}
  </div>
  {% endif %}
</section>"##;

const PRODUCTS: &str = r##"{% from "macros.html" import section_heading, whatsapp_link %}
<section id="{{ key }}" class="section section-products">
  {{ section_heading(content.title, content.subtitle) }}
  <div class="card-grid products">
    {% for card in content.cards %}
    <article class="card product" data-card="{{ card.id }}">
      {% if card.image %}<img class="card-image" src="{{ card.image | safe_url }}" alt="{{ card.title }}">{% endif %}
      <h3>{{ card.title }}</h3>
      {% if card.text %}<p>{{ card.text }}</p>{% endif %}
      {% if card.price %}<p class="price">{{ card.price }}</p>{% endif %}
      {% if ctx.whatsapp %}
      <a class="button button-small" href="{{ whatsapp_link(ctx.whatsapp, 'Olá! Tenho interesse em ' ~ card.title) }}" target="_blank" rel="noopener">Pedir</a>
      {% endif %}
    </article>
    {% endfor %}
  </div>
</section>"##;

const TESTIMONIALS: &str = r##"{% from "macros.html" import section_heading %}
<section id="{{ key }}" class="section section-testimonials">
  {{ section_heading(content.title, content.subtitle) }}
  <div class="quotes">
    {% for card in content.cards %}
    <blockquote class="quote" data-card="{{ card.id }}">
      {% if card.text %}<p>“{{ card.text }}”</p>{% endif %}
      <footer>
        {% if card.image %}<img class="avatar" src="{{ card.image | safe_url }}" alt="{{ card.title }}">{% endif %}
        <cite>{{ card.title }}</cite>
      </footer>
    </blockquote>
    {% endfor %}
  </div>
</section>"##;

const GALLERY: &str = r##"{% from "macros.html" import section_heading %}
<section id="{{ key }}" class="section section-gallery">
  {{ section_heading(content.title, content.subtitle) }}
  <div class="gallery">
    {% for card in content.cards %}
    <figure data-card="{{ card.id }}">
      {% if card.image %}<img src="{{ card.image | safe_url }}" alt="{{ card.title }}" loading="lazy">{% endif %}
      {% if card.title %}<figcaption>{{ card.title }}</figcaption>{% endif %}
    </figure>
    {% endfor %}
  </div>
</section>"##;

const TEAM: &str = r##"{% from "macros.html" import section_heading %}
<section id="{{ key }}" class="section section-team">
  {{ section_heading(content.title, content.subtitle) }}
  <div class="card-grid team">
    {% for card in content.cards %}
    <article class="member" data-card="{{ card.id }}">
      {% if card.image %}<img class="avatar" src="{{ card.image | safe_url }}" alt="{{ card.title }}">{% endif %}
      <h3>{{ card.title }}</h3>
      {% if card.text %}<p>{{ card.text }}</p>{% endif %}
    </article>
    {% endfor %}
  </div>
</section>"##;

const FAQ: &str = r##"{% from "macros.html" import section_heading %}
<section id="{{ key }}" class="section section-faq">
  {{ section_heading(content.title, content.subtitle) }}
  <div class="faq">
    {% for card in content.cards %}
    <details data-card="{{ card.id }}">
      <summary>{{ card.title }}</summary>
      {% if card.text %}<p>{{ card.text }}</p>{% endif %}
    </details>
    {% endfor %}
  </div>
</section>"##;

const CTA: &str = r##"{% from "macros.html" import whatsapp_link %}
<section id="{{ key }}" class="section section-cta">
  {% if content.title %}<h2>{{ content.title }}</h2>{% endif %}
  {% if content.text %}<p>{{ content.text }}</p>{% endif %}
  {% if content.buttonLabel %}
    {% if content.buttonLink %}
  <a class="button button-accent" href="{{ content.buttonLink | safe_url }}">{{ content.buttonLabel }}</a>
    {% elif ctx.whatsapp %}
  <a class="button button-accent" href="{{ whatsapp_link(ctx.whatsapp, content.title) }}" target="_blank" rel="noopener">{{ content.buttonLabel }}</a>
    {% endif %}
  {% endif %}
</section>"##;

const CONTACT: &str = r##"{% from "macros.html" import section_heading, whatsapp_link %}
<section id="{{ key }}" class="section section-contact">
  {{ section_heading(content.title, content.subtitle) }}
  <div class="contact-grid">
    <ul class="contact-info">
      {% if content.phone %}<li class="contact-phone">{{ content.phone }}</li>{% endif %}
      {% if content.email %}<li class="contact-email"><a href="mailto:{{ content.email }}">{{ content.email }}</a></li>{% endif %}
      {% if content.address %}<li class="contact-address">{{ content.address }}</li>{% endif %}
      {% if ctx.whatsapp %}
      <li><a class="button button-whatsapp" href="{{ whatsapp_link(ctx.whatsapp, content.whatsappMessage or ('Olá! Vim pelo site ' ~ ctx.site_name)) }}" target="_blank" rel="noopener">WhatsApp</a></li>
      {% endif %}
    </ul>
    <form class="contact-form" method="post" action="{{ ctx.contact_action }}"{% if ctx.preview %} data-preview{% endif %}>
      <fieldset{% if ctx.preview %} disabled{% endif %}>
        <label>Nome <input name="name" required></label>
        <label>E-mail <input name="email" type="email"></label>
        <label>Telefone <input name="phone" type="tel"></label>
        <label>Mensagem <textarea name="message" rows="4" required></textarea></label>
        <button class="button button-primary" type="submit">Enviar</button>
      </fieldset>
      {% if ctx.preview %}<p class="form-note">Formulário desativado na pré-visualização.</p>{% endif %}
    </form>
  </div>
</section>"##;

const FOOTER: &str = r##"<footer id="{{ key }}" class="section section-footer">
  <p>{{ content.text or ("© " ~ ctx.site_name) }}</p>
  <nav class="social">
    {% if content.instagram %}<a href="{{ content.instagram | safe_url }}" target="_blank" rel="noopener">Instagram</a>{% endif %}
    {% if content.facebook %}<a href="{{ content.facebook | safe_url }}" target="_blank" rel="noopener">Facebook</a>{% endif %}
  </nav>
</footer>"##;

const BUILTIN: &[SectionView] = &[
    SectionView { kind: SectionKind::Hero, name: "sections/hero.html", source: HERO },
    SectionView { kind: SectionKind::About, name: "sections/about.html", source: ABOUT },
    SectionView { kind: SectionKind::Services, name: "sections/services.html", source: CARDS },
    SectionView { kind: SectionKind::Products, name: "sections/products.html", source: PRODUCTS },
    SectionView { kind: SectionKind::Benefits, name: "sections/benefits.html", source: CARDS },
    SectionView {
        kind: SectionKind::Testimonials,
        name: "sections/testimonials.html",
        source: TESTIMONIALS,
    },
    SectionView { kind: SectionKind::Gallery, name: "sections/gallery.html", source: GALLERY },
    SectionView { kind: SectionKind::Team, name: "sections/team.html", source: TEAM },
    SectionView { kind: SectionKind::Faq, name: "sections/faq.html", source: FAQ },
    SectionView {
        kind: SectionKind::Opportunity,
        name: "sections/opportunity.html",
        source: CARDS,
    },
    SectionView { kind: SectionKind::Cta, name: "sections/cta.html", source: CTA },
    SectionView { kind: SectionKind::Contact, name: "sections/contact.html", source: CONTACT },
    SectionView { kind: SectionKind::Footer, name: "sections/footer.html", source: FOOTER },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_builtin_view() {
        for kind in SectionKind::ALL {
            assert!(
                SectionViews::builtin().get(kind).is_some(),
                "no view for {}",
                kind
            );
        }
    }

    #[test]
    fn custom_tables_may_omit_kinds() {
        let views = SectionViews::new(
            BUILTIN
                .iter()
                .copied()
                .filter(|v| v.kind != SectionKind::Gallery),
        );

        assert!(views.get(SectionKind::Gallery).is_none());
        assert_eq!(views.len(), SectionKind::ALL.len() - 1);
    }
}
