//! Site document model.
//!
//! A [`SiteDocument`] is the aggregate a client edits and the renderer reads
//! back. Section content is stored as a [`SectionContent`] variant per section
//! type, so each kind of section carries its own typed field set.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Recognized section types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Hero,
    About,
    Services,
    Products,
    Benefits,
    Testimonials,
    Gallery,
    Team,
    Faq,
    Opportunity,
    Cta,
    Contact,
    Footer,
}

impl SectionKind {
    /// Every section kind, in catalog order.
    pub const ALL: [SectionKind; 13] = [
        SectionKind::Hero,
        SectionKind::About,
        SectionKind::Services,
        SectionKind::Products,
        SectionKind::Benefits,
        SectionKind::Testimonials,
        SectionKind::Gallery,
        SectionKind::Team,
        SectionKind::Faq,
        SectionKind::Opportunity,
        SectionKind::Cta,
        SectionKind::Contact,
        SectionKind::Footer,
    ];

    /// Wire name of the section type.
    pub fn as_str(self) -> &'static str {
        match self {
            SectionKind::Hero => "hero",
            SectionKind::About => "about",
            SectionKind::Services => "services",
            SectionKind::Products => "products",
            SectionKind::Benefits => "benefits",
            SectionKind::Testimonials => "testimonials",
            SectionKind::Gallery => "gallery",
            SectionKind::Team => "team",
            SectionKind::Faq => "faq",
            SectionKind::Opportunity => "opportunity",
            SectionKind::Cta => "cta",
            SectionKind::Contact => "contact",
            SectionKind::Footer => "footer",
        }
    }

    /// Parse a section type name, ignoring case and surrounding whitespace.
    ///
    /// Unknown names yield `None`; callers drop those sections.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }

    /// Label shown in the editor and in navigation.
    pub fn label(self) -> &'static str {
        match self {
            SectionKind::Hero => "Início",
            SectionKind::About => "Sobre",
            SectionKind::Services => "Serviços",
            SectionKind::Products => "Produtos",
            SectionKind::Benefits => "Benefícios",
            SectionKind::Testimonials => "Depoimentos",
            SectionKind::Gallery => "Galeria",
            SectionKind::Team => "Equipe",
            SectionKind::Faq => "Perguntas frequentes",
            SectionKind::Opportunity => "Oportunidade",
            SectionKind::Cta => "Chamada",
            SectionKind::Contact => "Contato",
            SectionKind::Footer => "Rodapé",
        }
    }

    /// Whether this section's content is a list of cards.
    pub fn has_cards(self) -> bool {
        matches!(
            self,
            SectionKind::Services
                | SectionKind::Products
                | SectionKind::Benefits
                | SectionKind::Testimonials
                | SectionKind::Gallery
                | SectionKind::Team
                | SectionKind::Faq
                | SectionKind::Opportunity
        )
    }

    /// Empty content of the right variant for this kind.
    pub fn default_content(self) -> SectionContent {
        match self {
            SectionKind::Hero => SectionContent::Hero(HeroContent::default()),
            SectionKind::About => SectionContent::About(AboutContent::default()),
            SectionKind::Services => SectionContent::Services(CardsContent::default()),
            SectionKind::Products => SectionContent::Products(CardsContent::default()),
            SectionKind::Benefits => SectionContent::Benefits(CardsContent::default()),
            SectionKind::Testimonials => SectionContent::Testimonials(CardsContent::default()),
            SectionKind::Gallery => SectionContent::Gallery(CardsContent::default()),
            SectionKind::Team => SectionContent::Team(CardsContent::default()),
            SectionKind::Faq => SectionContent::Faq(CardsContent::default()),
            SectionKind::Opportunity => SectionContent::Opportunity(CardsContent::default()),
            SectionKind::Cta => SectionContent::Cta(CtaContent::default()),
            SectionKind::Contact => SectionContent::Contact(ContactContent::default()),
            SectionKind::Footer => SectionContent::Footer(FooterContent::default()),
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed content of one section, tagged by section type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SectionContent {
    Hero(HeroContent),
    About(AboutContent),
    Services(CardsContent),
    Products(CardsContent),
    Benefits(CardsContent),
    Testimonials(CardsContent),
    Gallery(CardsContent),
    Team(CardsContent),
    Faq(CardsContent),
    Opportunity(CardsContent),
    Cta(CtaContent),
    Contact(ContactContent),
    Footer(FooterContent),
    /// Content tagged with a type this build does not know.
    #[serde(other)]
    Unknown,
}

impl Default for SectionContent {
    fn default() -> Self {
        SectionContent::Unknown
    }
}

impl SectionContent {
    /// The section kind this content belongs to.
    pub fn kind(&self) -> Option<SectionKind> {
        let kind = match self {
            SectionContent::Hero(_) => SectionKind::Hero,
            SectionContent::About(_) => SectionKind::About,
            SectionContent::Services(_) => SectionKind::Services,
            SectionContent::Products(_) => SectionKind::Products,
            SectionContent::Benefits(_) => SectionKind::Benefits,
            SectionContent::Testimonials(_) => SectionKind::Testimonials,
            SectionContent::Gallery(_) => SectionKind::Gallery,
            SectionContent::Team(_) => SectionKind::Team,
            SectionContent::Faq(_) => SectionKind::Faq,
            SectionContent::Opportunity(_) => SectionKind::Opportunity,
            SectionContent::Cta(_) => SectionKind::Cta,
            SectionContent::Contact(_) => SectionKind::Contact,
            SectionContent::Footer(_) => SectionKind::Footer,
            SectionContent::Unknown => return None,
        };
        Some(kind)
    }

    /// Card list, for card sections.
    pub fn cards(&self) -> Option<&CardsContent> {
        match self {
            SectionContent::Services(c)
            | SectionContent::Products(c)
            | SectionContent::Benefits(c)
            | SectionContent::Testimonials(c)
            | SectionContent::Gallery(c)
            | SectionContent::Team(c)
            | SectionContent::Faq(c)
            | SectionContent::Opportunity(c) => Some(c),
            _ => None,
        }
    }

    /// Mutable card list, for card sections.
    pub fn cards_mut(&mut self) -> Option<&mut CardsContent> {
        match self {
            SectionContent::Services(c)
            | SectionContent::Products(c)
            | SectionContent::Benefits(c)
            | SectionContent::Testimonials(c)
            | SectionContent::Gallery(c)
            | SectionContent::Team(c)
            | SectionContent::Faq(c)
            | SectionContent::Opportunity(c) => Some(c),
            _ => None,
        }
    }

    /// Return the content with its cards sorted by `order`, ascending.
    ///
    /// The sort is stable: cards sharing an `order` keep their stored sequence.
    pub fn sorted(mut self) -> Self {
        if let Some(cards) = self.cards_mut() {
            cards.cards.sort_by_key(|card| card.order);
        }
        self
    }
}

/// Opening banner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroContent {
    pub title: String,
    pub subtitle: String,
    pub image: Option<String>,
    pub cta_label: String,
    pub cta_link: Option<String>,
}

/// Free text about the business. `text` is markdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AboutContent {
    pub title: String,
    pub text: String,
    pub image: Option<String>,
}

/// Content shared by every card section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CardsContent {
    pub title: String,
    pub subtitle: String,
    pub cards: Vec<SectionCard>,
}

/// Call to action band.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CtaContent {
    pub title: String,
    pub text: String,
    pub button_label: String,
    pub button_link: Option<String>,
}

/// Contact block. Mounts the inquiry form when rendered live.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactContent {
    pub title: String,
    pub subtitle: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub whatsapp_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FooterContent {
    pub text: String,
    pub instagram: Option<String>,
    pub facebook: Option<String>,
}

/// A repeatable item inside a card section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SectionCard {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    /// Display position. Only compared, never required to be contiguous.
    pub order: i64,
}

/// Hero background gradient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gradient {
    pub from: String,
    pub to: String,
}

/// Color theme. Values are CSS color strings and are not validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Colors {
    pub principal: String,
    pub background: String,
    pub accent: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hero_gradient: Option<Gradient>,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            principal: "#1f4e79".to_string(),
            background: "#ffffff".to_string(),
            accent: "#f2a900".to_string(),
            text: "#222222".to_string(),
            hero_gradient: None,
        }
    }
}

/// A section entry of a site model or of an explicit document layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteSection {
    #[serde(rename = "type")]
    pub section_type: String,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub content: SectionContent,
}

fn default_true() -> bool {
    true
}

/// The persisted site configuration for one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteDocument {
    #[serde(default)]
    pub client_id: String,

    /// Template or site model identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    #[serde(rename = "nomeDoSite", default)]
    pub site_name: String,

    /// Logo URL or inline data URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,

    /// Phone number used for the WhatsApp deep link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,

    #[serde(default)]
    pub colors: Colors,

    #[serde(default)]
    pub active_sections: Vec<String>,

    #[serde(default)]
    pub sections_order: Vec<String>,

    #[serde(default)]
    pub sections: BTreeMap<String, SectionContent>,

    /// Explicit section layout; overrides `sections_order` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Vec<SiteSection>>,

    /// RFC 3339 timestamp of the last save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl SiteDocument {
    /// Create an empty document for a client.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            template: None,
            site_name: String::new(),
            logo: None,
            whatsapp: None,
            colors: Colors::default(),
            active_sections: Vec::new(),
            sections_order: Vec::new(),
            sections: BTreeMap::new(),
            layout: None,
            updated_at: None,
        }
    }

    /// The template identifier, if one is set and not blank.
    pub fn template_id(&self) -> Option<&str> {
        self.template
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Whether a section type is in the active set.
    pub fn is_active(&self, section_type: &str) -> bool {
        self.active_sections
            .iter()
            .any(|t| t.eq_ignore_ascii_case(section_type))
    }

    /// Content for a section kind, falling back to the kind's empty content
    /// when the entry is missing or holds another variant.
    pub fn content_for(&self, kind: SectionKind) -> SectionContent {
        self.sections
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(kind.as_str()))
            .map(|(_, content)| content)
            .filter(|content| content.kind() == Some(kind))
            .cloned()
            .unwrap_or_else(|| kind.default_content())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_section_kinds_case_insensitively() {
        assert_eq!(SectionKind::parse("Hero"), Some(SectionKind::Hero));
        assert_eq!(SectionKind::parse(" FAQ "), Some(SectionKind::Faq));
        assert_eq!(SectionKind::parse("carousel"), None);
    }

    #[test]
    fn deserializes_document_with_portuguese_site_name() {
        let json = r##"{
            "clientId": "c1",
            "template": "landing",
            "nomeDoSite": "Loja da Ana",
            "colors": { "principal": "#000" },
            "activeSections": ["hero"],
            "sectionsOrder": ["hero", "contact"],
            "sections": {
                "hero": { "type": "hero", "title": "Bem-vindo" }
            }
        }"##;

        let doc: SiteDocument = serde_json::from_str(json).unwrap();

        assert_eq!(doc.site_name, "Loja da Ana");
        assert_eq!(doc.colors.principal, "#000");
        assert_eq!(doc.colors.background, "#ffffff");
        assert_eq!(doc.template_id(), Some("landing"));

        match doc.content_for(SectionKind::Hero) {
            SectionContent::Hero(hero) => assert_eq!(hero.title, "Bem-vindo"),
            other => panic!("unexpected content {:?}", other),
        }
    }

    #[test]
    fn unknown_content_tag_becomes_unknown_variant() {
        let content: SectionContent =
            serde_json::from_str(r#"{ "type": "carousel", "slides": [] }"#).unwrap();

        assert_eq!(content, SectionContent::Unknown);
        assert_eq!(content.kind(), None);
    }

    #[test]
    fn mismatched_content_falls_back_to_default() {
        let mut doc = SiteDocument::new("c1");
        doc.sections.insert(
            "about".to_string(),
            SectionContent::Hero(HeroContent::default()),
        );

        assert_eq!(
            doc.content_for(SectionKind::About),
            SectionKind::About.default_content()
        );
    }

    #[test]
    fn sorts_cards_by_order() {
        let content = SectionContent::Products(CardsContent {
            cards: [5, 1, 3]
                .into_iter()
                .map(|order| SectionCard {
                    id: format!("p{}", order),
                    order,
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        });

        let sorted = content.sorted();
        let orders: Vec<i64> = sorted
            .cards()
            .unwrap()
            .cards
            .iter()
            .map(|c| c.order)
            .collect();

        assert_eq!(orders, vec![1, 3, 5]);
    }

    #[test]
    fn blank_template_is_none() {
        let mut doc = SiteDocument::new("c1");
        doc.template = Some("   ".to_string());

        assert_eq!(doc.template_id(), None);
    }
}
