//! Section editor.
//!
//! [`SiteEditor`] owns one draft [`SiteDocument`]. Every operation builds the
//! next document, checks the document invariants and only then replaces the
//! draft, so a failed operation leaves the draft exactly as it was.
//!
//! Operations naming a section type that is not in the section order are
//! rejected with [`EditorError::UnknownSection`].

use std::collections::BTreeMap;

use serde_json::Value;

use crate::catalog::SiteModel;
use crate::model::{SectionCard, SectionContent, SectionKind, SiteDocument};
use crate::path::{FieldPath, PathError};
use crate::validate::{validate_document, validate_for_submit, ValidationError};

/// Document fields owned by the section operations, or by the store.
const PROTECTED_FIELDS: [&str; 6] = [
    "activeSections",
    "sectionsOrder",
    "sections",
    "layout",
    "clientId",
    "updatedAt",
];

/// Errors that can occur while editing a draft.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("Section '{0}' is not part of this site")]
    UnknownSection(String),

    #[error("Section '{0}' is already part of this site")]
    SectionExists(String),

    #[error("Section '{0}' has no editable content")]
    UnsupportedSection(String),

    #[error("Section '{0}' has no cards")]
    NotACardSection(String),

    #[error("Card {index} does not exist in section '{section}' ({len} cards)")]
    CardOutOfRange {
        section: String,
        index: usize,
        len: usize,
    },

    #[error("Section '{0}' has no room for another card order")]
    CardOrderOverflow(String),

    #[error("Field '{0}' cannot be edited directly")]
    ProtectedField(String),

    #[error("Invalid value for section '{section}': {message}")]
    InvalidContent { section: String, message: String },

    #[error("Invalid value for document: {0}")]
    InvalidDocument(String),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Editing session over a draft site document.
#[derive(Debug, Clone)]
pub struct SiteEditor {
    draft: SiteDocument,
}

impl SiteEditor {
    /// Start editing an existing document.
    ///
    /// Stored documents may predate the invariants; duplicate order entries
    /// and active types missing from the order are dropped.
    pub fn new(mut doc: SiteDocument) -> Self {
        let mut seen: Vec<String> = Vec::new();
        doc.sections_order.retain(|t| {
            let key = t.to_ascii_lowercase();
            if seen.contains(&key) {
                tracing::warn!("Dropping duplicate section '{}' from order", t);
                false
            } else {
                seen.push(key);
                true
            }
        });

        let mut active: Vec<String> = Vec::new();
        for t in doc.active_sections.drain(..) {
            let key = t.to_ascii_lowercase();
            if !seen.contains(&key) {
                tracing::warn!("Dropping active section '{}' missing from order", t);
            } else if !active.iter().any(|a| a.eq_ignore_ascii_case(&key)) {
                active.push(t);
            }
        }
        doc.active_sections = active;

        // Content keys take the spelling used in the order
        let mut sections = BTreeMap::new();
        for (key, content) in std::mem::take(&mut doc.sections) {
            let key = doc
                .sections_order
                .iter()
                .find(|t| t.eq_ignore_ascii_case(&key))
                .cloned()
                .unwrap_or(key);
            if sections.contains_key(&key) {
                tracing::warn!("Dropping duplicate content for section '{}'", key);
            } else {
                sections.insert(key, content);
            }
        }
        doc.sections = sections;

        Self { draft: doc }
    }

    /// Start a new draft from a site model.
    pub fn from_model(model: &SiteModel, client_id: &str) -> Self {
        Self::new(model.new_document(client_id))
    }

    /// The current draft.
    pub fn document(&self) -> &SiteDocument {
        &self.draft
    }

    /// An owned copy of the current draft, ready to save or render.
    pub fn snapshot(&self) -> SiteDocument {
        self.draft.clone()
    }

    pub fn into_document(self) -> SiteDocument {
        self.draft
    }

    pub fn active_sections(&self) -> &[String] {
        &self.draft.active_sections
    }

    pub fn sections_order(&self) -> &[String] {
        &self.draft.sections_order
    }

    /// Flip a section in or out of the active set.
    ///
    /// Returns whether the section is active afterwards. Ordering is untouched.
    pub fn toggle(&mut self, section_type: &str) -> Result<bool, EditorError> {
        let key = self.ordered_key(section_type)?;
        let mut next = self.draft.clone();

        let now_active = match next
            .active_sections
            .iter()
            .position(|t| t.eq_ignore_ascii_case(&key))
        {
            Some(i) => {
                next.active_sections.remove(i);
                false
            }
            None => {
                next.active_sections.push(key);
                true
            }
        };

        self.commit(next)?;
        Ok(now_active)
    }

    /// Swap a section with the one before it. Returns whether anything moved.
    pub fn move_up(&mut self, section_type: &str) -> Result<bool, EditorError> {
        let i = self.position(section_type)?;
        if i == 0 {
            return Ok(false);
        }
        self.swap(i - 1, i)?;
        Ok(true)
    }

    /// Swap a section with the one after it. Returns whether anything moved.
    pub fn move_down(&mut self, section_type: &str) -> Result<bool, EditorError> {
        let i = self.position(section_type)?;
        if i + 1 >= self.draft.sections_order.len() {
            return Ok(false);
        }
        self.swap(i, i + 1)?;
        Ok(true)
    }

    /// Write a value at a field path inside a section's content.
    ///
    /// The edited content must still read back as the section's typed content.
    pub fn set_field_value(
        &mut self,
        section_type: &str,
        path: &str,
        value: Value,
    ) -> Result<(), EditorError> {
        let (key, kind) = self.section(section_type)?;
        let path: FieldPath = path.parse()?;
        if path.root_key() == Some("type") {
            return Err(EditorError::ProtectedField(path.to_string()));
        }

        let invalid = |e: serde_json::Error| EditorError::InvalidContent {
            section: key.clone(),
            message: e.to_string(),
        };

        let mut json = serde_json::to_value(self.draft.content_for(kind)).map_err(invalid)?;
        path.set(&mut json, value)?;
        let content: SectionContent = serde_json::from_value(json).map_err(invalid)?;

        let mut next = self.draft.clone();
        put_section(&mut next.sections, key, content);
        self.commit(next)
    }

    /// Write a value at a field path of the document itself, such as
    /// `nomeDoSite` or `colors.principal`.
    ///
    /// Section order, active set and section content go through their own
    /// operations and are refused here, as are the client id and the save
    /// timestamp.
    pub fn set_document_field(&mut self, path: &str, value: Value) -> Result<(), EditorError> {
        let path: FieldPath = path.parse()?;
        if let Some(root) = path.root_key() {
            if PROTECTED_FIELDS.contains(&root) {
                return Err(EditorError::ProtectedField(path.to_string()));
            }
        }

        let mut json = serde_json::to_value(&self.draft)
            .map_err(|e| EditorError::InvalidDocument(e.to_string()))?;
        path.set(&mut json, value)?;
        let next: SiteDocument = serde_json::from_value(json)
            .map_err(|e| EditorError::InvalidDocument(e.to_string()))?;

        self.commit(next)
    }

    /// Append a placeholder card to a card section.
    pub fn add_card(&mut self, section_type: &str) -> Result<SectionCard, EditorError> {
        let (key, kind) = self.section(section_type)?;
        let mut content = self.draft.content_for(kind);
        let cards = content
            .cards_mut()
            .ok_or_else(|| EditorError::NotACardSection(key.clone()))?;

        let order = cards
            .cards
            .iter()
            .map(|c| c.order)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| EditorError::CardOrderOverflow(key.clone()))?;
        let number = cards.cards.len() + 1;
        let card = SectionCard {
            id: next_card_id(kind, &cards.cards),
            title: placeholder_title(kind, number),
            text: Some("Edite este texto.".to_string()),
            order,
            ..Default::default()
        };
        cards.cards.push(card.clone());

        let mut next = self.draft.clone();
        put_section(&mut next.sections, key, content);
        self.commit(next)?;
        Ok(card)
    }

    /// Remove a card by its position in the stored list.
    pub fn remove_card(
        &mut self,
        section_type: &str,
        index: usize,
    ) -> Result<SectionCard, EditorError> {
        let (key, kind) = self.section(section_type)?;
        let mut content = self.draft.content_for(kind);
        let cards = content
            .cards_mut()
            .ok_or_else(|| EditorError::NotACardSection(key.clone()))?;

        let len = cards.cards.len();
        if index >= len {
            return Err(EditorError::CardOutOfRange {
                section: key,
                index,
                len,
            });
        }
        let removed = cards.cards.remove(index);

        let mut next = self.draft.clone();
        put_section(&mut next.sections, key, content);
        self.commit(next)?;
        Ok(removed)
    }

    /// Append a section kind that is not yet part of the site, active and
    /// with empty content.
    pub fn add_section(&mut self, kind: SectionKind) -> Result<(), EditorError> {
        if self.position(kind.as_str()).is_ok() {
            return Err(EditorError::SectionExists(kind.to_string()));
        }

        let key = kind.as_str().to_string();
        let mut next = self.draft.clone();
        next.sections_order.push(key.clone());
        next.active_sections.push(key.clone());
        let content = take_section(&mut next.sections, &key)
            .unwrap_or_else(|| kind.default_content());
        next.sections.insert(key, content);

        self.commit(next)
    }

    /// Check the draft before submitting it for saving.
    pub fn validate_for_submit(&self) -> Result<(), Vec<ValidationError>> {
        validate_for_submit(&self.draft)
    }

    fn commit(&mut self, next: SiteDocument) -> Result<(), EditorError> {
        validate_document(&next)?;
        self.draft = next;
        Ok(())
    }

    fn position(&self, section_type: &str) -> Result<usize, EditorError> {
        let section_type = section_type.trim();
        self.draft
            .sections_order
            .iter()
            .position(|t| t.eq_ignore_ascii_case(section_type))
            .ok_or_else(|| EditorError::UnknownSection(section_type.to_string()))
    }

    /// The stored spelling of an ordered section type.
    fn ordered_key(&self, section_type: &str) -> Result<String, EditorError> {
        let i = self.position(section_type)?;
        Ok(self.draft.sections_order[i].clone())
    }

    fn section(&self, section_type: &str) -> Result<(String, SectionKind), EditorError> {
        let key = self.ordered_key(section_type)?;
        let kind =
            SectionKind::parse(&key).ok_or_else(|| EditorError::UnsupportedSection(key.clone()))?;
        Ok((key, kind))
    }

    fn swap(&mut self, a: usize, b: usize) -> Result<(), EditorError> {
        let mut next = self.draft.clone();
        next.sections_order.swap(a, b);
        self.commit(next)
    }
}

/// Remove every entry whose key matches `key` ignoring case, returning the
/// one lookups would have found.
fn take_section(
    sections: &mut BTreeMap<String, SectionContent>,
    key: &str,
) -> Option<SectionContent> {
    let matching: Vec<String> = sections
        .keys()
        .filter(|k| k.eq_ignore_ascii_case(key))
        .cloned()
        .collect();
    let mut found = None;
    for k in matching {
        let content = sections.remove(&k);
        if found.is_none() {
            found = content;
        }
    }
    found
}

/// Store section content under `key`, replacing any other spelling of it.
fn put_section(
    sections: &mut BTreeMap<String, SectionContent>,
    key: String,
    content: SectionContent,
) {
    take_section(sections, &key);
    sections.insert(key, content);
}

fn placeholder_title(kind: SectionKind, number: usize) -> String {
    match kind {
        SectionKind::Testimonials => format!("Depoimento {}", number),
        SectionKind::Faq => format!("Pergunta {}", number),
        SectionKind::Products => format!("Produto {}", number),
        SectionKind::Services => format!("Serviço {}", number),
        SectionKind::Team => format!("Integrante {}", number),
        SectionKind::Opportunity => format!("Passo {}", number),
        _ => format!("Novo item {}", number),
    }
}

fn next_card_id(kind: SectionKind, cards: &[SectionCard]) -> String {
    (1..)
        .map(|n| format!("{}-{}", kind, n))
        .find(|id| !cards.iter().any(|c| &c.id == id))
        .unwrap_or_else(|| format!("{}-{}", kind, cards.len() + 1))
}
