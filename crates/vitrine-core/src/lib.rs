//! Site models, site documents and the section editor.
//!
//! This crate holds everything about a site that does not involve rendering or
//! storage: the built-in catalog of site models, the persisted document shape,
//! and the editor that mutates a draft document while keeping its section
//! order and active set consistent.

pub mod catalog;
pub mod editor;
pub mod media;
pub mod model;
pub mod path;
pub mod validate;

pub use catalog::{get_site_model, site_models_by_category, Catalog, CatalogError, Category, SiteModel};
pub use editor::{EditorError, SiteEditor};
pub use media::{encode_data_url, mime_for_path, MediaError};
pub use model::{
    AboutContent, CardsContent, Colors, ContactContent, CtaContent, FooterContent, Gradient,
    HeroContent, SectionCard, SectionContent, SectionKind, SiteDocument, SiteSection,
};
pub use path::{FieldPath, PathError, Segment};
pub use validate::{validate_document, validate_for_submit, ValidationError};
