//! Template resolution and HTML rendering for vitrine sites.
//!
//! A [`Resolver`] decides which visual template a site document uses and which
//! sections appear, in which order. The [`SiteRenderer`] turns that resolution
//! into a full HTML page, and the [`SiteBuilder`] writes every stored site to
//! disk.

pub mod builder;
pub mod engine;
pub mod links;
pub mod renderer;
pub mod resolver;
pub mod sections;
pub mod templates;
pub mod theme;

pub use builder::{BuildConfig, BuildError, BuildResult, SiteBuilder};
pub use engine::TemplateEngine;
pub use links::whatsapp_number;
pub use renderer::{RenderError, RenderMode, RenderOptions, RenderedPage, SiteRenderer};
pub use resolver::{plan_sections, PlannedSection, Resolution, Resolver};
pub use sections::{SectionContext, SectionView, SectionViews};
pub use templates::{Layout, TemplateSpec, TemplateTable, DEFAULT_TEMPLATE, SECTIONS_TEMPLATE};
pub use theme::Theme;
