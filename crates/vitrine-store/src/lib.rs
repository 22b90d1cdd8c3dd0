//! Document storage, site repositories and access control.
//!
//! The builder only needs a narrow contract from its backing store: documents
//! addressed by collection and id, whole or merged writes, deletes and simple
//! equality queries. [`DocumentStore`] captures that contract; the in-memory
//! and JSON-file backends implement it.

pub mod file;
pub mod identity;
pub mod memory;
pub mod repository;
pub mod store;

pub use file::FileStore;
pub use identity::{AccessError, IdentityProvider, Principal, Role, StaticIdentity, UserEntry};
pub use memory::MemoryStore;
pub use repository::{
    inquiries_collection, Inquiry, NewInquiry, SiteRepository, SubmitError, SITES,
};
pub use store::{merge_json, DocumentStore, StoreError};
