//! Typed access to site documents and contact inquiries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use vitrine_core::{validate_for_submit, SiteDocument, SiteEditor, ValidationError};

use crate::store::{DocumentStore, StoreError};

/// Collection holding one site document per client, keyed by client id.
pub const SITES: &str = "sites";

/// Collection holding a client's contact inquiries.
pub fn inquiries_collection(client_id: &str) -> String {
    format!("clients/{}/inquiries", client_id)
}

/// A contact form submission as sent by a visitor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewInquiry {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
}

/// A stored contact inquiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: String,
    pub client_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Errors that can occur when submitting an edited site.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Site has {} invalid field(s)", .0.len())]
    Invalid(Vec<ValidationError>),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Site and inquiry persistence over any [`DocumentStore`].
#[derive(Clone)]
pub struct SiteRepository {
    store: Arc<dyn DocumentStore>,
}

impl SiteRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Load the site document stored under a client id.
    pub fn load(&self, client_id: &str) -> Result<Option<SiteDocument>, StoreError> {
        self.store
            .get(SITES, client_id)?
            .map(|value| decode_site(client_id, value))
            .transpose()
    }

    /// Find the site document whose `clientId` field equals `client_id`.
    pub fn find_by_client(&self, client_id: &str) -> Result<Option<SiteDocument>, StoreError> {
        let found = self
            .store
            .query_eq(SITES, "clientId", &Value::String(client_id.to_string()))?;

        found
            .into_iter()
            .next()
            .map(|(id, value)| decode_site(&id, value))
            .transpose()
    }

    /// Every stored site. Malformed documents are skipped with a warning.
    pub fn list(&self) -> Result<Vec<SiteDocument>, StoreError> {
        let mut sites = Vec::new();
        for (id, value) in self.store.list(SITES)? {
            match decode_site(&id, value) {
                Ok(site) => sites.push(site),
                Err(e) => tracing::warn!("Skipping site {}: {}", id, e),
            }
        }
        Ok(sites)
    }

    /// Replace the stored document with `doc`, stamping `updatedAt`.
    pub fn save(&self, doc: &SiteDocument) -> Result<SiteDocument, StoreError> {
        let mut doc = doc.clone();
        doc.updated_at = Some(Utc::now().to_rfc3339());

        let value = serde_json::to_value(&doc).map_err(|e| StoreError::WriteError {
            path: format!("{}/{}", SITES, doc.client_id),
            message: e.to_string(),
        })?;
        self.store.set(SITES, &doc.client_id, value, false)?;

        tracing::info!("Saved site {}", doc.client_id);
        Ok(doc)
    }

    /// Merge a partial update into a stored site, e.g. `{"logo": "..."}`.
    pub fn update(&self, client_id: &str, patch: Value) -> Result<(), StoreError> {
        let mut patch = patch;
        if let Value::Object(fields) = &mut patch {
            fields.insert(
                "updatedAt".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );
        }
        self.store.set(SITES, client_id, patch, true)
    }

    /// Validate an editor draft and save it.
    ///
    /// Validation failures never reach the store.
    pub fn submit(&self, editor: &SiteEditor) -> Result<SiteDocument, SubmitError> {
        let doc = editor.snapshot();
        validate_for_submit(&doc).map_err(SubmitError::Invalid)?;
        Ok(self.save(&doc)?)
    }

    pub fn delete(&self, client_id: &str) -> Result<bool, StoreError> {
        self.store.delete(SITES, client_id)
    }

    /// Record a contact inquiry under the client's namespace.
    pub fn add_inquiry(&self, client_id: &str, inquiry: NewInquiry) -> Result<Inquiry, StoreError> {
        let inquiry = Inquiry {
            id: Uuid::new_v4().simple().to_string(),
            client_id: client_id.to_string(),
            name: inquiry.name,
            email: inquiry.email,
            phone: inquiry.phone,
            message: inquiry.message,
            created_at: Utc::now(),
        };

        let collection = inquiries_collection(client_id);
        let value = serde_json::to_value(&inquiry).map_err(|e| StoreError::WriteError {
            path: collection.clone(),
            message: e.to_string(),
        })?;
        self.store.set(&collection, &inquiry.id, value, false)?;

        tracing::info!("New inquiry for {}", client_id);
        Ok(inquiry)
    }

    /// A client's inquiries, oldest first.
    pub fn inquiries(&self, client_id: &str) -> Result<Vec<Inquiry>, StoreError> {
        let collection = inquiries_collection(client_id);
        let mut inquiries = self
            .store
            .list(&collection)?
            .into_iter()
            .map(|(id, value)| {
                serde_json::from_value::<Inquiry>(value).map_err(|e| StoreError::Corrupt {
                    collection: collection.clone(),
                    id,
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        inquiries.sort_by_key(|i| i.created_at);
        Ok(inquiries)
    }
}

fn decode_site(id: &str, value: Value) -> Result<SiteDocument, StoreError> {
    let mut doc: SiteDocument = serde_json::from_value(value).map_err(|e| StoreError::Corrupt {
        collection: SITES.to_string(),
        id: id.to_string(),
        message: e.to_string(),
    })?;
    if doc.client_id.is_empty() {
        doc.client_id = id.to_string();
    }
    Ok(doc)
}
