use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use vitrine_core::SiteEditor;
use vitrine_render::SiteRenderer;
use vitrine_store::{IdentityProvider, SiteRepository};

use crate::reload::ReloadHub;

/// Shared application state, passed to all handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    repo: SiteRepository,
    renderer: SiteRenderer,
    identity: Arc<dyn IdentityProvider>,
    reload: ReloadHub,
    /// Unsubmitted editor drafts, by client id
    drafts: RwLock<HashMap<String, SiteEditor>>,
}

impl AppState {
    pub fn new(
        repo: SiteRepository,
        renderer: SiteRenderer,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(InnerState {
                repo,
                renderer,
                identity,
                reload: ReloadHub::new(),
                drafts: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn repo(&self) -> &SiteRepository {
        &self.inner.repo
    }

    pub fn renderer(&self) -> &SiteRenderer {
        &self.inner.renderer
    }

    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.identity.as_ref()
    }

    pub fn reload(&self) -> &ReloadHub {
        &self.inner.reload
    }

    pub fn drafts(&self) -> &RwLock<HashMap<String, SiteEditor>> {
        &self.inner.drafts
    }
}
