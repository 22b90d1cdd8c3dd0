pub mod api;
pub mod auth;
pub mod pages;

use axum::body::Body;
use axum::http::{Request, Uri};
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::reload;
use crate::state::AppState;

/// Largest request body for edits and uploads.
pub(crate) const BODY_LIMIT: usize = 1024 * 1024;

/// Largest whole site document accepted by `PUT /api/sites/{id}`. Holds an
/// inline logo at its size limit with room for the rest of the document.
pub(crate) const DOCUMENT_LIMIT: usize = 4 * 1024 * 1024;

/// Assemble the full router with all route groups.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(pages::routes())
        .merge(api::routes())
        .route("/__reload", get(reload::ws_handler))
        .route("/__reload.js", get(reload::script_handler))
        .fallback(pages::not_found)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(RequestBodyLimitLayer::new(DOCUMENT_LIMIT))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Request span without preview tokens in the recorded URI.
fn request_span(request: &Request<Body>) -> Span {
    tracing::debug_span!(
        "request",
        method = %request.method(),
        uri = %redacted_uri(request.uri()),
        version = ?request.version(),
    )
}

fn redacted_uri(uri: &Uri) -> String {
    let Some(query) = uri.query() else {
        return uri.path().to_string();
    };
    let query: Vec<&str> = query
        .split('&')
        .map(|pair| {
            if pair.starts_with("token=") {
                "token=[redacted]"
            } else {
                pair
            }
        })
        .collect();
    format!("{}?{}", uri.path(), query.join("&"))
}


#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use vitrine_core::{get_site_model, SiteEditor};
    use vitrine_render::{RenderOptions, SiteRenderer};
    use vitrine_store::{MemoryStore, Role, SiteRepository, StaticIdentity, UserEntry};

    use super::build_router;
    use crate::state::AppState;

    pub const ADMIN: &str = "admin-token";
    pub const ANA: &str = "ana-token";

    /// State with sites `ana` and `bob` and tokens for an admin and for ana.
    pub fn state() -> AppState {
        let repo = SiteRepository::new(Arc::new(MemoryStore::new()));
        for (id, model) in [("ana", "representante"), ("bob", "landing-page")] {
            let editor = SiteEditor::from_model(get_site_model(model).unwrap(), id);
            repo.save(&editor.snapshot()).unwrap();
        }

        let identity = StaticIdentity::new(vec![
            UserEntry {
                token: ADMIN.to_string(),
                uid: "root".to_string(),
                role: Role::Admin,
                client_id: None,
            },
            UserEntry {
                token: ANA.to_string(),
                uid: "ana".to_string(),
                role: Role::Client,
                client_id: Some("ana".to_string()),
            },
        ]);

        let renderer = SiteRenderer::new(RenderOptions {
            base_url: "/".to_string(),
            minify: false,
        });

        AppState::new(repo, renderer, Arc::new(identity))
    }

    pub fn app(state: &AppState) -> Router {
        build_router(state.clone())
    }

    pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, String) {
        let response = app.oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    pub async fn send_json(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let (status, body) = send(app, req).await;
        (status, serde_json::from_str(&body).unwrap_or(Value::Null))
    }
}
