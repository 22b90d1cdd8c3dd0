//! Public pages: site index, live sites, previews and the contact form.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;

use vitrine_core::SiteDocument;
use vitrine_render::RenderMode;
use vitrine_store::NewInquiry;

use crate::error::{ApiError, ApiResult};
use crate::routes::auth::principal_for;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/sites/{client_id}", get(live_site))
        .route("/sites/{client_id}/", get(live_site))
        .route("/sites/{client_id}/contact", post(contact))
        .route("/preview/{client_id}", get(preview_site))
}

/// List of every stored site.
async fn index(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let sites = state.repo().list()?;
    Ok(Html(state.renderer().render_index(&sites)?))
}

async fn live_site(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    uri: Uri,
) -> ApiResult<Response> {
    let Some(doc) = load_site(&state, &client_id)? else {
        return Ok(not_found_page(&state, uri.path()));
    };

    let page = state.renderer().render(&doc, RenderMode::Live)?;
    Ok(Html(page.html).into_response())
}

#[derive(Debug, Deserialize)]
struct PreviewQuery {
    token: Option<String>,
}

/// Preview of a site's draft, for its editors.
///
/// Browsers cannot attach a bearer header to a page load, so the token may
/// also come from `?token=`.
async fn preview_site(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Query(query): Query<PreviewQuery>,
    headers: HeaderMap,
    uri: Uri,
) -> ApiResult<Response> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
        .or(query.token)
        .ok_or(ApiError::Unauthorized)?;
    principal_for(&state, token.trim())?.authorize_edit(&client_id)?;

    let draft = state
        .drafts()
        .read()
        .await
        .get(&client_id)
        .map(|editor| editor.snapshot());

    let doc = match draft {
        Some(doc) => doc,
        None => match load_site(&state, &client_id)? {
            Some(doc) => doc,
            None => return Ok(not_found_page(&state, uri.path())),
        },
    };

    let page = state.renderer().render(&doc, RenderMode::Preview)?;
    Ok(Html(page.html).into_response())
}

/// Record a contact inquiry and send the visitor back to the site.
async fn contact(
    State(state): State<AppState>,
    Path(client_id): Path<String>,
    Form(inquiry): Form<NewInquiry>,
) -> ApiResult<Redirect> {
    if load_site(&state, &client_id)?.is_none() {
        return Err(ApiError::NotFound(format!("site {client_id}")));
    }
    if inquiry.name.trim().is_empty() || inquiry.message.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Nome e mensagem são obrigatórios".to_string(),
        ));
    }

    state.repo().add_inquiry(&client_id, inquiry)?;

    let target = format!("{}?contato=enviado", state.renderer().site_href(&client_id));
    Ok(Redirect::to(&target))
}

/// Fallback for unknown paths.
pub async fn not_found(State(state): State<AppState>, uri: Uri) -> Response {
    not_found_page(&state, uri.path())
}

fn not_found_page(state: &AppState, path: &str) -> Response {
    match state.renderer().render_not_found(path) {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Load a stored site. Ids the store rejects read as missing.
fn load_site(state: &AppState, client_id: &str) -> ApiResult<Option<SiteDocument>> {
    match state.repo().load(client_id) {
        Ok(doc) => Ok(doc),
        Err(vitrine_store::StoreError::InvalidKey(_)) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;

    use crate::routes::testing::{app, request, send, state, ANA, ADMIN};

    #[tokio::test]
    async fn serves_live_sites() {
        let state = state();

        let (status, html) = send(app(&state), request("GET", "/sites/ana", None, None)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("tpl-representante"));
        assert!(!html.contains("__reload.js"));
    }

    #[tokio::test]
    async fn unknown_sites_get_not_found_page() {
        let state = state();

        let (status, html) = send(app(&state), request("GET", "/sites/zed", None, None)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(html.contains("Página não encontrada"));
    }

    #[tokio::test]
    async fn unknown_paths_fall_back_to_not_found_page() {
        let state = state();

        let (status, html) = send(app(&state), request("GET", "/nada/aqui", None, None)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(html.contains("/nada/aqui"));
    }

    #[tokio::test]
    async fn index_lists_sites() {
        let state = state();

        let (status, html) = send(app(&state), request("GET", "/", None, None)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("/sites/ana/"));
        assert!(html.contains("/sites/bob/"));
    }

    #[tokio::test]
    async fn preview_requires_an_editor() {
        let state = state();

        let (anonymous, _) = send(app(&state), request("GET", "/preview/bob", None, None)).await;
        let (other_client, _) =
            send(app(&state), request("GET", "/preview/bob", Some(ANA), None)).await;
        let (admin, html) = send(
            app(&state),
            request("GET", &format!("/preview/bob?token={}", ADMIN), None, None),
        )
        .await;

        assert_eq!(anonymous, StatusCode::UNAUTHORIZED);
        assert_eq!(other_client, StatusCode::FORBIDDEN);
        assert_eq!(admin, StatusCode::OK);
        assert!(html.contains("__reload.js"));
    }

    #[tokio::test]
    async fn preview_shows_unsubmitted_draft() {
        let state = state();
        send(
            app(&state),
            request(
                "PATCH",
                "/api/sites/ana/fields",
                Some(ANA),
                Some(json!({ "section": "hero", "path": "title", "value": "Rascunho novo" })),
            ),
        )
        .await;

        let (_, preview) = send(app(&state), request("GET", "/preview/ana", Some(ANA), None)).await;
        let (_, live) = send(app(&state), request("GET", "/sites/ana", None, None)).await;

        assert!(preview.contains("Rascunho novo"));
        assert!(!live.contains("Rascunho novo"));
    }

    #[tokio::test]
    async fn contact_form_records_inquiry() {
        let state = state();
        let req = Request::builder()
            .method("POST")
            .uri("/sites/ana/contact")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("name=Jo%C3%A3o&email=joao%40exemplo.com&message=Quero+revender"))
            .unwrap();

        let (status, _) = send(app(&state), req).await;

        assert_eq!(status, StatusCode::SEE_OTHER);
        let inquiries = state.repo().inquiries("ana").unwrap();
        assert_eq!(inquiries.len(), 1);
        assert_eq!(inquiries[0].name, "João");
        assert_eq!(inquiries[0].message, "Quero revender");
    }

    #[tokio::test]
    async fn contact_form_requires_name_and_message() {
        let state = state();
        let req = Request::builder()
            .method("POST")
            .uri("/sites/ana/contact")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("name=&message=oi"))
            .unwrap();

        let (status, _) = send(app(&state), req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(state.repo().inquiries("ana").unwrap().is_empty());
    }
}
