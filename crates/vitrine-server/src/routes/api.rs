//! Editing API for admins and clients.
//!
//! Section and field operations work on a per-site draft held in memory.
//! Drafts start from the stored document and reach the store only through a
//! submit, which validates first. Logos are the exception: an upload is
//! written to the stored document right away.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use vitrine_core::{
    encode_data_url, get_site_model, site_models_by_category, Category, EditorError, SectionKind,
    SiteDocument, SiteEditor,
};
use vitrine_store::Inquiry;

use crate::error::{ApiError, ApiResult};
use crate::routes::auth::Authenticated;
use crate::routes::DOCUMENT_LIMIT;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/models", get(list_models))
        .route("/api/sites", get(list_sites).post(create_site))
        .route(
            "/api/sites/{client_id}",
            get(get_site)
                .put(replace_site)
                .layer(DefaultBodyLimit::max(DOCUMENT_LIMIT)),
        )
        .route("/api/sites/{client_id}/submit", post(submit_draft))
        .route("/api/sites/{client_id}/draft", delete(discard_draft))
        .route("/api/sites/{client_id}/sections", post(add_section))
        .route(
            "/api/sites/{client_id}/sections/{section}/toggle",
            post(toggle_section),
        )
        .route("/api/sites/{client_id}/sections/{section}/up", post(move_up))
        .route("/api/sites/{client_id}/sections/{section}/down", post(move_down))
        .route("/api/sites/{client_id}/sections/{section}/cards", post(add_card))
        .route(
            "/api/sites/{client_id}/sections/{section}/cards/{index}",
            delete(remove_card),
        )
        .route("/api/sites/{client_id}/fields", patch(set_field))
        .route("/api/sites/{client_id}/logo", put(upload_logo))
        .route("/api/sites/{client_id}/inquiries", get(list_inquiries))
}

/// Section layout after an operation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SectionState {
    changed: bool,
    active_sections: Vec<String>,
    sections_order: Vec<String>,
}

impl SectionState {
    fn of(editor: &SiteEditor, changed: bool) -> Self {
        Self {
            changed,
            active_sections: editor.active_sections().to_vec(),
            sections_order: editor.sections_order().to_vec(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ModelSummary {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    category: Category,
    template: &'static str,
}

#[derive(Debug, Deserialize)]
struct ModelFilter {
    category: Option<String>,
}

async fn list_models(Query(filter): Query<ModelFilter>) -> ApiResult<Json<Vec<ModelSummary>>> {
    let category = filter
        .category
        .as_deref()
        .map(str::parse::<Category>)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let models = site_models_by_category(category)
        .into_iter()
        .map(|m| ModelSummary {
            id: &m.id,
            name: &m.name,
            description: &m.description,
            category: m.category,
            template: &m.template,
        })
        .collect();
    Ok(Json(models))
}

/// Sites visible to the caller: all of them for admins, their own for clients.
async fn list_sites(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
) -> ApiResult<Json<Vec<SiteDocument>>> {
    let sites = if principal.is_admin() {
        state.repo().list()?
    } else {
        let own = principal.site_id(None)?;
        state.repo().load(own)?.into_iter().collect()
    };
    Ok(Json(sites))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSite {
    client_id: String,
    model: String,
    #[serde(default)]
    name: Option<String>,
}

/// Create a site from a model. Admin only.
async fn create_site(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Json(body): Json<CreateSite>,
) -> ApiResult<(StatusCode, Json<SiteDocument>)> {
    if !principal.is_admin() {
        return Err(ApiError::Forbidden("Only admins create sites".to_string()));
    }
    let model = get_site_model(&body.model)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown site model: {}", body.model)))?;
    if state.repo().load(&body.client_id)?.is_some() {
        return Err(ApiError::Conflict(format!("site {} exists", body.client_id)));
    }

    let mut editor = SiteEditor::from_model(model, &body.client_id);
    if let Some(name) = body.name {
        editor.set_document_field("nomeDoSite", Value::String(name))?;
    }
    let saved = state.repo().submit(&editor)?;

    tracing::info!("Created site {} from model {}", saved.client_id, model.id);
    Ok((StatusCode::CREATED, Json(saved)))
}

/// The caller's current view of a site: the draft if one is open, else the
/// stored document.
async fn get_site(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(client_id): Path<String>,
) -> ApiResult<Json<SiteDocument>> {
    principal.authorize_edit(&client_id)?;

    if let Some(editor) = state.drafts().read().await.get(&client_id) {
        return Ok(Json(editor.snapshot()));
    }
    let doc = state
        .repo()
        .load(&client_id)?
        .ok_or_else(|| site_not_found(&client_id))?;
    Ok(Json(doc))
}

/// Validate and store a whole document, replacing any open draft.
async fn replace_site(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(client_id): Path<String>,
    Json(mut doc): Json<SiteDocument>,
) -> ApiResult<Json<SiteDocument>> {
    principal.authorize_edit(&client_id)?;
    doc.client_id = client_id.clone();

    let saved = state.repo().submit(&SiteEditor::new(doc))?;
    state.drafts().write().await.remove(&client_id);
    state.reload().reload_site(&client_id);

    Ok(Json(saved))
}

/// Validate and store the open draft.
async fn submit_draft(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(client_id): Path<String>,
) -> ApiResult<Json<SiteDocument>> {
    principal.authorize_edit(&client_id)?;

    let mut drafts = state.drafts().write().await;
    let editor = drafts
        .get(&client_id)
        .ok_or_else(|| ApiError::NotFound(format!("no open draft for site {client_id}")))?;

    // A failed submit keeps the draft open
    let saved = state.repo().submit(editor)?;
    drafts.remove(&client_id);
    drop(drafts);

    state.reload().reload_site(&client_id);
    Ok(Json(saved))
}

async fn discard_draft(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(client_id): Path<String>,
) -> ApiResult<StatusCode> {
    principal.authorize_edit(&client_id)?;

    let removed = state.drafts().write().await.remove(&client_id).is_some();
    if removed {
        state.reload().reload_site(&client_id);
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct NewSection {
    #[serde(rename = "type")]
    section_type: String,
}

async fn add_section(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(client_id): Path<String>,
    Json(body): Json<NewSection>,
) -> ApiResult<(StatusCode, Json<SectionState>)> {
    principal.authorize_edit(&client_id)?;
    let kind = SectionKind::parse(&body.section_type)
        .ok_or_else(|| EditorError::UnsupportedSection(body.section_type.clone()))?;

    let result = edit_draft(&state, &client_id, |editor| {
        editor.add_section(kind)?;
        Ok(SectionState::of(editor, true))
    })
    .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

async fn toggle_section(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path((client_id, section)): Path<(String, String)>,
) -> ApiResult<Json<SectionState>> {
    principal.authorize_edit(&client_id)?;

    let result = edit_draft(&state, &client_id, |editor| {
        editor.toggle(&section)?;
        Ok(SectionState::of(editor, true))
    })
    .await?;
    Ok(Json(result))
}

async fn move_up(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path((client_id, section)): Path<(String, String)>,
) -> ApiResult<Json<SectionState>> {
    principal.authorize_edit(&client_id)?;

    let result = edit_draft(&state, &client_id, |editor| {
        let moved = editor.move_up(&section)?;
        Ok(SectionState::of(editor, moved))
    })
    .await?;
    Ok(Json(result))
}

async fn move_down(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path((client_id, section)): Path<(String, String)>,
) -> ApiResult<Json<SectionState>> {
    principal.authorize_edit(&client_id)?;

    let result = edit_draft(&state, &client_id, |editor| {
        let moved = editor.move_down(&section)?;
        Ok(SectionState::of(editor, moved))
    })
    .await?;
    Ok(Json(result))
}

async fn add_card(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path((client_id, section)): Path<(String, String)>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    principal.authorize_edit(&client_id)?;

    let card = edit_draft(&state, &client_id, |editor| editor.add_card(&section)).await?;
    Ok((StatusCode::CREATED, Json(json!(card))))
}

async fn remove_card(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path((client_id, section, index)): Path<(String, String, usize)>,
) -> ApiResult<Json<Value>> {
    principal.authorize_edit(&client_id)?;

    let card = edit_draft(&state, &client_id, |editor| editor.remove_card(&section, index)).await?;
    Ok(Json(json!(card)))
}

#[derive(Debug, Deserialize)]
struct FieldEdit {
    /// Section type; absent for document-level fields
    #[serde(default)]
    section: Option<String>,
    path: String,
    value: Value,
}

async fn set_field(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(client_id): Path<String>,
    Json(edit): Json<FieldEdit>,
) -> ApiResult<Json<SiteDocument>> {
    principal.authorize_edit(&client_id)?;

    let doc = edit_draft(&state, &client_id, |editor| {
        match &edit.section {
            Some(section) => editor.set_field_value(section, &edit.path, edit.value.clone())?,
            None => editor.set_document_field(&edit.path, edit.value.clone())?,
        }
        Ok(editor.snapshot())
    })
    .await?;
    Ok(Json(doc))
}

/// Store an uploaded image as the site's logo.
///
/// The body is the raw image; its type comes from `Content-Type`.
async fn upload_logo(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(client_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    principal.authorize_edit(&client_id)?;

    let mime = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");
    let logo = encode_data_url(&body, mime)?;

    if state.repo().load(&client_id)?.is_none() {
        return Err(site_not_found(&client_id));
    }
    state.repo().update(&client_id, json!({ "logo": logo }))?;

    if let Some(editor) = state.drafts().write().await.get_mut(&client_id) {
        editor.set_document_field("logo", Value::String(logo.clone()))?;
    }
    state.reload().reload_site(&client_id);

    tracing::info!("Updated logo for {} ({} bytes)", client_id, body.len());
    Ok(Json(json!({ "logo": logo })))
}

async fn list_inquiries(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(client_id): Path<String>,
) -> ApiResult<Json<Vec<Inquiry>>> {
    principal.authorize_edit(&client_id)?;
    Ok(Json(state.repo().inquiries(&client_id)?))
}

/// Run an editor operation on a site's draft, opening the draft from the
/// stored document if needed. Previews of the site reload on success.
async fn edit_draft<T>(
    state: &AppState,
    client_id: &str,
    op: impl FnOnce(&mut SiteEditor) -> Result<T, EditorError>,
) -> ApiResult<T> {
    let mut drafts = state.drafts().write().await;

    if !drafts.contains_key(client_id) {
        let doc = state
            .repo()
            .load(client_id)?
            .ok_or_else(|| site_not_found(client_id))?;
        tracing::debug!("Opened draft for {}", client_id);
        drafts.insert(client_id.to_string(), SiteEditor::new(doc));
    }

    let editor = drafts
        .get_mut(client_id)
        .ok_or_else(|| ApiError::Internal(format!("draft for {client_id} missing")))?;
    let result = op(editor)?;
    drop(drafts);

    state.reload().reload_site(client_id);
    Ok(result)
}

fn site_not_found(client_id: &str) -> ApiError {
    ApiError::NotFound(format!("site {client_id}"))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::reload::ReloadMessage;
    use crate::routes::BODY_LIMIT;
    use crate::routes::testing::{app, request, send_json, state, ADMIN, ANA};

    #[tokio::test]
    async fn requires_a_token() {
        let state = state();

        let (status, body) = send_json(app(&state), request("GET", "/api/sites/ana", None, None)).await;
        let (bad, _) =
            send_json(app(&state), request("GET", "/api/sites/ana", Some("nope"), None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["type"], "unauthorized");
        assert_eq!(bad, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn clients_only_edit_their_own_site() {
        let state = state();

        let (own, _) = send_json(app(&state), request("GET", "/api/sites/ana", Some(ANA), None)).await;
        let (other, body) =
            send_json(app(&state), request("GET", "/api/sites/bob", Some(ANA), None)).await;

        assert_eq!(own, StatusCode::OK);
        assert_eq!(other, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["statusCode"], 403);
    }

    #[tokio::test]
    async fn toggles_and_moves_sections_in_draft() {
        let state = state();
        let (_, before) =
            send_json(app(&state), request("GET", "/api/sites/ana", Some(ANA), None)).await;

        let (status, toggled) = send_json(
            app(&state),
            request("POST", "/api/sites/ana/sections/faq/toggle", Some(ANA), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_ne!(toggled["activeSections"], before["activeSections"]);

        send_json(
            app(&state),
            request("POST", "/api/sites/ana/sections/faq/toggle", Some(ANA), None),
        )
        .await;
        let (_, up) = send_json(
            app(&state),
            request("POST", "/api/sites/ana/sections/contact/up", Some(ANA), None),
        )
        .await;
        let (_, down) = send_json(
            app(&state),
            request("POST", "/api/sites/ana/sections/contact/down", Some(ANA), None),
        )
        .await;

        assert_eq!(up["changed"], true);
        assert_eq!(down["changed"], true);
        assert_eq!(down["activeSections"], before["activeSections"]);
        assert_eq!(down["sectionsOrder"], before["sectionsOrder"]);

        // Nothing reached the store
        let stored = state.repo().load("ana").unwrap().unwrap();
        assert_eq!(json!(stored.sections_order), before["sectionsOrder"]);
    }

    #[tokio::test]
    async fn unknown_section_is_not_found() {
        let state = state();

        let (status, _) = send_json(
            app(&state),
            request("POST", "/api/sites/ana/sections/carousel/toggle", Some(ANA), None),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn adds_and_removes_cards() {
        let state = state();

        let (status, card) = send_json(
            app(&state),
            request("POST", "/api/sites/ana/sections/products/cards", Some(ANA), None),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(card["id"].as_str().unwrap().starts_with("products-"));

        let (status, _) = send_json(
            app(&state),
            request("DELETE", "/api/sites/ana/sections/products/cards/99", Some(ANA), None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, removed) = send_json(
            app(&state),
            request("DELETE", "/api/sites/ana/sections/products/cards/0", Some(ANA), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(removed["title"].is_string());
    }

    #[tokio::test]
    async fn empty_site_name_blocks_submit() {
        let state = state();
        let before = state.repo().load("ana").unwrap().unwrap();

        send_json(
            app(&state),
            request(
                "PATCH",
                "/api/sites/ana/fields",
                Some(ANA),
                Some(json!({ "path": "nomeDoSite", "value": "" })),
            ),
        )
        .await;
        let (status, body) = send_json(
            app(&state),
            request("POST", "/api/sites/ana/submit", Some(ANA), None),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["fields"][0]["field"], "nomeDoSite");
        assert_eq!(state.repo().load("ana").unwrap().unwrap(), before);
    }

    #[tokio::test]
    async fn submit_stores_draft_and_reloads_previews() {
        let state = state();
        let mut reloads = state.reload().subscribe();

        send_json(
            app(&state),
            request(
                "PATCH",
                "/api/sites/ana/fields",
                Some(ANA),
                Some(json!({ "path": "colors.principal", "value": "#102030" })),
            ),
        )
        .await;
        let (status, saved) = send_json(
            app(&state),
            request("POST", "/api/sites/ana/submit", Some(ANA), None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved["colors"]["principal"], "#102030");
        assert!(saved["updatedAt"].is_string());
        assert_eq!(
            state.repo().load("ana").unwrap().unwrap().colors.principal,
            "#102030"
        );
        assert_eq!(
            reloads.try_recv().unwrap(),
            ReloadMessage::Reload {
                client_id: Some("ana".to_string())
            }
        );
    }

    #[tokio::test]
    async fn admins_create_sites_from_models() {
        let state = state();
        let body = json!({ "clientId": "carla", "model": "portfolio", "name": "Carla Fotos" });

        let (status, created) = send_json(
            app(&state),
            request("POST", "/api/sites", Some(ADMIN), Some(body.clone())),
        )
        .await;
        let (forbidden, _) =
            send_json(app(&state), request("POST", "/api/sites", Some(ANA), Some(body.clone()))).await;
        let (conflict, _) =
            send_json(app(&state), request("POST", "/api/sites", Some(ADMIN), Some(body))).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["nomeDoSite"], "Carla Fotos");
        assert_eq!(created["template"], "portfolio");
        assert_eq!(forbidden, StatusCode::FORBIDDEN);
        assert_eq!(conflict, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn uploads_logo_as_data_url() {
        let state = state();
        let req = Request::builder()
            .method("PUT")
            .uri("/api/sites/ana/logo")
            .header("authorization", format!("Bearer {}", ANA))
            .header("content-type", "image/png")
            .body(Body::from(vec![0x89, 0x50, 0x4e, 0x47]))
            .unwrap();

        let (status, body) = send_json(app(&state), req).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["logo"], "data:image/png;base64,iVBORw==");
        assert_eq!(
            state.repo().load("ana").unwrap().unwrap().logo.as_deref(),
            Some("data:image/png;base64,iVBORw==")
        );
    }

    #[tokio::test]
    async fn rejects_non_image_logos() {
        let state = state();
        let req = Request::builder()
            .method("PUT")
            .uri("/api/sites/ana/logo")
            .header("authorization", format!("Bearer {}", ANA))
            .header("content-type", "text/plain")
            .body(Body::from("oi"))
            .unwrap();

        let (status, _) = send_json(app(&state), req).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn lists_models() {
        let state = state();

        let (status, models) = send_json(app(&state), request("GET", "/api/models", None, None)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(models
            .as_array()
            .unwrap()
            .iter()
            .any(|m| m["id"] == "representante"));
    }

    #[tokio::test]
    async fn filters_models_by_category() {
        let state = state();

        let (status, models) = send_json(
            app(&state),
            request("GET", "/api/models?category=portfolio", None, None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let models = models.as_array().unwrap();
        assert!(!models.is_empty());
        assert!(models.iter().all(|m| m["category"] == "portfolio"));

        let (status, _) = send_json(
            app(&state),
            request("GET", "/api/models?category=nope", None, None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn stored_site_with_largest_logo_can_be_put_back() {
        let state = state();
        let (_, mut doc) =
            send_json(app(&state), request("GET", "/api/sites/ana", Some(ADMIN), None)).await;
        // 768 KiB of image bytes, base64 encoded
        let encoded = "A".repeat(vitrine_core::media::MAX_INLINE_BYTES / 3 * 4);
        doc["logo"] = json!(format!("data:image/png;base64,{}", encoded));

        let (status, body) = send_json(
            app(&state),
            request("PUT", "/api/sites/ana", Some(ADMIN), Some(doc)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["logo"].as_str().map(str::len), Some(22 + encoded.len()));
    }

    #[tokio::test]
    async fn oversized_edits_are_refused() {
        let state = state();
        let edit = json!({ "path": "nomeDoSite", "value": "x".repeat(BODY_LIMIT + 1) });

        let (status, _) = send_json(
            app(&state),
            request("PATCH", "/api/sites/ana/fields", Some(ADMIN), Some(edit)),
        )
        .await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    }
}
