use crate::error::ServerResult;
use crate::state::AppState;
use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use folio_content::{ContentMutation, SessionState};
use folio_render::{render_page, render_published};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/content", get(content))
        .route("/api/session", get(session))
        .route("/api/session/login", post(login))
        .route("/api/session/logout", post(logout))
        .route("/api/session/edit-mode", post(toggle_edit_mode))
        .route("/api/mutation", post(mutation))
        .route("/api/field", post(commit_field))
        .route("/api/save", post(save))
        .route("/api/reset", post(reset))
        .route("/api/export", get(export))
        .route("/api/import", post(import))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process is stopped
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Serving folio");
    axum::serve(listener, router(state)).await
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
}

// ============================================================================
// Page and content
// ============================================================================

async fn index(State(state): State<Arc<AppState>>, headers: HeaderMap) -> ServerResult<Html<String>> {
    let session = state.session().await;
    let html = if session.token_matches(bearer(&headers)) {
        render_page(state.page(), &session.overlay, state.render_options())?
    } else {
        render_published(state.page(), &session.overlay, state.render_options())?
    };
    Ok(Html(html))
}

/// Published content for everyone; the working copy for the admin
async fn content(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<Value> {
    let session = state.session().await;
    let store = session.overlay.store();
    let document = if session.token_matches(bearer(&headers)) {
        store.document()
    } else {
        store.published()
    };
    Json(document.to_value())
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    #[serde(flatten)]
    session: SessionState,
    dirty: bool,
    version: u64,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    #[serde(flatten)]
    session: SessionState,
}

fn session_response(overlay: &folio_content::Overlay) -> SessionResponse {
    SessionResponse {
        session: overlay.session(),
        dirty: overlay.store().is_dirty(),
        version: overlay.store().version(),
    }
}

async fn session(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Json<SessionResponse> {
    let session = state.session().await;
    if session.token_matches(bearer(&headers)) {
        Json(session_response(&session.overlay))
    } else {
        Json(SessionResponse {
            session: SessionState::default(),
            dirty: false,
            version: 0,
        })
    }
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> ServerResult<Json<LoginResponse>> {
    let mut session = state.session().await;
    let (_, gate) = session.overlay.parts_mut();
    gate.login(&request.email, &request.password)?;

    let token = session.issue_token();
    Ok(Json(LoginResponse {
        token,
        session: session.overlay.session(),
    }))
}

async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> ServerResult<Json<SessionResponse>> {
    let mut session = state.session().await;
    session.require_token(bearer(&headers))?;

    let (_, gate) = session.overlay.parts_mut();
    gate.logout();
    session.revoke_token();
    Ok(Json(session_response(&session.overlay)))
}

async fn toggle_edit_mode(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ServerResult<Json<SessionResponse>> {
    let mut session = state.session().await;
    session.require_token(bearer(&headers))?;

    let (_, gate) = session.overlay.parts_mut();
    gate.authorize_admin()?;
    gate.toggle_edit_mode();
    Ok(Json(session_response(&session.overlay)))
}

// ============================================================================
// Content changes
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MutationResponse {
    success: bool,
    mutation: &'static str,
    version: u64,
}

async fn mutation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(mutation): Json<ContentMutation>,
) -> ServerResult<Json<MutationResponse>> {
    let mut session = state.session().await;
    session.require_token(bearer(&headers))?;

    session.overlay.apply_mutation(&mutation)?;
    info!(mutation = mutation.name(), section = mutation.section(), "Applied mutation");

    Ok(Json(MutationResponse {
        success: true,
        mutation: mutation.name(),
        version: session.overlay.store().version(),
    }))
}

#[derive(Debug, Deserialize)]
struct FieldRequest {
    section: String,
    path: String,
    value: Value,
}

/// Typed write through the page binding at `section.path`
async fn commit_field(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<FieldRequest>,
) -> ServerResult<Json<MutationResponse>> {
    let mut session = state.session().await;
    session.require_token(bearer(&headers))?;

    session
        .overlay
        .commit_field(&request.section, &request.path, &request.value)?;
    info!(section = %request.section, path = %request.path, "Committed field");

    Ok(Json(MutationResponse {
        success: true,
        mutation: "commitField",
        version: session.overlay.store().version(),
    }))
}

async fn save(State(state): State<Arc<AppState>>, headers: HeaderMap) -> ServerResult<Json<SessionResponse>> {
    let mut session = state.session().await;
    session.require_token(bearer(&headers))?;

    let (store, gate) = session.overlay.parts_mut();
    store.save_changes(gate)?;
    Ok(Json(session_response(&session.overlay)))
}

async fn reset(State(state): State<Arc<AppState>>, headers: HeaderMap) -> ServerResult<Json<SessionResponse>> {
    let mut session = state.session().await;
    session.require_token(bearer(&headers))?;

    let (store, gate) = session.overlay.parts_mut();
    store.reset_changes(gate)?;
    Ok(Json(session_response(&session.overlay)))
}

async fn export(State(state): State<Arc<AppState>>, headers: HeaderMap) -> ServerResult<impl IntoResponse> {
    let session = state.session().await;
    session.require_token(bearer(&headers))?;

    session.overlay.gate().authorize_admin()?;
    let file = session.overlay.store().export_content()?;
    let disposition = format!("attachment; filename=\"{}\"", file.file_name);

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.contents,
    ))
}

/// Body is the raw contents of an exported file
async fn import(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> ServerResult<Json<SessionResponse>> {
    let mut session = state.session().await;
    session.require_token(bearer(&headers))?;

    let (store, gate) = session.overlay.parts_mut();
    store.import_content(gate, &body)?;
    Ok(Json(session_response(&session.overlay)))
}
