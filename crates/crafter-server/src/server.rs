//! Local server exposing a generation session to the browser.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

use crafter_client::GenerationClient;
use crafter_core::{
    catalog, GenerationRequest, Notice, NoticeSink, SessionError, SessionOptions, SessionSnapshot,
    SessionState, Tab, ValidationError,
};
use crafter_preview::{BrowserLiveRenderer, PreviewRouter, RenderStrategy};

use crate::events::{next_event, EventHub, HubNoticeSink, ServerEvent};
use crate::pages::Pages;

/// Configuration for the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Open browser on start
    pub open: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            open: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("Server error: {0}")]
    Serve(String),
}

/// Shared server state.
pub type SharedState = Arc<RwLock<AppState>>;

/// Everything one browser session needs.
pub struct AppState {
    session: SessionState,
    preview: PreviewRouter<BrowserLiveRenderer>,
    events: EventHub,
    notices: HubNoticeSink,
    client: Arc<GenerationClient>,
    pages: Pages,
}

impl AppState {
    /// Build shared state around `client`.
    ///
    /// Retry notices from the client are forwarded to connected pages.
    pub fn shared(client: GenerationClient, options: SessionOptions) -> SharedState {
        let events = EventHub::new();
        let notices = HubNoticeSink::new(events.clone());
        let client = client.with_notices(Arc::new(notices.clone()));

        Arc::new(RwLock::new(Self {
            session: SessionState::new(options),
            preview: PreviewRouter::new(BrowserLiveRenderer::new()),
            events,
            notices,
            client: Arc::new(client),
            pages: Pages::new(),
        }))
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn events(&self) -> &EventHub {
        &self.events
    }

    /// Bring the preview surface in line with the session.
    fn sync_preview(&mut self) {
        if self.session.view().active_tab != Tab::Preview {
            self.preview.dispose();
            return;
        }

        let framework = self.session.framework().framework;
        let epoch = self.session.view().preview_epoch;
        self.preview.render(self.session.code(), framework, epoch);
    }

    fn broadcast_session(&self) -> SessionSnapshot {
        let snapshot = self.session.snapshot();
        self.events.send(ServerEvent::Session(snapshot.clone()));
        snapshot
    }

    fn reject(&self, error: ValidationError) -> ApiError {
        self.notices.notify(Notice::error(error.to_string()));
        ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, error.to_string())
    }
}

/// JSON error response.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn internal(message: impl std::fmt::Display) -> Self {
        tracing::error!("{}", message);
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Local application server.
pub struct AppServer {
    config: ServerConfig,
    state: SharedState,
}

impl AppServer {
    pub fn new(config: ServerConfig, client: GenerationClient, options: SessionOptions) -> Self {
        Self {
            config,
            state: AppState::shared(client, options),
        }
    }

    pub fn state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    /// Build the HTTP router.
    pub fn router(&self) -> Router {
        router(self.state())
    }

    /// Start serving until the process is stopped.
    pub async fn start(self) -> Result<(), ServerError> {
        let raw = format!("{}:{}", self.config.host, self.config.port);
        let addr: SocketAddr = raw.parse().map_err(|_| ServerError::InvalidAddress(raw))?;

        let app = self.router();

        tracing::info!("Starting server at http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        if self.config.open {
            let url = format!("http://{}", addr);
            if let Err(e) = open::that(&url) {
                tracing::warn!("Failed to open browser: {}", e);
            }
        }

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        Ok(())
    }
}

/// Build the router over `state`.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/frameworks", get(frameworks_handler))
        .route("/api/session", get(session_handler))
        .route("/api/generate", post(generate_handler))
        .route("/api/framework", post(framework_handler))
        .route("/api/tab", post(tab_handler))
        .route("/api/refresh", post(refresh_handler))
        .route("/api/fullscreen", post(fullscreen_handler))
        .route("/api/copy", get(copy_handler))
        .route("/api/export", get(export_handler))
        .route("/preview", get(preview_handler))
        .route("/preview/fullscreen", get(fullscreen_preview_handler))
        .route("/__events", get(ws_handler))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct GenerateBody {
    prompt: String,
    #[serde(default)]
    framework: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FrameworkBody {
    framework: String,
}

#[derive(Debug, Deserialize)]
struct TabBody {
    tab: Tab,
}

#[derive(Debug, Deserialize)]
struct FullscreenBody {
    open: bool,
}

async fn index_handler(State(state): State<SharedState>) -> Result<Html<String>, ApiError> {
    let app = state.read().await;
    app.pages
        .index(catalog::all(), &app.session.snapshot())
        .map(Html)
        .map_err(ApiError::internal)
}

async fn frameworks_handler() -> impl IntoResponse {
    Json(catalog::all())
}

async fn session_handler(State(state): State<SharedState>) -> Json<SessionSnapshot> {
    Json(state.read().await.session.snapshot())
}

async fn generate_handler(
    State(state): State<SharedState>,
    Json(body): Json<GenerateBody>,
) -> Result<(StatusCode, Json<SessionSnapshot>), ApiError> {
    let (request, client, snapshot) = {
        let mut app = state.write().await;

        if app.session.view().loading {
            return Err(ApiError::new(
                StatusCode::CONFLICT,
                SessionError::Busy.to_string(),
            ));
        }

        // Nothing changes for a rejected request
        if body.prompt.trim().is_empty() {
            return Err(app.reject(ValidationError::EmptyPrompt));
        }

        app.session.set_prompt(body.prompt);
        if let Some(id) = body.framework.as_deref() {
            app.session.select_framework(id);
        }

        let request = match app.session.begin_generation() {
            Ok(request) => request,
            Err(SessionError::Busy) => {
                return Err(ApiError::new(
                    StatusCode::CONFLICT,
                    SessionError::Busy.to_string(),
                ))
            }
            Err(SessionError::Validation(e)) => return Err(app.reject(e)),
        };

        (request, Arc::clone(&app.client), app.broadcast_session())
    };

    tokio::spawn(run_generation(state, client, request));

    Ok((StatusCode::ACCEPTED, Json(snapshot)))
}

/// Run one generation and apply its result to the session.
async fn run_generation(state: SharedState, client: Arc<GenerationClient>, request: GenerationRequest) {
    let result = client.generate(&request).await;

    let mut app = state.write().await;
    let notice = app.session.finish_generation(result);
    app.notices.notify(notice);
    app.sync_preview();
    app.broadcast_session();
}

async fn framework_handler(
    State(state): State<SharedState>,
    Json(body): Json<FrameworkBody>,
) -> Json<SessionSnapshot> {
    let mut app = state.write().await;
    app.session.select_framework(&body.framework);
    app.sync_preview();
    Json(app.broadcast_session())
}

async fn tab_handler(
    State(state): State<SharedState>,
    Json(body): Json<TabBody>,
) -> Json<SessionSnapshot> {
    let mut app = state.write().await;
    app.session.select_tab(body.tab);
    app.sync_preview();
    Json(app.broadcast_session())
}

async fn refresh_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let mut app = state.write().await;
    let epoch = app.session.refresh_preview();
    app.sync_preview();

    let strategy = RenderStrategy::for_framework(app.session.framework().framework);
    app.events.send(ServerEvent::Remount { epoch, strategy });
    app.broadcast_session();

    Json(json!({ "epoch": epoch }))
}

async fn fullscreen_handler(
    State(state): State<SharedState>,
    Json(body): Json<FullscreenBody>,
) -> Json<SessionSnapshot> {
    let mut app = state.write().await;
    app.session.set_fullscreen(body.open);
    Json(app.broadcast_session())
}

async fn copy_handler(State(state): State<SharedState>) -> Result<Response, ApiError> {
    let app = state.read().await;
    match app.session.copy_code() {
        Ok(code) => Ok((
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            code.to_string(),
        )
            .into_response()),
        Err(e) => Err(app.reject(e)),
    }
}

async fn export_handler(State(state): State<SharedState>) -> Result<Response, ApiError> {
    let app = state.read().await;
    let file = app.session.export().map_err(|e| app.reject(e))?;

    tracing::info!("Exporting {}", file.file_name);

    Ok((
        [
            (header::CONTENT_TYPE, file.mime_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ),
        ],
        file.contents,
    )
        .into_response())
}

async fn preview_handler(State(state): State<SharedState>) -> Result<Html<String>, ApiError> {
    let mut app = state.write().await;

    let framework = app.session.framework().framework;
    let epoch = app.session.view().preview_epoch;
    let AppState {
        session, preview, ..
    } = &mut *app;

    // The surface only exists while the Preview tab is shown
    if session.view().active_tab == Tab::Preview {
        preview.render(session.code(), framework, epoch);
    } else {
        preview.dispose();
    }

    preview.page().map(Html).map_err(ApiError::internal)
}

async fn fullscreen_preview_handler(
    State(state): State<SharedState>,
) -> Result<Html<String>, ApiError> {
    let app = state.read().await;
    app.preview
        .fullscreen_page(app.session.code(), app.session.view().preview_epoch)
        .map(Html)
        .map_err(ApiError::internal)
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<SharedState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Forward server events to one WebSocket client.
async fn handle_ws(mut socket: WebSocket, state: SharedState) {
    let (mut rx, snapshot) = {
        let app = state.read().await;
        (app.events.subscribe(), app.session.snapshot())
    };

    for event in [ServerEvent::Connected, ServerEvent::Session(snapshot)] {
        if !send_event(&mut socket, &event).await {
            return;
        }
    }

    while let Some(event) = next_event(&mut rx).await {
        if !send_event(&mut socket, &event).await {
            break;
        }
    }
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> bool {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!("Failed to encode event: {}", e);
            return true;
        }
    };
    socket.send(Message::Text(json.into())).await.is_ok()
}
