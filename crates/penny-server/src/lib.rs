//! Penny Web Server
//!
//! Axum-based REST API for the Penny budgeting helper.
//!
//! Each client creates a session and logs expenses into it; the summary,
//! dashboard and savings advice are computed from that session's expenses.
//! Sessions live in memory and expire after 30 minutes of inactivity.
//!
//! Security features:
//! - Restrictive CORS policy
//! - Upload size limit for bill/statement images
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use penny_core::{AIClient, Assistant, Config, SearchClient};

mod handlers;

pub use handlers::SessionManager;

/// Maximum file upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    pub config: Config,
    /// AI client used for health reporting (None when not configured)
    pub ai: Option<AIClient>,
    pub search: SearchClient,
    /// Orchestrator handle (None when no AI backend is configured)
    pub assistant: Option<Assistant>,
    pub sessions: SessionManager,
}

impl AppState {
    /// Build state from configuration and environment credentials
    pub fn from_config(config: Config) -> Self {
        let ai = AIClient::from_config(&config.ai);
        let search = SearchClient::from_config(&config.search);

        match ai {
            Some(ref client) => info!(
                "AI backend configured: {} at {} (text: {}, vision: {})",
                client.backend_name(),
                client.host(),
                client.model(),
                client.vision_model()
            ),
            None => info!(
                "ℹ️  AI backend '{}' not configured (set GEMINI_API_KEY or choose another AI_BACKEND)",
                config.ai.backend
            ),
        }
        if search.is_enabled() {
            info!("Web search backend: {}", search.backend_name());
        } else {
            info!("ℹ️  Web search not configured (set TAVILY_API_KEY); advice will skip web research");
        }

        let assistant = ai
            .clone()
            .map(|client| Assistant::from_clients(client, search.clone(), &config));

        Self {
            config,
            ai,
            search,
            assistant,
            sessions: SessionManager::new(),
        }
    }

    /// Build state around an existing assistant (tests, embedding)
    pub fn with_assistant(config: Config, assistant: Assistant) -> Self {
        Self {
            config,
            ai: Some(AIClient::mock()),
            search: SearchClient::mock(),
            assistant: Some(assistant),
            sessions: SessionManager::new(),
        }
    }

    pub(crate) fn assistant(&self) -> Result<&Assistant, AppError> {
        self.assistant
            .as_ref()
            .ok_or_else(|| AppError::service_unavailable("AI backend not configured"))
    }
}

/// Create the application router
pub fn create_router(config: Config, static_dir: Option<&str>, server: ServerConfig) -> Router {
    create_router_with_state(AppState::from_config(config), static_dir, server)
}

/// Create the application router around prepared state
pub fn create_router_with_state(
    state: AppState,
    static_dir: Option<&str>,
    server: ServerConfig,
) -> Router {
    let state = Arc::new(state);

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        // Sessions
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/:id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        // Expenses
        .route(
            "/sessions/:id/expenses",
            get(handlers::list_expenses).post(handlers::add_expense),
        )
        .route("/sessions/:id/summary", get(handlers::get_summary))
        .route("/sessions/:id/dashboard", get(handlers::get_dashboard))
        .route("/sessions/:id/advice", post(handlers::get_advice))
        // Q&A
        .route("/ask", post(handlers::ask))
        .route(
            "/ask-image",
            post(handlers::ask_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE + 64 * 1024)),
        );

    // Build CORS layer
    let cors = if server.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = server
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    };

    // CSP: same-origin scripts, inline styles, data: images for previews
    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' blob: data:; font-src 'self'; connect-src 'self'; frame-ancestors 'none'"
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve(
    config: Config,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
) -> anyhow::Result<()> {
    serve_with_config(config, host, port, static_dir, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    config: Config,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    server: ServerConfig,
) -> anyhow::Result<()> {
    let state = AppState::from_config(config);
    check_ai_connection(state.ai.as_ref()).await;

    let app = create_router_with_state(state, static_dir, server);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection(ai: Option<&AIClient>) {
    match ai {
        Some(client) => {
            if client.health_check().await {
                info!(
                    "✅ AI backend connected: {} ({})",
                    client.backend_name(),
                    client.model()
                );
            } else {
                warn!(
                    "⚠️  AI backend configured but not responding: {} ({})",
                    client.host(),
                    client.model()
                );
            }
        }
        None => {
            info!("ℹ️  AI features disabled until an AI backend is configured");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn bad_gateway(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn service_unavailable(msg: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.to_string(),
            internal: None,
        }
    }

    /// Map a core error: validation → 400, collaborator failure → 502, else 500
    pub fn from_core(err: penny_core::Error) -> Self {
        match err {
            penny_core::Error::Validation(e) => Self::bad_request(&e.to_string()),
            penny_core::Error::AdvisoryUnavailable(_) => Self {
                internal: Some(err.into()),
                ..Self::bad_gateway("Savings advice is unavailable right now. Please try again later.")
            },
            penny_core::Error::CollaboratorUnavailable(_) => Self {
                internal: Some(err.into()),
                ..Self::bad_gateway("The AI service is unavailable right now. Please try again later.")
            },
            other => other.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
