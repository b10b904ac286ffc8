//! Gateway server and router.

use crate::error::GatewayError;
use crate::{handlers, ws, Result};
use axum::http::{header, HeaderValue, Method};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{extract::State, Json, Router};
use promptdock_core::Settings;
use promptdock_providers::ModelFactory;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: IpAddr,

    /// Port number.
    pub port: u16,

    /// Enable CORS for local frontend development.
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: promptdock_core::DEFAULT_PORT,
            cors: true,
        }
    }
}

/// Shared state behind every handler.
///
/// Read-only after startup; no locking needed.
pub struct AppState {
    /// Process-wide settings.
    pub settings: Settings,

    /// Provider factory built from the settings.
    pub factory: ModelFactory,
}

impl AppState {
    /// Build state from settings.
    pub fn new(settings: Settings) -> Self {
        let factory = ModelFactory::new(settings.clone());
        Self { settings, factory }
    }

    /// State with default settings, for unit tests.
    #[doc(hidden)]
    pub fn for_tests() -> Self {
        Self::new(Settings::default())
    }
}

/// The relay server.
pub struct Server {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl Server {
    /// Create a server from settings.
    pub fn new(config: ServerConfig, settings: Settings) -> Self {
        Self {
            config,
            state: Arc::new(AppState::new(settings)),
        }
    }

    /// Build the router with all chat and analysis routes.
    pub fn router(state: Arc<AppState>, cors: bool) -> Router {
        let mut router = Router::new()
            .route("/api/chat", post(handlers::chat::chat))
            .route("/api/chat/config", get(handlers::chat::config))
            .route("/api/chat/ws", get(ws::ws_handler))
            .route("/api/ai-analysis/analyze", post(handlers::analysis::analyze))
            .route("/api/ai-analysis/generate", post(handlers::analysis::generate))
            .route("/api/health", get(health_handler))
            .with_state(state);

        if cors {
            router = router.layer(cors_layer());
        }

        router.layer(TraceLayer::new_for_http())
    }

    /// Run the server until the process exits.
    pub async fn run(&self) -> Result<()> {
        let addr = SocketAddr::new(self.config.host, self.config.port);
        let app = Self::router(self.state.clone(), self.config.cors);

        info!("Starting chat relay on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(GatewayError::Io)?;

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(|e| GatewayError::Internal(e.to_string()))?;

        Ok(())
    }
}

/// Permissive localhost CORS for the SPA dev server.
fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:5173",
        "http://localhost:3000",
        "http://127.0.0.1:5173",
        "http://127.0.0.1:3000",
    ]
    .iter()
    .filter_map(|o| HeaderValue::from_str(o).ok())
    .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Health check handler.
async fn health_handler(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "time": chrono::Utc::now().to_rfc3339(),
    }))
}
