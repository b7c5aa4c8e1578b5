//! HTTP API server for the Perch gateway

pub mod health;
pub mod skill;

use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::post;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::queue::QueueEngine;
use crate::services::Services;
use crate::Result;

/// Shared state for API handlers
///
/// Owns the one playback queue of the gateway's single logical playback
/// session. Multi-session support would hold one engine per session key;
/// nothing in the engine itself would change.
pub struct ApiState {
    /// The playback queue engine
    pub queue: QueueEngine,

    /// Configured external service clients
    pub services: Services,

    /// Expected skill application id; `None` disables verification
    pub application_id: Option<String>,
}

impl ApiState {
    /// Build state from resolved configuration
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            queue: QueueEngine::new(),
            services: Services::from_config(config),
            application_id: config.server.application_id.clone(),
        }
    }
}

/// API server
pub struct ApiServer {
    state: Arc<ApiState>,
    port: u16,
    media_dir: Option<PathBuf>,
}

impl ApiServer {
    /// Create a server from resolved configuration
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            state: Arc::new(ApiState::from_config(config)),
            port: config.server.port,
            media_dir: config.server.media_dir.clone(),
        }
    }

    /// Build the router with all routes
    #[must_use]
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .route("/", post(skill::handle_request))
            .with_state(self.state.clone())
            .merge(health::router());

        // Self-hosted audio files, when configured
        if let Some(media_dir) = &self.media_dir {
            router = router.nest_service("/media", ServeDir::new(media_dir));
            tracing::info!(path = %media_dir.display(), "serving media files");
        }

        router.layer(TraceLayer::new_for_http())
    }

    /// Run the API server
    ///
    /// # Errors
    ///
    /// Returns error if the server fails to bind or run
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| crate::Error::Config(format!("failed to bind API server: {e}")))?;

        tracing::info!(port = self.port, "skill endpoint listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::Error::Config(format!("API server error: {e}")))?;

        Ok(())
    }
}
