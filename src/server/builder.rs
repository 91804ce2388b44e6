//! ServerBuilder for fluent API to build HTTP servers

use super::handlers::AppState;
use super::router::{build_api_routes, build_static_routes};
use crate::config::DEFAULT_CONFIG_PATH;
use crate::core::events::EventBus;
use crate::core::service::TrackerService;
use crate::core::store::TrackerStore;
use anyhow::{Result, anyhow};
use axum::Router;
use axum::http::{Method, header};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Builder for the tracker HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(SqliteStore::open("./credit_cards.db").await?)
///     .with_event_bus(1024)
///     .with_static_dir("./static")
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn TrackerStore>>,
    event_bus: Option<Arc<EventBus>>,
    config_path: PathBuf,
    static_dir: Option<PathBuf>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            event_bus: None,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            static_dir: None,
            custom_routes: Vec::new(),
        }
    }

    /// Set the storage backend (required)
    pub fn with_store(mut self, store: impl TrackerStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Publish tracker events on a new bus with the given capacity
    pub fn with_event_bus(mut self, capacity: usize) -> Self {
        self.event_bus = Some(Arc::new(EventBus::new(capacity)));
        self
    }

    /// Settings file read and written by `/api/settings`
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    /// Serve the web UI from `dir`
    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    /// Add routes that are not part of the tracker API
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// The bus the server will publish on, for subscribing before `build`
    pub fn event_bus(&self) -> Option<Arc<EventBus>> {
        self.event_bus.clone()
    }

    /// Build the final router with CORS and request tracing
    pub fn build(self) -> Result<Router> {
        let store = self
            .store
            .ok_or_else(|| anyhow!("TrackerStore is required. Call .with_store()"))?;

        let mut service = TrackerService::new(store);
        if let Some(bus) = self.event_bus {
            service = service.with_event_bus(bus);
        }

        let mut app = build_api_routes(AppState::new(service, self.config_path));
        for custom_router in self.custom_routes {
            app = app.merge(custom_router);
        }
        if let Some(dir) = &self.static_dir {
            app = app.merge(build_static_routes(dir));
        }

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

        Ok(app.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        ))
    }

    /// Serve the application with graceful shutdown
    ///
    /// Handles SIGTERM and SIGINT (Ctrl+C).
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| anyhow!("Failed to bind {}: {}", addr, e))?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
