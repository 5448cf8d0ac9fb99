//! HTTP server glue with graceful shutdown
//!
//! Binds a [`WorkspaceProvider`] to an axum listener: every inbound
//! request is converted to a [`RequestContext`], dispatched through the
//! provider's filter chain, and the resulting [`ResponseContext`]
//! converted back. Transport-level middleware (timeouts, body limits,
//! panic recovery) wraps the whole stack here; the dispatcher itself
//! never blocks on I/O.

use axum::{
    body::Body,
    extract::State,
    http::Request as HttpRequest,
    response::{IntoResponse, Response},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{
    config::Config,
    error::Result,
    provider::WorkspaceProvider,
    request::RequestContext,
    response,
};

/// Server instance
pub struct Server {
    config: Config,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the server around the given provider
    pub async fn serve(self, provider: Arc<WorkspaceProvider>) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.service.port));

        tracing::info!("Starting {} on {}", self.config.service.name, addr);

        let app = self.router(provider);

        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Build the router and middleware stack for a provider
    pub fn router(&self, provider: Arc<WorkspaceProvider>) -> Router {
        let body_limit = self.config.middleware.body_limit_mb * 1024 * 1024;
        let cors_layer = self.build_cors_layer();

        // Layers are applied individually so axum re-boxes the response body to
        // `axum::body::Body` between each one; this keeps the same onion ordering
        // as a `ServiceBuilder` (first listed = outermost) while satisfying
        // `TimeoutLayer`'s `ResBody: Default` bound. With `Router::layer` the last
        // call is the outermost, so the layers are written bottom-to-top here.
        Router::new()
            .fallback(dispatch_handler)
            .with_state(provider)
            // Tracing (innermost, always enabled)
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().include_headers(true))
                    .on_response(DefaultOnResponse::new().include_headers(true)),
            )
            // Request body size limit - configurable via config
            .layer(RequestBodyLimitLayer::new(body_limit))
            // Request timeout
            .layer(TimeoutLayer::with_status_code(
                http::StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(self.config.service.timeout_secs),
            ))
            // Compression - always enabled (minimal overhead)
            .layer(CompressionLayer::new())
            // CORS - configurable
            .layer(cors_layer)
            // Panic recovery (outermost) - always enabled for stability
            .layer(CatchPanicLayer::new())
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build CORS layer based on configuration
    fn build_cors_layer(&self) -> CorsLayer {
        match self.config.middleware.cors_mode.as_str() {
            "permissive" => {
                tracing::debug!("Enabling permissive CORS");
                CorsLayer::permissive()
            }
            "restrictive" => {
                tracing::debug!("Enabling restrictive CORS (default deny)");
                CorsLayer::new()
            }
            "disabled" => {
                tracing::debug!("CORS disabled (using restrictive)");
                CorsLayer::new()
            }
            _ => {
                tracing::warn!(
                    "Unknown CORS mode: {}, defaulting to permissive",
                    self.config.middleware.cors_mode
                );
                CorsLayer::permissive()
            }
        }
    }
}

/// Convert an axum request, dispatch it, and convert the response back
async fn dispatch_handler(
    State(provider): State<Arc<WorkspaceProvider>>,
    request: HttpRequest<Body>,
) -> Response {
    let (parts, body) = request.into_parts();

    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::info!("Failed to read request body: {}", err);
            return response::bad_request().into_response();
        }
    };

    let mut context = RequestContext::new(parts.method, parts.uri).with_headers(parts.headers);

    if !bytes.is_empty() {
        context = context.with_body(bytes);
    }

    provider.dispatch(&context).await.into_response()
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    tracing::info!("Shutdown signal received, draining requests...");
}
