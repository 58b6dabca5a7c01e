//! Server initialization and routing
//!
//! This module handles the Axum server setup including:
//! - Router configuration for the framework and raw adapters
//! - Middleware stack (CORS, logging, compression, timeouts, panics)
//! - Graceful shutdown handling

use crate::config::ServerConfig;
use crate::cors::cors_layer;
use crate::error::ServerError;
use crate::middleware::{log_requests, render_timeout, request_id};
use crate::raw::RawHandler;
use crate::routes::{api_info, files, health, method_not_allowed, not_found, upload};
use crate::state::ServerState;
use axum::body::{Body, Bytes};
use axum::extract::rejection::BytesRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use axum::middleware::{from_fn, map_response};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, post};
use axum::Router;
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes and middleware
///
/// - Framework routes: `/`, `/health`, `/upload`, `/files`, `/metrics`,
///   wrapped in the tower-http CORS layer
/// - Raw routes: `/api`, `/api/health`, `/api/upload`, served by
///   [`RawHandler`], which writes its own CORS headers
///
/// Global middleware, innermost first: body limit, timeout (rendered as JSON),
/// compression, request logging, request id, tracing, panic recovery.
pub fn build_router(state: Arc<ServerState>) -> Router {
    let config = state.config.clone();

    let framework_routes = Router::new()
        .route("/", get(api_info).fallback(method_not_allowed))
        .route("/health", get(health::health_check).fallback(method_not_allowed))
        .route("/upload", post(upload::upload_file).fallback(method_not_allowed))
        .route("/files", get(files::list_files).fallback(method_not_allowed))
        .route("/metrics", get(health::metrics).fallback(method_not_allowed))
        .fallback(not_found)
        .layer(cors_layer(&config.cors))
        .with_state(state.clone());

    let raw = Arc::new(RawHandler::new(&config, state.store.clone()));
    let raw_routes = Router::new()
        .route("/api", any(raw_api))
        .route("/api/health", any(raw_api))
        .route("/api/upload", any(raw_api))
        .with_state(raw);

    Router::new()
        .merge(framework_routes)
        .merge(raw_routes)
        .layer(DefaultBodyLimit::max(config.max_body_size()))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.timeout(),
        ))
        .layer(map_response(render_timeout))
        .layer(CompressionLayer::new())
        .layer(from_fn(log_requests))
        .layer(from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
}

/// Bridge axum to the framework-free handler
async fn raw_api(
    State(raw): State<Arc<RawHandler>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            let err = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ServerError::BodyTooLarge(raw.body_limit_mb())
            } else {
                ServerError::MalformedMultipart(rejection.body_text())
            };
            return raw.error_response(&headers, &err).map(Body::from).into_response();
        }
    };

    let mut request = Request::new(body);
    *request.method_mut() = method;
    *request.uri_mut() = uri;
    *request.headers_mut() = headers;

    raw.handle(request).await.map(Body::from).into_response()
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(panic = %detail, "handler panicked");
    ServerError::Internal("handler panicked".to_string()).into_response()
}

/// Start the drawgate HTTP server
///
/// Initializes logging and metrics, creates the upload directory, and serves
/// until Ctrl+C or SIGTERM.
///
/// ```rust,no_run
/// use server::ServerConfig;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = ServerConfig::load()?;
///     server::start_server(config).await?;
///     Ok(())
/// }
/// ```
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .json()
        .init();

    health::mark_start();

    let mut state = ServerState::new(config.clone())?;
    if config.metrics_enabled {
        state = state.with_metrics(crate::metrics::install()?);
    }

    let app = build_router(Arc::new(state));

    let addr: SocketAddr = config.socket_addr()?;

    tracing::info!(
        "Starting drawgate server on {} with upload dir {}",
        addr,
        config.gateway.storage.upload_dir.display()
    );
    tracing::info!(
        "Timeout: {}s, Max body: {}MB, Max upload: {} bytes",
        config.timeout_secs,
        config.max_body_size_mb,
        config.gateway.ingest.max_upload_bytes
    );
    tracing::info!(
        "CORS origins: {}, Metrics: {}",
        if config.cors.is_wildcard() {
            "*".to_string()
        } else {
            config.cors.allowed_origins.join(",")
        },
        config.metrics_enabled
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Shutdown signal handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}
