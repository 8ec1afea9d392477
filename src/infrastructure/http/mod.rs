use axum::{
    error_handling::HandleErrorLayer,
    middleware,
    routing::{get, post},
    BoxError, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::controllers::{health, webhook::WebhookController};
use crate::error::AppError;
use crate::infrastructure::config::Config;

pub mod request_id;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

/// Build the application router
///
/// A webhook call that outlives `request_timeout` gets a 408 JSON error and
/// its handler future is dropped, which cancels any in-flight synthesis or
/// upload and removes the temporary artifact.
pub fn build_router(webhook_controller: Arc<WebhookController>, request_timeout: Duration) -> Router {
    let webhook_routes = Router::new()
        .route("/webhook", post(WebhookController::receive))
        .with_state(webhook_controller)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(request_timeout),
        );

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .merge(webhook_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

async fn handle_middleware_error(err: BoxError) -> AppError {
    if err.is::<tower::timeout::error::Elapsed>() {
        AppError::Timeout
    } else {
        AppError::Internal(err.to_string())
    }
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    app: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
