pub mod request_id;

use axum::{middleware, routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::controllers::{health, narration::NarrationController};
use crate::infrastructure::config::Config;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

/// Build the application router
pub fn create_router(narration_controller: Arc<NarrationController>) -> Router {
    let narration_routes = Router::new()
        .route("/api/narrations", post(NarrationController::create))
        .route("/api/narrations/batch", post(NarrationController::create_batch))
        .with_state(narration_controller.clone());

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(narration_controller)
        .merge(narration_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    narration_controller: Arc<NarrationController>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(narration_controller);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
