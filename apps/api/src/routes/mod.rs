pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::controller::handlers;
use crate::extract::MAX_PDF_BYTES;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Any-origin CORS with the methods/headers a JSON POST needs. Applied
    // here rather than in main so preflight OPTIONS and error responses carry
    // the same headers as success responses, and router tests cover all
    // three.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_handler))
        // Stateless rewrite proxy (trust boundary for the provider credential)
        .route("/api/v1/rewrite", post(handlers::handle_rewrite))
        // Session pipeline
        .route("/api/v1/resume", post(handlers::handle_upload_resume))
        .route(
            "/api/v1/job-description",
            put(handlers::handle_set_job_description),
        )
        .route("/api/v1/optimize", post(handlers::handle_optimize))
        .route("/api/v1/download", get(handlers::handle_download))
        // Axum's default 2 MB body cap is below the 5 MB resume limit;
        // the handler still enforces the exact file-size rule.
        .layer(DefaultBodyLimit::max(MAX_PDF_BYTES + 64 * 1024))
        .layer(cors)
        .with_state(state)
}
