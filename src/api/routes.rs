//! REST API routes configuration

use crate::api::handlers::{self, ApiState};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

/// Create the API router with all routes
pub fn create_router(state: ApiState) -> Router {
    // Permissive CORS for browser clients
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Ledger operations
        .route("/transactions/new", post(handlers::new_transaction))
        .route("/mine", post(handlers::mine_block))
        .route("/chain", get(handlers::get_chain))
        .route("/chain/validate", get(handlers::validate_chain))
        // Add state and middleware
        .with_state(state)
        .layer(cors)
}
