//! REST API exposing the ledger over HTTP

pub mod handlers;
pub mod routes;

pub use handlers::ApiState;
pub use routes::create_router;
