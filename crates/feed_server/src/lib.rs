//! HTTP surface for the cleaned calendar feed.
pub mod config;
pub mod routes;
pub mod state;

use axum::{http::Method, Router};
use tower_http::cors::{Any, CorsLayer};

pub use config::{Config, ConfigError};
pub use routes::ServeError;
pub use state::AppState;

/// Build the application router. CORS allows read-only access from any origin.
pub fn build_router(state: AppState, cors_enabled: bool) -> Router {
    let app = routes::router().with_state(state);
    if !cors_enabled {
        return app;
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);
    app.layer(cors)
}
