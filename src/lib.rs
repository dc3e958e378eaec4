//! Login and guess-saving API for a betting pool.
//!
//! `POST /api/login` checks a participant's access code against a table of
//! SHA-256 digests. `POST /api/salvar` rate-limits by caller IP, validates the
//! submitted guesses and relays them to a Google Apps Script that writes the
//! spreadsheet. Nothing is persisted locally.

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod client_ip;
pub mod config;
pub mod cors;
pub mod credentials;
pub mod error;
pub mod forward;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod state;

use cors::{api_endpoint, with_cors};
use handlers::{health_handler, login_handler, metrics_handler, save_handler};
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let routes = Router::new()
        .route("/api/login", api_endpoint(login_handler))
        .route("/api/salvar", api_endpoint(save_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler));

    with_cors(routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
