pub mod appresult;
pub mod config;
pub mod dal;
pub mod db;
pub mod health;
pub mod logging;
pub mod points;
pub mod res;
pub mod timestamp;
pub mod users;

use std::time::Duration;

use axum::{Router, extract::FromRef, http::StatusCode};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

pub use appresult::{AppError, AppResult, Reply};
use dal::DbManager;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub dm: DbManager,
}

/// Every route of the service. A request that outlives `request_timeout` is
/// answered with 408 and its in-flight query is dropped.
pub fn router(app_state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .merge(health::router())
        .merge(users::router())
        .merge(points::router())
        .with_state(app_state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
