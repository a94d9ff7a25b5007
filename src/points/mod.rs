mod add;
mod range;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/point", post(add::add_point))
        .route("/points", post(range::search_points))
        .route("/points/{username}/{start}/{end}", get(range::user_points))
}
