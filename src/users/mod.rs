mod create;
mod delete;
mod get;
mod list;

use axum::{Router, routing::get};

use crate::{AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user", get(get::lookup_user))
        .route(
            "/user/{username}",
            get(get::check_user).post(create::create_user).delete(delete::delete_user),
        )
        .route("/users", get(list::list_users))
}

/// Rejects blank identifiers before anything reaches storage.
pub(crate) fn require_username(username: &str) -> AppResult<&str> {
    if username.trim().is_empty() {
        return Err("Blank user passed")?;
    }
    Ok(username)
}
