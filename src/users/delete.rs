use axum::{
    debug_handler,
    extract::{Path, State},
};
use tracing::instrument;

use crate::{AppResult, AppState, Reply, dal::DbManager, db::User};

use super::require_username;

/// Deletes the user and all of its points; echoes the removed user.
#[debug_handler(state = AppState)]
#[instrument(skip_all, fields(endpoint = "DeleteUser", username = %username))]
pub(crate) async fn delete_user(
    Path(username): Path<String>,
    State(dm): State<DbManager>,
) -> AppResult<Reply<User>> {
    let username = require_username(&username)?;
    Ok(Reply::ok(dm.delete_user(username).await?))
}
