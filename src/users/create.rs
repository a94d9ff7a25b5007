use axum::{
    debug_handler,
    extract::{Path, State},
};
use tracing::instrument;

use crate::{AppResult, AppState, Reply, dal::DbManager, db::User};

use super::require_username;

#[debug_handler(state = AppState)]
#[instrument(skip_all, fields(endpoint = "CreateUser", username = %username))]
pub(crate) async fn create_user(
    Path(username): Path<String>,
    State(dm): State<DbManager>,
) -> AppResult<Reply<User>> {
    let username = require_username(&username)?;
    Ok(Reply::created(dm.create_user(username).await?))
}
