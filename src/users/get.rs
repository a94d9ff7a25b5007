use axum::{
    debug_handler,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use crate::{AppResult, AppState, Reply, dal::DbManager, db::User};

use super::require_username;

#[derive(Deserialize)]
pub(crate) struct UserQuery {
    pub(crate) user: Option<String>,
}

#[debug_handler(state = AppState)]
#[instrument(skip_all, fields(endpoint = "CheckUser", username = %username))]
pub(crate) async fn check_user(
    Path(username): Path<String>,
    State(dm): State<DbManager>,
) -> AppResult<Reply<User>> {
    let username = require_username(&username)?;
    Ok(Reply::ok(dm.get_user(username).await?))
}

/// `GET /user?user=<name>`
#[debug_handler(state = AppState)]
#[instrument(skip_all, fields(endpoint = "CheckUser"))]
pub(crate) async fn lookup_user(
    Query(UserQuery { user }): Query<UserQuery>,
    State(dm): State<DbManager>,
) -> AppResult<Reply<User>> {
    let user = user.unwrap_or_default();
    let username = require_username(&user)?;
    Ok(Reply::ok(dm.get_user(username).await?))
}
