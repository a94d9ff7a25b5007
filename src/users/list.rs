use axum::{debug_handler, extract::State};
use tracing::instrument;

use crate::{AppResult, AppState, Reply, dal::DbManager, db::User};

#[debug_handler(state = AppState)]
#[instrument(skip_all, fields(endpoint = "ListUsers"))]
pub(crate) async fn list_users(State(dm): State<DbManager>) -> AppResult<Reply<Vec<User>>> {
    Ok(Reply::ok(dm.get_users().await?))
}
