use axum::{Json, debug_handler, extract::State, extract::rejection::JsonRejection};
use tracing::instrument;

use crate::{
    AppResult, AppState, Reply,
    dal::DbManager,
    db::{NewPoint, Point},
    timestamp,
    users::require_username,
};

/// Records a point stamped with the server's clock.
#[debug_handler(state = AppState)]
#[instrument(skip_all, fields(endpoint = "AddPoint"))]
pub(crate) async fn add_point(
    State(dm): State<DbManager>,
    body: Result<Json<NewPoint>, JsonRejection>,
) -> AppResult<Reply<Point>> {
    let Json(new_point) = body?;
    require_username(&new_point.username)?;

    let point = dm.add_user_point(new_point.stamped(timestamp::now_utc())).await?;
    Ok(Reply::ok(point))
}
