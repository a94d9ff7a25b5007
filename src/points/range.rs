use axum::{
    Json, debug_handler,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    AppError, AppResult, AppState, Reply,
    dal::DbManager,
    db::ExercisePoints,
    timestamp::parse_path_timestamp,
    users::require_username,
};

/// Body of `POST /points`, RFC 3339 times.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PointsRequest {
    #[serde(default)]
    username: String,
    #[serde(with = "time::serde::rfc3339")]
    start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    end_time: OffsetDateTime,
}

fn parse_bound(raw: &str) -> AppResult<OffsetDateTime> {
    parse_path_timestamp(raw).map_err(|e| {
        tracing::debug!(raw, error = %e, "bad timestamp");
        AppError::Validation(format!(
            "Invalid time format '{raw}', expected YYYY-MM-DDTHH:MM:SS±HHMM"
        ))
    })
}

async fn window(
    dm: &DbManager,
    username: &str,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> AppResult<Reply<ExercisePoints>> {
    let points = dm.get_user_points(username, start, end).await?;
    Ok(Reply::ok(ExercisePoints {
        username: username.to_owned(),
        points,
    }))
}

/// `GET /points/{username}/{start}/{end}`, window is `[start, end)`.
#[debug_handler(state = AppState)]
#[instrument(skip_all, fields(endpoint = "GetPoints", username = %username))]
pub(crate) async fn user_points(
    Path((username, start, end)): Path<(String, String, String)>,
    State(dm): State<DbManager>,
) -> AppResult<Reply<ExercisePoints>> {
    let username = require_username(&username)?;
    let start = parse_bound(&start)?;
    let end = parse_bound(&end)?;

    window(&dm, username, start, end).await
}

#[debug_handler(state = AppState)]
#[instrument(skip_all, fields(endpoint = "SearchPoints"))]
pub(crate) async fn search_points(
    State(dm): State<DbManager>,
    body: Result<Json<PointsRequest>, JsonRejection>,
) -> AppResult<Reply<ExercisePoints>> {
    let Json(request) = body?;
    let username = require_username(&request.username)?;

    window(&dm, username, request.start_time, request.end_time).await
}
