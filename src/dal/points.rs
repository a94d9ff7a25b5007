use sqlx::SqliteConnection;
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    db::{Exercise, Point},
    timestamp::{from_unix_millis, to_unix_millis, to_unix_millis_ceil},
};

use super::{
    DalError, DalResult, DbManager, ROLL_NUMBER, USER, internal, is_foreign_key_violation,
    users::find_user,
};

const SELECT_EXERCISE: &str = "SELECT roll_number, name FROM exercise WHERE roll_number = ?";
const INSERT_POINT: &str = "INSERT INTO finished_point \
     (username, roll_number, amount_done, timestamp_ms) VALUES (?, ?, ?, ?)";
const SELECT_POINTS: &str = "SELECT username, roll_number, amount_done, timestamp_ms \
     FROM finished_point WHERE username = ? AND timestamp_ms >= ? AND timestamp_ms < ? \
     ORDER BY timestamp_ms, id";

async fn find_exercise(conn: &mut SqliteConnection, roll_number: i64) -> DalResult<Exercise> {
    sqlx::query_as::<_, (i64, String)>(SELECT_EXERCISE)
        .bind(roll_number)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| internal(SELECT_EXERCISE, e))?
        .map(|(roll_number, name)| Exercise { roll_number, name })
        .ok_or_else(|| DalError::not_found(ROLL_NUMBER, roll_number))
}

/// User first, then exercise; the first missing one is reported.
async fn validate(conn: &mut SqliteConnection, point: &Point) -> DalResult<()> {
    find_user(conn, &point.username).await?;
    find_exercise(conn, point.exercise_number).await?;
    Ok(())
}

/// A point whose user is gone by the time of the write is reported the same
/// way as one that never had a user.
async fn insert_point(conn: &mut SqliteConnection, point: &Point) -> DalResult<()> {
    sqlx::query(INSERT_POINT)
        .bind(&point.username)
        .bind(point.exercise_number)
        .bind(point.amount)
        .bind(to_unix_millis(point.timestamp))
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                DalError::not_found(USER, &point.username)
            } else {
                internal(INSERT_POINT, e)
            }
        })?;
    Ok(())
}

impl DbManager {
    #[instrument(skip(self))]
    pub async fn check_exercise_number(&self, roll_number: i64) -> DalResult<()> {
        let mut conn = self.acquire().await?;
        find_exercise(&mut conn, roll_number).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn validate_point(&self, point: &Point) -> DalResult<()> {
        let mut conn = self.acquire().await?;
        validate(&mut conn, point).await
    }

    /// Validates and stores the point in one transaction. The foreign keys on
    /// `finished_point` back the validation up if a user vanishes in between.
    #[instrument(skip(self))]
    pub async fn add_user_point(&self, point: Point) -> DalResult<Point> {
        let mut tx = self.pool.begin().await.map_err(|e| internal("BEGIN", e))?;

        if let Err(e) = validate(&mut tx, &point).await {
            tracing::info!(error = %e, "point rejected");
            return Err(e);
        }

        insert_point(&mut tx, &point).await?;

        tx.commit().await.map_err(|e| internal("COMMIT", e))?;

        Ok(point)
    }

    /// Points of `name` with `start <= timestamp < end`, oldest first.
    #[instrument(skip(self))]
    pub async fn get_user_points(
        &self,
        name: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> DalResult<Vec<Point>> {
        let mut conn = self.acquire().await?;
        find_user(&mut conn, name).await?;

        let rows = sqlx::query_as::<_, (String, i64, i64, i64)>(SELECT_POINTS)
            .bind(name)
            .bind(to_unix_millis_ceil(start))
            .bind(to_unix_millis_ceil(end))
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| internal(SELECT_POINTS, e))?;

        rows.into_iter()
            .map(|(username, exercise_number, amount, millis)| -> DalResult<Point> {
                let timestamp = from_unix_millis(millis)
                    .map_err(|e| internal(SELECT_POINTS, sqlx::Error::Decode(Box::new(e))))?;
                Ok(Point {
                    timestamp,
                    username,
                    exercise_number,
                    amount,
                })
            })
            .collect()
    }
}
