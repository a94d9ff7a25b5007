use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
}

/// One recorded completion of `amount` repetitions of an exercise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    pub username: String,
    pub exercise_number: i64,
    pub amount: i64,
}

/// Body of `POST /point`. A `timestamp` field, if sent, is ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPoint {
    #[serde(default)]
    pub username: String,
    pub exercise_number: i64,
    pub amount: i64,
}

impl NewPoint {
    pub fn stamped(self, timestamp: OffsetDateTime) -> Point {
        Point {
            timestamp,
            username: self.username,
            exercise_number: self.exercise_number,
            amount: self.amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub roll_number: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExercisePoints {
    pub username: String,
    pub points: Vec<Point>,
}
