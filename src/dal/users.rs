use sqlx::SqliteConnection;
use tracing::instrument;

use crate::db::User;

use super::{DalError, DalResult, DbManager, USER, internal};

const SELECT_USER: &str = "SELECT username FROM d20_workout_user WHERE username = ?";
const SELECT_USERS: &str = "SELECT username FROM d20_workout_user ORDER BY username";
const INSERT_USER: &str = "INSERT INTO d20_workout_user (username) VALUES (?) \
     ON CONFLICT (username) DO NOTHING RETURNING username";
const DELETE_USER_POINTS: &str = "DELETE FROM finished_point WHERE username = ?";
const DELETE_USER: &str = "DELETE FROM d20_workout_user WHERE username = ?";

pub(super) async fn find_user(conn: &mut SqliteConnection, name: &str) -> DalResult<User> {
    sqlx::query_as::<_, (String,)>(SELECT_USER)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| internal(SELECT_USER, e))?
        .map(|(username,)| User { username })
        .ok_or_else(|| DalError::not_found(USER, name))
}

impl DbManager {
    #[instrument(skip(self))]
    pub async fn get_user(&self, name: &str) -> DalResult<User> {
        let mut conn = self.acquire().await?;
        find_user(&mut conn, name).await
    }

    #[instrument(skip(self))]
    pub async fn get_users(&self) -> DalResult<Vec<User>> {
        let rows = sqlx::query_as::<_, (String,)>(SELECT_USERS)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| internal(SELECT_USERS, e))?;

        Ok(rows.into_iter().map(|(username,)| User { username }).collect())
    }

    /// Inserts iff no user with that name exists. The primary key decides,
    /// so two racing creates cannot both succeed.
    #[instrument(skip(self))]
    pub async fn create_user(&self, name: &str) -> DalResult<User> {
        let inserted = sqlx::query_as::<_, (String,)>(INSERT_USER)
            .bind(name)
            .fetch_optional(&self.pool)
            .await;

        match inserted {
            Ok(Some((username,))) => {
                tracing::info!(%username, "created user");
                Ok(User { username })
            }
            Ok(None) => Err(DalError::duplicate(USER, name)),
            Err(e) => Err(internal(INSERT_USER, e)),
        }
    }

    /// Removes the user and every point it owns as one transaction.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, name: &str) -> DalResult<User> {
        let mut tx = self.pool.begin().await.map_err(|e| internal("BEGIN", e))?;

        let user = find_user(&mut tx, name).await?;

        let points = sqlx::query(DELETE_USER_POINTS)
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(|e| internal(DELETE_USER_POINTS, e))?;

        sqlx::query(DELETE_USER)
            .bind(name)
            .execute(&mut *tx)
            .await
            .map_err(|e| internal(DELETE_USER, e))?;

        tx.commit().await.map_err(|e| internal("COMMIT", e))?;

        tracing::info!(points = points.rows_affected(), "deleted user");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::dal::memory;

    use super::*;

    #[tokio::test]
    async fn create_then_get() {
        let dm = memory().await;

        let created = dm.create_user("alice").await.unwrap();
        assert_eq!(created.username, "alice");

        let found = dm.get_user("alice").await.unwrap();
        assert_eq!(found, created);
    }

    #[tokio::test]
    async fn create_twice_is_duplicate() {
        let dm = memory().await;
        dm.create_user("alice").await.unwrap();

        let err = dm.create_user("alice").await.unwrap_err();
        assert!(matches!(err, DalError::Duplicate { kind: USER, ref name } if name == "alice"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_creates_yield_one_user() {
        let path = std::env::temp_dir().join(format!("d20-race-{}.db", std::process::id()));
        let url = format!("sqlite://{}", path.display());
        let dm = DbManager::connect(&url, 8, Duration::from_secs(10)).await.unwrap();
        dm.bootstrap().await.unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let dm = dm.clone();
                tokio::spawn(async move { dm.create_user("alice").await })
            })
            .collect();

        let mut created = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(user) => {
                    assert_eq!(user.username, "alice");
                    created += 1;
                }
                Err(DalError::Duplicate { kind: USER, .. }) => duplicates += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(duplicates, 7);
        assert_eq!(dm.get_users().await.unwrap().len(), 1);

        dm.pool().close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let dm = memory().await;

        let err = dm.get_user("bob").await.unwrap_err();
        assert!(matches!(err, DalError::NotFound { kind: USER, ref name } if name == "bob"));
    }

    #[tokio::test]
    async fn list_users() {
        let dm = memory().await;
        assert!(dm.get_users().await.unwrap().is_empty());

        dm.create_user("carol").await.unwrap();
        dm.create_user("alice").await.unwrap();

        let names: Vec<_> = dm
            .get_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, ["alice", "carol"]);
    }

    #[tokio::test]
    async fn delete_unknown_user_is_not_found() {
        let dm = memory().await;

        let err = dm.delete_user("ghost").await.unwrap_err();
        assert!(matches!(err, DalError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_frees_the_name() {
        let dm = memory().await;
        dm.create_user("alice").await.unwrap();

        dm.delete_user("alice").await.unwrap();
        assert!(matches!(dm.get_user("alice").await, Err(DalError::NotFound { .. })));

        dm.create_user("alice").await.unwrap();
    }
}
