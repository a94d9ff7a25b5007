//! Liveness endpoints. `/test` answers with random values so a caller can
//! tell a fresh response from a cached one.

use axum::{Router, debug_handler, routing::get};
use rand::{Rng, distr::Alphanumeric};
use serde::Serialize;

use crate::Reply;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    pub test_bool: bool,
    pub test_int: u32,
    pub test_string: String,
}

impl HealthCheck {
    pub fn random() -> Self {
        let mut rng = rand::rng();
        let test_int = rng.random_range(0..100);
        let test_string = (&mut rng)
            .sample_iter(&Alphanumeric)
            .take(15)
            .map(char::from)
            .collect();

        Self {
            test_bool: test_int <= 50,
            test_int,
            test_string,
        }
    }
}

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(welcome))
        .route("/test", get(test))
}

#[debug_handler]
async fn welcome() -> &'static str {
    "welcome"
}

#[debug_handler]
async fn test() -> Reply<HealthCheck> {
    Reply::ok(HealthCheck::random())
}
