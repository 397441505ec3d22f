//! Test helpers for creating in-memory test databases and fixtures

use crate::db::{DbPool, MIGRATOR};
use sqlx::sqlite::SqlitePoolOptions;

/// Creates an in-memory SQLite database with all migrations applied
pub async fn create_test_db() -> DbPool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");

    MIGRATOR
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Test fixtures for common test data
pub mod fixtures {
    use crate::models::{Movie, Runtime};

    pub fn casablanca() -> Movie {
        Movie {
            title: "Casablanca".to_string(),
            year: 1942,
            runtime: Runtime(102),
            genres: Some(vec![
                "drama".to_string(),
                "romance".to_string(),
                "war".to_string(),
            ]),
            ..Default::default()
        }
    }

    pub fn black_panther() -> Movie {
        Movie {
            title: "Black Panther".to_string(),
            year: 2018,
            runtime: Runtime(134),
            genres: Some(vec![
                "action".to_string(),
                "adventure".to_string(),
            ]),
            ..Default::default()
        }
    }
}
