use chrono::Utc;

use crate::db::DbPool;
use crate::error::{Error, Result};
use crate::models::{Movie, MovieRow};

#[derive(Clone)]
pub struct MovieService {
    pool: DbPool,
}

impl MovieService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Inserts a validated movie and fills in its system-generated
    /// `id`, `created_at` and `version`.
    pub async fn insert(&self, movie: &mut Movie) -> Result<()> {
        let now = Utc::now();
        let genres = serde_json::to_string(movie.genres.as_deref().unwrap_or_default())?;

        let (id, version) = sqlx::query_as::<_, (i64, i32)>(
            r#"
            INSERT INTO movies (created_at, title, year, runtime, genres)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id, version
            "#,
        )
        .bind(now.to_rfc3339())
        .bind(&movie.title)
        .bind(movie.year)
        .bind(movie.runtime)
        .bind(genres)
        .fetch_one(&self.pool)
        .await?;

        movie.id = id;
        movie.created_at = now;
        movie.version = version;
        Ok(())
    }

    pub async fn get(&self, id: i64) -> Result<Movie> {
        if id < 1 {
            return Err(Error::RecordNotFound);
        }

        let row = sqlx::query_as::<_, MovieRow>(
            "SELECT id, created_at, title, year, runtime, genres, version FROM movies WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::RecordNotFound)?;

        row.try_into()
    }

    /// Writes the movie back if its `version` still matches the stored one,
    /// then bumps `version`. A stale version yields [`Error::EditConflict`].
    pub async fn update(&self, movie: &mut Movie) -> Result<()> {
        let genres = serde_json::to_string(movie.genres.as_deref().unwrap_or_default())?;

        let version = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE movies
            SET title = ?, year = ?, runtime = ?, genres = ?, version = version + 1
            WHERE id = ? AND version = ?
            RETURNING version
            "#,
        )
        .bind(&movie.title)
        .bind(movie.year)
        .bind(movie.runtime)
        .bind(genres)
        .bind(movie.id)
        .bind(movie.version)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(Error::EditConflict)?;

        movie.version = version;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        if id < 1 {
            return Err(Error::RecordNotFound);
        }

        let result = sqlx::query("DELETE FROM movies WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::RecordNotFound);
        }

        Ok(())
    }
}
