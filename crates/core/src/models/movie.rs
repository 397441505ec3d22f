use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::Runtime;
use crate::validator::{Validator, unique};

/// Database row representation; genres are stored as a JSON array in a TEXT column
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MovieRow {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub year: i32,
    pub runtime: Runtime,
    pub genres: String,
    pub version: i32,
}

/// Application-level Movie.
///
/// Wire shape: `created_at` is never emitted, and `year`, `runtime` and
/// `genres` are left out while unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Movie {
    pub id: i64,

    #[serde(skip)]
    pub created_at: DateTime<Utc>,

    pub title: String,

    #[serde(skip_serializing_if = "is_zero")]
    pub year: i32,

    #[serde(skip_serializing_if = "Runtime::is_zero")]
    pub runtime: Runtime,

    #[serde(skip_serializing_if = "genres_unset")]
    pub genres: Option<Vec<String>>,

    pub version: i32,
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

fn genres_unset(genres: &Option<Vec<String>>) -> bool {
    genres.as_ref().is_none_or(|g| g.is_empty())
}

impl TryFrom<MovieRow> for Movie {
    type Error = Error;

    fn try_from(row: MovieRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            created_at: row.created_at,
            title: row.title,
            year: row.year,
            runtime: row.runtime,
            genres: Some(serde_json::from_str(&row.genres)?),
            version: row.version,
        })
    }
}

/// Client payload for `POST /v1/movies`. Missing fields decode to their zero
/// value and are caught by validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateMovie {
    pub title: String,
    pub year: i32,
    pub runtime: Runtime,
    pub genres: Option<Vec<String>>,
}

impl From<CreateMovie> for Movie {
    fn from(input: CreateMovie) -> Self {
        Self {
            title: input.title,
            year: input.year,
            runtime: input.runtime,
            genres: input.genres,
            ..Default::default()
        }
    }
}

/// Partial update payload; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateMovie {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub runtime: Option<Runtime>,
    pub genres: Option<Vec<String>>,
}

impl UpdateMovie {
    pub fn apply_to(self, movie: &mut Movie) {
        if let Some(title) = self.title {
            movie.title = title;
        }
        if let Some(year) = self.year {
            movie.year = year;
        }
        if let Some(runtime) = self.runtime {
            movie.runtime = runtime;
        }
        if let Some(genres) = self.genres {
            movie.genres = Some(genres);
        }
    }
}

pub const MAX_TITLE_BYTES: usize = 500;
pub const MIN_YEAR: i32 = 1888;
pub const MAX_GENRES: usize = 5;

pub fn validate_movie(v: &mut Validator, movie: &Movie) {
    validate_movie_at(v, movie, Utc::now().year());
}

/// Applies every movie rule against `current_year`. Checks never short-circuit.
pub fn validate_movie_at(v: &mut Validator, movie: &Movie, current_year: i32) {
    v.check(!movie.title.is_empty(), "title", "must be provided");
    v.check(
        movie.title.len() <= MAX_TITLE_BYTES,
        "title",
        "must not be more than 500 bytes long",
    );

    v.check(movie.year != 0, "year", "must be provided");
    v.check(movie.year >= MIN_YEAR, "year", "must be greater than 1888");
    v.check(movie.year <= current_year, "year", "must not be in the future");

    v.check(!movie.runtime.is_zero(), "runtime", "must be provided");
    v.check(movie.runtime.minutes() > 0, "runtime", "must be a positive integer");

    let genres = movie.genres.as_deref().unwrap_or_default();
    v.check(movie.genres.is_some(), "genres", "must be provided");
    v.check(!genres.is_empty(), "genres", "must contain at least 1 genre");
    v.check(
        genres.len() <= MAX_GENRES,
        "genres",
        "must not contain more than 5 genres",
    );
    v.check(unique(genres), "genres", "must not contain duplicate values");
    v.check(
        genres.iter().all(|g| !g.is_empty()),
        "genres",
        "must not contain empty values",
    );
}
