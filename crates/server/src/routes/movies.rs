use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::Response,
};

use movies_api_core::models::{CreateMovie, Movie, UpdateMovie, validate_movie};
use movies_api_core::validator::Validator;

use crate::json::{Envelope, StrictJson, read_json, write_json};
use crate::{ApiError, ApiResult, AppState};

/// Parses the `{id}` path segment; anything but a positive integer is a 404.
fn read_id_param(raw: &str) -> ApiResult<i64> {
    match raw.parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(ApiError::not_found()),
    }
}

fn validated(movie: &Movie) -> ApiResult<()> {
    let mut v = Validator::new();
    validate_movie(&mut v, movie);
    if v.valid() {
        Ok(())
    } else {
        Err(ApiError::failed_validation(v.into_errors()))
    }
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    StrictJson(input): StrictJson<CreateMovie>,
) -> ApiResult<Response> {
    let mut movie = Movie::from(input);
    validated(&movie)?;

    state.movie_service.insert(&mut movie).await?;
    tracing::debug!(id = movie.id, title = %movie.title, "movie created");

    let location = HeaderValue::try_from(format!("/v1/movies/{}", movie.id))
        .map_err(ApiError::server_error)?;
    let mut headers = HeaderMap::new();
    headers.insert(header::LOCATION, location);

    Ok(write_json(
        StatusCode::CREATED,
        Envelope::new("movie", &movie)?,
        headers,
    )?)
}

pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = read_id_param(&id)?;
    let movie = state.movie_service.get(id).await?;

    Ok(write_json(
        StatusCode::OK,
        Envelope::new("movie", &movie)?,
        HeaderMap::new(),
    )?)
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Response> {
    let id = read_id_param(&id)?;
    let input: UpdateMovie = read_json(body).await?;
    let mut movie = state.movie_service.get(id).await?;

    input.apply_to(&mut movie);
    validated(&movie)?;

    state.movie_service.update(&mut movie).await?;
    tracing::debug!(id = movie.id, version = movie.version, "movie updated");

    Ok(write_json(
        StatusCode::OK,
        Envelope::new("movie", &movie)?,
        HeaderMap::new(),
    )?)
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = read_id_param(&id)?;
    state.movie_service.delete(id).await?;

    Ok(write_json(
        StatusCode::OK,
        Envelope::new("message", "movie successfully deleted")?,
        HeaderMap::new(),
    )?)
}
