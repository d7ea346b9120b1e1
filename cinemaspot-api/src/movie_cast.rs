use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use cinemaspot_core::catalog::{MovieCast, MovieCastInput};
use cinemaspot_core::validation::validate;

use crate::error::{ApiJson, ApiPath, AppError};
use crate::middleware::admin;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_cast).merge(admin(post(add_to_cast), state)))
        .route("/movie/{movie_id}", get(list_movie_cast))
        .route(
            "/{movie}/{actor}",
            get(get_cast_entry).merge(admin(delete(remove_from_cast), state)),
        )
}

/// GET /api/movie-cast
async fn list_cast(State(state): State<AppState>) -> Result<Json<Vec<MovieCast>>, AppError> {
    Ok(Json(state.movie_cast.list().await?))
}

/// GET /api/movie-cast/movie/{movie_id}
async fn list_movie_cast(
    State(state): State<AppState>,
    ApiPath(movie_id): ApiPath<i32>,
) -> Result<Json<Vec<MovieCast>>, AppError> {
    Ok(Json(state.movie_cast.list_by_movie(movie_id).await?))
}

/// GET /api/movie-cast/{movie}/{actor}
async fn get_cast_entry(
    State(state): State<AppState>,
    ApiPath((movie, actor)): ApiPath<(i32, i32)>,
) -> Result<Json<MovieCast>, AppError> {
    let entry = state
        .movie_cast
        .find(movie, actor)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Cast entry not found".into()))?;
    Ok(Json(entry))
}

/// POST /api/movie-cast
async fn add_to_cast(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<MovieCastInput>,
) -> Result<(StatusCode, Json<MovieCast>), AppError> {
    validate(&req)?;

    if state.movies.find(req.movie).await?.is_none() {
        return Err(AppError::NotFoundError("Movie not found".into()));
    }
    if state.actors.find(req.actor).await?.is_none() {
        return Err(AppError::NotFoundError("Actor not found".into()));
    }
    if state.movie_cast.find(req.movie, req.actor).await?.is_some() {
        return Err(AppError::ConflictError("Actor is already in this movie's cast".into()));
    }

    Ok((StatusCode::CREATED, Json(state.movie_cast.create(&req).await?)))
}

/// DELETE /api/movie-cast/{movie}/{actor}
async fn remove_from_cast(
    State(state): State<AppState>,
    ApiPath((movie, actor)): ApiPath<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    state.movie_cast.delete(movie, actor).await?;
    Ok(StatusCode::NO_CONTENT)
}
