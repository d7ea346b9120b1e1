use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use cinemaspot_core::catalog::{MovieDetail, MovieInput};
use cinemaspot_core::validation::validate;

use crate::error::{ApiJson, ApiPath, AppError};
use crate::middleware::admin;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_movies).merge(admin(post(create_movie), state)))
        .route(
            "/{id}",
            get(get_movie).merge(admin(put(update_movie).delete(delete_movie), state)),
        )
}

async fn check_references(state: &AppState, req: &MovieInput) -> Result<(), AppError> {
    if state.categories.find(req.category).await?.is_none() {
        return Err(AppError::NotFoundError("Category not found".into()));
    }
    for showtime in &req.showtimes {
        if state.rooms.find(showtime.room).await?.is_none() {
            return Err(AppError::NotFoundError("Room not found".into()));
        }
    }
    Ok(())
}

/// GET /api/movies
async fn list_movies(State(state): State<AppState>) -> Result<Json<Vec<MovieDetail>>, AppError> {
    let mut movies = state.movies.list().await?;
    movies.sort_by_key(|m| m.id);
    Ok(Json(movies))
}

/// GET /api/movies/{id}
async fn get_movie(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<MovieDetail>, AppError> {
    let movie = state
        .movies
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Movie not found".into()))?;
    Ok(Json(movie))
}

/// POST /api/movies
async fn create_movie(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<MovieInput>,
) -> Result<(StatusCode, Json<MovieDetail>), AppError> {
    validate(&req)?;
    check_references(&state, &req).await?;

    let movie = state.movies.create(&req).await?;
    Ok((StatusCode::CREATED, Json(movie)))
}

/// PUT /api/movies/{id}
async fn update_movie(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(req): ApiJson<MovieInput>,
) -> Result<Json<MovieDetail>, AppError> {
    validate(&req)?;
    check_references(&state, &req).await?;

    Ok(Json(state.movies.update(id, &req).await?))
}

/// DELETE /api/movies/{id}
async fn delete_movie(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, AppError> {
    state.movies.delete(id).await?;
    tracing::info!(movie_id = id, "Movie deleted");
    Ok(StatusCode::NO_CONTENT)
}
