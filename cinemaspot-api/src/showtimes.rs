use std::convert::Infallible;

use axum::{
    extract::State,
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post, put},
    Json, Router,
};
use cinemaspot_core::screening::{CreateShowtime, NewShowtime, Showtime, ShowtimeView, UpdateShowtime};
use cinemaspot_core::validation::validate;
use futures_util::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use crate::error::{ApiJson, ApiPath, AppError};
use crate::middleware::admin;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", admin(get(list_showtimes).post(create_showtime), state))
        .route("/movie/{movie_id}", get(list_movie_showtimes))
        .route(
            "/{id}",
            get(get_showtime).merge(admin(put(update_showtime).delete(delete_showtime), state)),
        )
        .route("/{id}/stream", get(stream_showtime))
}

/// GET /api/showtimes
async fn list_showtimes(State(state): State<AppState>) -> Result<Json<Vec<ShowtimeView>>, AppError> {
    let showtimes = state.showtimes.list().await?;
    Ok(Json(showtimes.into_iter().map(ShowtimeView::from_listing).collect()))
}

/// GET /api/showtimes/{id}
async fn get_showtime(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ShowtimeView>, AppError> {
    let listing = state
        .showtimes
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Showtime not found".into()))?;
    Ok(Json(ShowtimeView::from_listing(listing)))
}

/// GET /api/showtimes/movie/{movie_id}
async fn list_movie_showtimes(
    State(state): State<AppState>,
    ApiPath(movie_id): ApiPath<i32>,
) -> Result<Json<Vec<ShowtimeView>>, AppError> {
    let showtimes = state.showtimes.list_by_movie(movie_id).await?;
    Ok(Json(showtimes.into_iter().map(ShowtimeView::without_movie).collect()))
}

/// POST /api/showtimes
async fn create_showtime(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateShowtime>,
) -> Result<(StatusCode, Json<Showtime>), AppError> {
    validate(&req)?;

    let movie = state
        .movies
        .find_by_title(req.movie.trim())
        .await?
        .ok_or_else(|| AppError::NotFoundError("Movie not found".into()))?;
    let room = state
        .rooms
        .find_by_name(req.room.trim())
        .await?
        .ok_or_else(|| AppError::NotFoundError("Room not found".into()))?;

    let showtime = state
        .showtimes
        .create(&NewShowtime {
            movie,
            room: room.id,
            start_time: req.start_time,
            end_time: req.end_time,
            is_full: false,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(showtime)))
}

/// PUT /api/showtimes/{id}
async fn update_showtime(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateShowtime>,
) -> Result<Json<Showtime>, AppError> {
    let current = state
        .showtimes
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Showtime not found".into()))?;

    if let Some(room) = req.room {
        if state.rooms.find(room).await?.is_none() {
            return Err(AppError::NotFoundError("Room not found".into()));
        }
    }

    let updated = req.apply(current.showtime)?;
    Ok(Json(state.showtimes.update(&updated).await?))
}

/// DELETE /api/showtimes/{id}
async fn delete_showtime(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.showtimes.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/showtimes/{id}/stream
///
/// Server-sent reservation activity for one showtime.
async fn stream_showtime(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    if state.showtimes.find(id).await?.is_none() {
        return Err(AppError::NotFoundError("Showtime not found".into()));
    }

    let rx = state.sse_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(event) if event.showtime_id() == id => Event::default()
                .event(event.name())
                .json_data(&event)
                .ok()
                .map(Ok),
            // Lagged receivers skip what they missed
            _ => None,
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
