use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use cinemaspot_core::validation::validate;
use cinemaspot_core::venue::{sort_by_number, Seat, SeatInput};
use uuid::Uuid;

use crate::error::{ApiJson, ApiPath, AppError};
use crate::middleware::admin;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_seats).merge(admin(post(create_seat), state)))
        .route("/room/{name}", get(list_room_seats))
        .route(
            "/{id}",
            get(get_seat).merge(admin(put(update_seat).delete(delete_seat), state)),
        )
}

/// GET /api/seats
async fn list_seats(State(state): State<AppState>) -> Result<Json<Vec<Seat>>, AppError> {
    let mut seats = state.seats.list().await?;
    sort_by_number(&mut seats);
    Ok(Json(seats))
}

/// GET /api/seats/room/{name}
async fn list_room_seats(
    State(state): State<AppState>,
    ApiPath(name): ApiPath<String>,
) -> Result<Json<Vec<Seat>>, AppError> {
    if state.rooms.find_by_name(&name).await?.is_none() {
        return Err(AppError::NotFoundError("Room not found".into()));
    }
    let mut seats = state.seats.list_by_room_name(&name).await?;
    sort_by_number(&mut seats);
    Ok(Json(seats))
}

/// GET /api/seats/{id}
async fn get_seat(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Seat>, AppError> {
    let seat = state
        .seats
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Seat not found".into()))?;
    Ok(Json(seat))
}

/// POST /api/seats
async fn create_seat(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SeatInput>,
) -> Result<(StatusCode, Json<Seat>), AppError> {
    validate(&req)?;
    if state.rooms.find(req.room).await?.is_none() {
        return Err(AppError::NotFoundError("Room not found".into()));
    }
    Ok((StatusCode::CREATED, Json(state.seats.create(&req).await?)))
}

/// PUT /api/seats/{id}
async fn update_seat(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<SeatInput>,
) -> Result<Json<Seat>, AppError> {
    validate(&req)?;
    if state.rooms.find(req.room).await?.is_none() {
        return Err(AppError::NotFoundError("Room not found".into()));
    }
    Ok(Json(state.seats.update(id, &req).await?))
}

/// DELETE /api/seats/{id}
async fn delete_seat(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.seats.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
