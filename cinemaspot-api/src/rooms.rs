use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use cinemaspot_core::validation::validate;
use cinemaspot_core::venue::{Room, RoomInput};
use uuid::Uuid;

use crate::error::{ApiJson, ApiPath, AppError};
use crate::middleware::admin;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_rooms).merge(admin(post(create_room), state)))
        .route(
            "/{id}",
            get(get_room).merge(admin(put(update_room).delete(delete_room), state)),
        )
}

/// GET /api/rooms
async fn list_rooms(State(state): State<AppState>) -> Result<Json<Vec<Room>>, AppError> {
    Ok(Json(state.rooms.list().await?))
}

/// GET /api/rooms/{id}
async fn get_room(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Room>, AppError> {
    let room = state
        .rooms
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Room not found".into()))?;
    Ok(Json(room))
}

/// POST /api/rooms
async fn create_room(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RoomInput>,
) -> Result<(StatusCode, Json<Room>), AppError> {
    validate(&req)?;
    Ok((StatusCode::CREATED, Json(state.rooms.create(&req).await?)))
}

/// PUT /api/rooms/{id}
async fn update_room(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<RoomInput>,
) -> Result<Json<Room>, AppError> {
    validate(&req)?;
    Ok(Json(state.rooms.update(id, &req).await?))
}

/// DELETE /api/rooms/{id}
async fn delete_room(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.rooms.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
