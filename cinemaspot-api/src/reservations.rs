use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use cinemaspot_core::booking::{plan_reservation, NewReservation, ReservationDetail, ReservationReceipt};
use cinemaspot_core::validation::validate;
use cinemaspot_shared::models::events::{
    ReservationCancelledEvent, ReservationCreatedEvent, ShowtimeEvent,
};
use uuid::Uuid;

use crate::error::{ApiJson, ApiPath, AppError};
use crate::middleware::{admin, CurrentUser};
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", admin(get(list_reservations), state).merge(post(create_reservation)))
        .route("/user/{user_id}", get(list_user_reservations))
        .route("/{id}", get(get_reservation).delete(cancel_reservation))
}

/// Broadcasts to live showtime subscribers. Having none is not an error.
fn publish(state: &AppState, event: ShowtimeEvent) {
    if state.sse_tx.send(event).is_err() {
        tracing::trace!("No showtime subscribers");
    }
}

/// GET /api/reservations
async fn list_reservations(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReservationDetail>>, AppError> {
    Ok(Json(state.reservations.list().await?))
}

/// GET /api/reservations/user/{user_id}
async fn list_user_reservations(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<Json<Vec<ReservationDetail>>, AppError> {
    current.ensure_self_or_admin(user_id)?;
    Ok(Json(state.reservations.list_by_user(user_id).await?))
}

/// GET /api/reservations/{id}
async fn get_reservation(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ReservationDetail>, AppError> {
    let reservation = state
        .reservations
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Reservation not found".into()))?;
    current.ensure_self_or_admin(reservation.owner())?;
    Ok(Json(reservation))
}

/// POST /api/reservations
///
/// Books one or more seats of a showtime for the caller.
async fn create_reservation(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<NewReservation>,
) -> Result<(StatusCode, Json<ReservationReceipt>), AppError> {
    validate(&req)?;

    // 1. Load the showtime with its room seats and current bookings
    let context = state
        .reservations
        .booking_context(req.showtime_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Showtime not found".into()))?;

    // 2. Check availability and capacity
    let plan = plan_reservation(
        &context,
        user.id,
        &req,
        state.business_rules.default_showtime_capacity,
    )?;

    // 3. Persist; capacity is re-checked under lock
    let receipt = state.reservations.commit(&plan).await?;

    tracing::info!(
        showtime_id = %plan.showtime_id,
        user_id = %user.id,
        seats = plan.seat_ids.len(),
        is_full = receipt.is_full,
        "Reservation created"
    );

    publish(
        &state,
        ShowtimeEvent::ReservationCreated(ReservationCreatedEvent {
            showtime_id: plan.showtime_id,
            user_id: user.id,
            seat_ids: plan.seat_ids.clone(),
            is_full: receipt.is_full,
            timestamp: Utc::now().timestamp(),
        }),
    );

    Ok((StatusCode::CREATED, Json(receipt)))
}

/// DELETE /api/reservations/{id}
async fn cancel_reservation(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    let reservation = state
        .reservations
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Reservation not found".into()))?;
    current.ensure_self_or_admin(reservation.owner())?;

    let removed = state.reservations.delete(id).await?;
    tracing::info!(reservation_id = %id, showtime_id = %removed.showtime_id, "Reservation cancelled");

    publish(
        &state,
        ShowtimeEvent::ReservationCancelled(ReservationCancelledEvent {
            showtime_id: removed.showtime_id,
            reservation_id: removed.id,
            seat_id: removed.seat_id,
            timestamp: Utc::now().timestamp(),
        }),
    );

    Ok(StatusCode::NO_CONTENT)
}
