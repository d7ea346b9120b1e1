use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::screening::Showtime;
use crate::validation::failure;
use crate::venue::{RoomRef, Seat};
use crate::{CoreError, CoreResult};

/// One reserved seat for one showtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub showtime_id: Uuid,
    pub seat_id: Uuid,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Read side
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationDetail {
    pub id_reservation: Uuid,
    pub user_data: ReservationUser,
    pub showtime_data: ReservationShowtime,
    pub seat_data: ReservationSeat,
}

impl ReservationDetail {
    pub fn owner(&self) -> Uuid {
        self.user_data.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationShowtime {
    pub id: Uuid,
    pub movie: MovieSummary,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub room: RoomRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub poster: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationSeat {
    pub id: Uuid,
    pub seat_number: i32,
    pub room: RoomRef,
}

// ============================================================================
// Write side
// ============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewReservation {
    pub showtime_id: Uuid,
    #[validate(custom(function = "distinct_seats"))]
    pub seat_ids: Vec<Uuid>,
}

fn distinct_seats(seat_ids: &[Uuid]) -> Result<(), ValidationError> {
    if seat_ids.is_empty() {
        return Err(failure("seats", "at least one seat is required"));
    }
    let unique: HashSet<&Uuid> = seat_ids.iter().collect();
    if unique.len() != seat_ids.len() {
        return Err(failure("seats", "seat ids must be unique"));
    }
    Ok(())
}

/// Everything needed to decide whether a reservation request fits.
#[derive(Debug, Clone)]
pub struct BookingContext {
    pub showtime: Showtime,
    pub room_seats: Vec<Seat>,
    /// Seats already reserved for this showtime.
    pub reserved_seats: Vec<Uuid>,
}

/// Checked reservation request, ready to be committed.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationPlan {
    pub showtime_id: Uuid,
    pub user_id: Uuid,
    pub seat_ids: Vec<Uuid>,
    pub capacity: i64,
    pub fills_showtime: bool,
}

/// Result of a committed reservation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationReceipt {
    pub reservation_ids: Vec<Uuid>,
    pub is_full: bool,
}

/// Capacity is the number of bookable seats in the room; rooms without any
/// seats fall back to `default_capacity`.
pub fn capacity_for(room_seats: &[Seat], default_capacity: i64) -> i64 {
    if room_seats.is_empty() {
        default_capacity
    } else {
        room_seats.iter().filter(|seat| seat.is_available).count() as i64
    }
}

pub fn plan_reservation(
    context: &BookingContext,
    user_id: Uuid,
    request: &NewReservation,
    default_capacity: i64,
) -> CoreResult<ReservationPlan> {
    // 1. Full showtimes take no more bookings
    if context.showtime.is_full {
        return Err(CoreError::Forbidden("Showtime is already full".into()));
    }

    // 2. Every seat must sit in the showtime's room and still be free
    let reserved: HashSet<&Uuid> = context.reserved_seats.iter().collect();
    for seat_id in &request.seat_ids {
        let seat = context
            .room_seats
            .iter()
            .find(|s| &s.id == seat_id)
            .ok_or_else(|| {
                CoreError::Validation(format!("Seat {} is not in the showtime's room", seat_id))
            })?;
        if !seat.is_available {
            return Err(CoreError::Validation(format!("Seat {} is not available", seat_id)));
        }
    }
    if let Some(taken) = request.seat_ids.iter().find(|id| reserved.contains(id)) {
        return Err(CoreError::Conflict(format!("Seat {} is already reserved", taken)));
    }

    // 3. Capacity
    let capacity = capacity_for(&context.room_seats, default_capacity);
    let booked = context.reserved_seats.len() as i64;
    let requested = request.seat_ids.len() as i64;
    if booked + requested > capacity {
        return Err(CoreError::Conflict(format!(
            "Not enough seats available: {} left",
            (capacity - booked).max(0)
        )));
    }

    Ok(ReservationPlan {
        showtime_id: context.showtime.id,
        user_id,
        seat_ids: request.seat_ids.clone(),
        capacity,
        fills_showtime: booked + requested >= capacity,
    })
}
