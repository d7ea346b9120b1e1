use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::validation::not_blank;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
}

/// Room reference embedded in showtime and reservation payloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRef {
    pub id: Uuid,
    pub name: String,
}

impl From<Room> for RoomRef {
    fn from(room: Room) -> Self {
        RoomRef { id: room.id, name: room.name }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RoomInput {
    #[validate(length(min = 1, max = 50), custom(function = "not_blank"))]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub id: Uuid,
    pub seat_number: i32,
    pub room: Uuid,
    pub is_available: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SeatInput {
    #[validate(range(min = 1, message = "seat_number must be positive"))]
    pub seat_number: i32,
    pub room: Uuid,
    #[serde(default = "available")]
    pub is_available: bool,
}

fn available() -> bool {
    true
}

/// Orders seats the way they are numbered in the room.
pub fn sort_by_number(seats: &mut [Seat]) {
    seats.sort_by_key(|seat| seat.seat_number);
}
