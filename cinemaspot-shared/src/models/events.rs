use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct ReservationCreatedEvent {
    pub showtime_id: Uuid,
    pub user_id: Uuid,
    pub seat_ids: Vec<Uuid>,
    pub is_full: bool,
    pub timestamp: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct ReservationCancelledEvent {
    pub showtime_id: Uuid,
    pub reservation_id: Uuid,
    pub seat_id: Uuid,
    pub timestamp: i64,
}

/// Everything pushed to showtime subscribers, tagged by `type`.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShowtimeEvent {
    ReservationCreated(ReservationCreatedEvent),
    ReservationCancelled(ReservationCancelledEvent),
}

impl ShowtimeEvent {
    pub fn showtime_id(&self) -> Uuid {
        match self {
            ShowtimeEvent::ReservationCreated(e) => e.showtime_id,
            ShowtimeEvent::ReservationCancelled(e) => e.showtime_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShowtimeEvent::ReservationCreated(_) => "reservation_created",
            ShowtimeEvent::ReservationCancelled(_) => "reservation_cancelled",
        }
    }
}
