use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::validation::{failure, not_blank};
use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Showtime {
    pub id: Uuid,
    pub movie: i32,
    pub room: Uuid,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub is_full: bool,
}

/// Showtime joined with its movie title and room name.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowtimeListing {
    pub showtime: Showtime,
    pub movie_title: String,
    pub room_name: String,
}

/// Wire shape for showtime listings: names instead of ids, clock times only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShowtimeView {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movie: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub room: String,
    pub is_full: bool,
}

impl ShowtimeView {
    pub fn from_listing(listing: ShowtimeListing) -> Self {
        ShowtimeView {
            id: listing.showtime.id,
            movie: Some(listing.movie_title),
            start_time: clock_time(listing.showtime.start_time),
            end_time: clock_time(listing.showtime.end_time),
            room: listing.room_name,
            is_full: listing.showtime.is_full,
        }
    }

    /// Per-movie listings omit the movie title.
    pub fn without_movie(listing: ShowtimeListing) -> Self {
        ShowtimeView { movie: None, ..Self::from_listing(listing) }
    }
}

pub fn clock_time(at: NaiveDateTime) -> String {
    at.format("%H:%M:%S").to_string()
}

pub(crate) fn check_window(start: NaiveDateTime, end: NaiveDateTime) -> Result<(), ValidationError> {
    if end <= start {
        return Err(failure("window", "end_time must be after start_time"));
    }
    Ok(())
}

/// Create payload; movie and room are referenced by title and name.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "CreateShowtime::check_window"))]
pub struct CreateShowtime {
    #[validate(custom(function = "not_blank"))]
    pub movie: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[validate(custom(function = "not_blank"))]
    pub room: String,
}

impl CreateShowtime {
    fn check_window(&self) -> Result<(), ValidationError> {
        check_window(self.start_time, self.end_time)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateShowtime {
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
    pub room: Option<Uuid>,
    pub is_full: Option<bool>,
}

impl UpdateShowtime {
    /// Merges the update into the stored showtime, re-checking the time window.
    pub fn apply(self, current: Showtime) -> CoreResult<Showtime> {
        let updated = Showtime {
            id: current.id,
            movie: current.movie,
            room: self.room.unwrap_or(current.room),
            start_time: self.start_time.unwrap_or(current.start_time),
            end_time: self.end_time.unwrap_or(current.end_time),
            is_full: self.is_full.unwrap_or(current.is_full),
        };
        check_window(updated.start_time, updated.end_time)
            .map_err(|_| CoreError::Validation("end_time must be after start_time".into()))?;
        Ok(updated)
    }
}

/// Fields written when a showtime row is inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShowtime {
    pub movie: i32,
    pub room: Uuid,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub is_full: bool,
}
