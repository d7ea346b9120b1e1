use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::validation::{failure, not_blank};
use crate::venue::RoomRef;

// ============================================================================
// Categories
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryInput {
    #[validate(length(min = 1, max = 100), custom(function = "not_blank"))]
    pub name: String,
}

// ============================================================================
// Movies
// ============================================================================

/// A movie as served to clients: category resolved to its name and the
/// showtimes embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub poster: String,
    pub category: Option<String>,
    pub duration: String,
    pub banner: String,
    pub synopsis: String,
    pub trailer: String,
    pub director: String,
    pub rating: String,
    pub review: f64,
    pub showtimes: Vec<MovieShowtime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieShowtime {
    pub id: Uuid,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub room: RoomRef,
    pub is_full: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MovieInput {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "poster is required"))]
    pub poster: String,
    #[validate(range(min = 1, message = "category is required"))]
    pub category: i32,
    #[validate(length(min = 1, message = "duration is required"))]
    pub duration: String,
    #[validate(length(min = 1, message = "banner is required"))]
    pub banner: String,
    #[validate(length(min = 1, message = "synopsis is required"))]
    pub synopsis: String,
    #[validate(length(min = 1, message = "trailer is required"))]
    pub trailer: String,
    #[validate(length(min = 1, message = "director is required"))]
    pub director: String,
    #[validate(length(min = 1, message = "rating is required"))]
    pub rating: String,
    #[validate(range(min = 0.0, max = 10.0, message = "review must be between 0 and 10"))]
    pub review: f64,
    #[serde(default)]
    #[validate(nested)]
    pub showtimes: Vec<MovieShowtimeInput>,
}

/// Showtime nested in a movie payload. On update only entries with an `id`
/// are applied.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "MovieShowtimeInput::check_window"))]
pub struct MovieShowtimeInput {
    pub id: Option<Uuid>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub room: Uuid,
    #[serde(default)]
    pub is_full: bool,
}

impl MovieShowtimeInput {
    fn check_window(&self) -> Result<(), ValidationError> {
        crate::screening::check_window(self.start_time, self.end_time)
    }
}

// ============================================================================
// Future releases
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureRelease {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub poster: String,
    pub category_id: Option<i32>,
    pub category: Option<String>,
    pub duration: String,
    pub banner: String,
    pub synopsis: String,
    pub trailer: String,
    pub director: String,
    pub rating: String,
    pub release_date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FutureReleaseInput {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "poster is required"))]
    pub poster: String,
    #[serde(alias = "categoryId")]
    #[validate(range(min = 1, message = "category is required"))]
    pub category: i32,
    #[validate(length(min = 1, message = "duration is required"))]
    pub duration: String,
    #[validate(length(min = 1, message = "banner is required"))]
    pub banner: String,
    #[validate(length(min = 1, message = "synopsis is required"))]
    pub synopsis: String,
    #[validate(length(min = 1, message = "trailer is required"))]
    pub trailer: String,
    #[validate(length(min = 1, message = "director is required"))]
    pub director: String,
    #[validate(length(min = 1, message = "rating is required"))]
    pub rating: String,
    pub release_date: NaiveDate,
}

// ============================================================================
// Actors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub nationality: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateActor {
    #[validate(
        length(min = 2, max = 50, message = "must be between 2 and 50 characters"),
        custom(function = "not_blank")
    )]
    pub first_name: String,
    #[validate(
        length(min = 2, max = 50, message = "must be between 2 and 50 characters"),
        custom(function = "not_blank")
    )]
    pub last_name: String,
    #[validate(range(min = 1, max = 120, message = "must be a number between 1 and 120"))]
    pub age: i32,
    #[validate(
        length(min = 2, max = 50, message = "must be between 2 and 50 characters"),
        custom(function = "not_blank")
    )]
    pub nationality: String,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[validate(schema(function = "UpdateActor::not_empty"))]
pub struct UpdateActor {
    #[validate(
        length(min = 2, max = 50, message = "must be between 2 and 50 characters"),
        custom(function = "not_blank")
    )]
    pub first_name: Option<String>,
    #[validate(
        length(min = 2, max = 50, message = "must be between 2 and 50 characters"),
        custom(function = "not_blank")
    )]
    pub last_name: Option<String>,
    #[validate(range(min = 1, max = 120, message = "must be a number between 1 and 120"))]
    pub age: Option<i32>,
    #[validate(
        length(min = 2, max = 50, message = "must be between 2 and 50 characters"),
        custom(function = "not_blank")
    )]
    pub nationality: Option<String>,
}

impl UpdateActor {
    fn not_empty(&self) -> Result<(), ValidationError> {
        if self.first_name.is_none()
            && self.last_name.is_none()
            && self.age.is_none()
            && self.nationality.is_none()
        {
            return Err(failure("empty", "nothing to update"));
        }
        Ok(())
    }

    pub fn apply(self, actor: Actor) -> Actor {
        Actor {
            id: actor.id,
            first_name: self.first_name.unwrap_or(actor.first_name),
            last_name: self.last_name.unwrap_or(actor.last_name),
            age: self.age.unwrap_or(actor.age),
            nationality: self.nationality.unwrap_or(actor.nationality),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ActorSearch {
    #[serde(alias = "term", default)]
    pub q: String,
}

// ============================================================================
// Movie cast
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieCast {
    pub movie: i32,
    pub actor: i32,
    pub movie_title: String,
    pub actor_first_name: String,
    pub actor_last_name: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct MovieCastInput {
    #[validate(range(min = 1))]
    pub movie: i32,
    #[validate(range(min = 1))]
    pub actor: i32,
}
