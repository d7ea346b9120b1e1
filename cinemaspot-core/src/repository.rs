use async_trait::async_trait;
use uuid::Uuid;

use crate::booking::{BookingContext, Reservation, ReservationDetail, ReservationPlan, ReservationReceipt};
use crate::catalog::{
    Actor, Category, CategoryInput, CreateActor, FutureRelease, FutureReleaseInput, MovieCast,
    MovieCastInput, MovieDetail, MovieInput,
};
use crate::identity::{NewUser, Role, RoleInput, User, UserRecord};
use crate::screening::{NewShowtime, Showtime, ShowtimeListing};
use crate::venue::{Room, RoomInput, Seat, SeatInput};
use crate::CoreResult;

// Conventions shared by every repository:
// - `find*` returns `Ok(None)` for a missing row.
// - `update*` and `delete*` return `CoreError::NotFound` for a missing row.
// - unique constraint violations surface as `CoreError::Conflict`.

/// Repository trait for users and their credentials
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list(&self) -> CoreResult<Vec<User>>;

    async fn find(&self, id: Uuid) -> CoreResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<UserRecord>>;

    /// Fails with `NotFound` when `user.role` names no role.
    async fn create(&self, user: &NewUser) -> CoreResult<User>;

    /// Writes names, email and the validated flag.
    async fn update(&self, user: &User) -> CoreResult<User>;

    async fn mark_email_validated(&self, email: &str) -> CoreResult<()>;

    async fn update_password(&self, email: &str, password_hash: &str) -> CoreResult<()>;

    async fn assign_role(&self, user_id: Uuid, role_id: i32) -> CoreResult<User>;

    async fn delete(&self, id: Uuid) -> CoreResult<()>;
}

/// Repository trait for roles
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn list(&self) -> CoreResult<Vec<Role>>;

    async fn find(&self, id: i32) -> CoreResult<Option<Role>>;

    async fn find_by_name(&self, name: &str) -> CoreResult<Option<Role>>;

    async fn create(&self, role: &RoleInput) -> CoreResult<Role>;

    async fn update(&self, id: i32, role: &RoleInput) -> CoreResult<Role>;

    async fn delete(&self, id: i32) -> CoreResult<()>;
}

/// Repository trait for movie categories
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn list(&self) -> CoreResult<Vec<Category>>;

    async fn find(&self, id: i32) -> CoreResult<Option<Category>>;

    async fn create(&self, category: &CategoryInput) -> CoreResult<Category>;

    async fn update(&self, id: i32, category: &CategoryInput) -> CoreResult<Category>;

    async fn delete(&self, id: i32) -> CoreResult<()>;
}

/// Repository trait for screening rooms
#[async_trait]
pub trait RoomRepository: Send + Sync {
    async fn list(&self) -> CoreResult<Vec<Room>>;

    async fn find(&self, id: Uuid) -> CoreResult<Option<Room>>;

    async fn find_by_name(&self, name: &str) -> CoreResult<Option<Room>>;

    async fn create(&self, room: &RoomInput) -> CoreResult<Room>;

    async fn update(&self, id: Uuid, room: &RoomInput) -> CoreResult<Room>;

    async fn delete(&self, id: Uuid) -> CoreResult<()>;
}

/// Repository trait for seats. Lists are ordered by seat number.
#[async_trait]
pub trait SeatRepository: Send + Sync {
    async fn list(&self) -> CoreResult<Vec<Seat>>;

    async fn find(&self, id: Uuid) -> CoreResult<Option<Seat>>;

    async fn list_by_room_name(&self, room: &str) -> CoreResult<Vec<Seat>>;

    async fn create(&self, seat: &SeatInput) -> CoreResult<Seat>;

    async fn update(&self, id: Uuid, seat: &SeatInput) -> CoreResult<Seat>;

    async fn delete(&self, id: Uuid) -> CoreResult<()>;
}

/// Repository trait for movies with their showtimes
#[async_trait]
pub trait MovieRepository: Send + Sync {
    async fn list(&self) -> CoreResult<Vec<MovieDetail>>;

    async fn find(&self, id: i32) -> CoreResult<Option<MovieDetail>>;

    /// Id of the movie with exactly this title.
    async fn find_by_title(&self, title: &str) -> CoreResult<Option<i32>>;

    /// Inserts the movie and its nested showtimes atomically.
    async fn create(&self, movie: &MovieInput) -> CoreResult<MovieDetail>;

    /// Updates the movie and every nested showtime carrying an id.
    async fn update(&self, id: i32, movie: &MovieInput) -> CoreResult<MovieDetail>;

    async fn delete(&self, id: i32) -> CoreResult<()>;
}

/// Repository trait for showtimes
#[async_trait]
pub trait ShowtimeRepository: Send + Sync {
    async fn list(&self) -> CoreResult<Vec<ShowtimeListing>>;

    async fn find(&self, id: Uuid) -> CoreResult<Option<ShowtimeListing>>;

    async fn list_by_movie(&self, movie_id: i32) -> CoreResult<Vec<ShowtimeListing>>;

    async fn create(&self, showtime: &NewShowtime) -> CoreResult<Showtime>;

    async fn update(&self, showtime: &Showtime) -> CoreResult<Showtime>;

    async fn delete(&self, id: Uuid) -> CoreResult<()>;
}

/// Repository trait for reservations
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    async fn list(&self) -> CoreResult<Vec<ReservationDetail>>;

    async fn find(&self, id: Uuid) -> CoreResult<Option<ReservationDetail>>;

    async fn list_by_user(&self, user_id: Uuid) -> CoreResult<Vec<ReservationDetail>>;

    /// Showtime, room seats and taken seats; `None` if the showtime is missing.
    async fn booking_context(&self, showtime_id: Uuid) -> CoreResult<Option<BookingContext>>;

    /// Inserts one row per planned seat and sets the showtime's `is_full`
    /// flag once capacity is reached, in one transaction. Capacity is
    /// re-checked under a lock on the showtime row.
    async fn commit(&self, plan: &ReservationPlan) -> CoreResult<ReservationReceipt>;

    /// Removes the reservation and clears the showtime's `is_full` flag.
    async fn delete(&self, id: Uuid) -> CoreResult<Reservation>;
}

/// Repository trait for actors
#[async_trait]
pub trait ActorRepository: Send + Sync {
    async fn list(&self) -> CoreResult<Vec<Actor>>;

    /// Case-insensitive match on first or last name, ordered by first name.
    async fn search(&self, term: &str) -> CoreResult<Vec<Actor>>;

    async fn find(&self, id: i32) -> CoreResult<Option<Actor>>;

    async fn create(&self, actor: &CreateActor) -> CoreResult<Actor>;

    async fn update(&self, actor: &Actor) -> CoreResult<Actor>;

    /// Whether the actor appears in any movie cast.
    async fn is_cast(&self, id: i32) -> CoreResult<bool>;

    async fn delete(&self, id: i32) -> CoreResult<()>;
}

/// Repository trait for announced movies
#[async_trait]
pub trait FutureReleaseRepository: Send + Sync {
    async fn list(&self) -> CoreResult<Vec<FutureRelease>>;

    async fn find(&self, id: i32) -> CoreResult<Option<FutureRelease>>;

    async fn create(&self, release: &FutureReleaseInput) -> CoreResult<FutureRelease>;

    async fn update(&self, id: i32, release: &FutureReleaseInput) -> CoreResult<FutureRelease>;

    async fn delete(&self, id: i32) -> CoreResult<()>;
}

/// Repository trait for movie/actor links
#[async_trait]
pub trait MovieCastRepository: Send + Sync {
    async fn list(&self) -> CoreResult<Vec<MovieCast>>;

    async fn list_by_movie(&self, movie_id: i32) -> CoreResult<Vec<MovieCast>>;

    async fn find(&self, movie_id: i32, actor_id: i32) -> CoreResult<Option<MovieCast>>;

    async fn create(&self, link: &MovieCastInput) -> CoreResult<MovieCast>;

    async fn delete(&self, movie_id: i32, actor_id: i32) -> CoreResult<()>;
}
