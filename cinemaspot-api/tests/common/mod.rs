#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use cinemaspot_api::{app, middleware::auth::issue_session_token, state::AuthConfig, AppState};
use cinemaspot_core::booking::{
    BookingContext, MovieSummary, Reservation, ReservationDetail, ReservationPlan,
    ReservationReceipt, ReservationSeat, ReservationShowtime, ReservationUser,
};
use cinemaspot_core::catalog::{
    Actor, Category, CategoryInput, CreateActor, FutureRelease, FutureReleaseInput, MovieCast,
    MovieCastInput, MovieDetail, MovieInput, MovieShowtime,
};
use cinemaspot_core::email::{EmailMessage, EmailSender};
use cinemaspot_core::identity::{NewUser, Role, RoleInput, User, UserRecord, ADMIN_ROLE, USER_ROLE};
use cinemaspot_core::password::hash_password_with_cost;
use cinemaspot_core::repository::{
    ActorRepository, CategoryRepository, FutureReleaseRepository, MovieCastRepository,
    MovieRepository, ReservationRepository, RoleRepository, RoomRepository, SeatRepository,
    ShowtimeRepository, UserRepository,
};
use cinemaspot_core::screening::{NewShowtime, Showtime, ShowtimeListing};
use cinemaspot_core::venue::{Room, RoomInput, RoomRef, Seat, SeatInput};
use cinemaspot_core::{CoreError, CoreResult};
use cinemaspot_shared::Masked;
use cinemaspot_store::app_config::BusinessRules;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::sync::broadcast;
use tower::ServiceExt;
use uuid::Uuid;

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Clone)]
struct MovieRow {
    id: i32,
    input: MovieInput,
}

#[derive(Default)]
struct Tables {
    next_id: i32,
    roles: Vec<Role>,
    users: Vec<(User, String)>,
    categories: Vec<Category>,
    rooms: Vec<Room>,
    seats: Vec<Seat>,
    movies: Vec<MovieRow>,
    showtimes: Vec<Showtime>,
    reservations: Vec<Reservation>,
    actors: Vec<Actor>,
    releases: Vec<(i32, FutureReleaseInput)>,
    cast: Vec<(i32, i32)>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    fn room_ref(&self, id: Uuid) -> RoomRef {
        self.rooms
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .map(RoomRef::from)
            .unwrap_or(RoomRef { id, name: String::new() })
    }

    fn category_name(&self, id: i32) -> Option<String> {
        self.categories.iter().find(|c| c.id == id).map(|c| c.name.clone())
    }

    fn movie_detail(&self, row: &MovieRow) -> MovieDetail {
        let input = &row.input;
        MovieDetail {
            id: row.id,
            title: input.title.clone(),
            description: input.description.clone(),
            poster: input.poster.clone(),
            category: self.category_name(input.category),
            duration: input.duration.clone(),
            banner: input.banner.clone(),
            synopsis: input.synopsis.clone(),
            trailer: input.trailer.clone(),
            director: input.director.clone(),
            rating: input.rating.clone(),
            review: input.review,
            showtimes: self
                .showtimes
                .iter()
                .filter(|s| s.movie == row.id)
                .map(|s| MovieShowtime {
                    id: s.id,
                    start_time: s.start_time,
                    end_time: s.end_time,
                    room: self.room_ref(s.room),
                    is_full: s.is_full,
                })
                .collect(),
        }
    }

    fn listing(&self, showtime: &Showtime) -> ShowtimeListing {
        ShowtimeListing {
            showtime: showtime.clone(),
            movie_title: self
                .movies
                .iter()
                .find(|m| m.id == showtime.movie)
                .map(|m| m.input.title.clone())
                .unwrap_or_default(),
            room_name: self.room_ref(showtime.room).name,
        }
    }

    fn detail(&self, reservation: &Reservation) -> Option<ReservationDetail> {
        let user = &self.users.iter().find(|(u, _)| u.id == reservation.user_id)?.0;
        let showtime = self.showtimes.iter().find(|s| s.id == reservation.showtime_id)?;
        let movie = self.movies.iter().find(|m| m.id == showtime.movie)?;
        let seat = self.seats.iter().find(|s| s.id == reservation.seat_id)?;
        Some(ReservationDetail {
            id_reservation: reservation.id,
            user_data: ReservationUser {
                id: user.id,
                first_name: user.first_name.clone(),
                last_name: user.last_name.clone(),
                email: user.email.clone(),
            },
            showtime_data: ReservationShowtime {
                id: showtime.id,
                movie: MovieSummary {
                    id: movie.id,
                    title: movie.input.title.clone(),
                    description: movie.input.description.clone(),
                    poster: movie.input.poster.clone(),
                },
                start_time: showtime.start_time,
                end_time: showtime.end_time,
                room: self.room_ref(showtime.room),
            },
            seat_data: ReservationSeat {
                id: seat.id,
                seat_number: seat.seat_number,
                room: self.room_ref(seat.room),
            },
        })
    }

    fn cast_entry(&self, movie: i32, actor: i32) -> Option<MovieCast> {
        let title = &self.movies.iter().find(|m| m.id == movie)?.input.title;
        let actor_row = self.actors.iter().find(|a| a.id == actor)?;
        Some(MovieCast {
            movie,
            actor,
            movie_title: title.clone(),
            actor_first_name: actor_row.first_name.clone(),
            actor_last_name: actor_row.last_name.clone(),
        })
    }

    fn release(&self, id: i32, input: &FutureReleaseInput) -> FutureRelease {
        FutureRelease {
            id,
            title: input.title.clone(),
            description: input.description.clone(),
            poster: input.poster.clone(),
            category_id: Some(input.category),
            category: self.category_name(input.category),
            duration: input.duration.clone(),
            banner: input.banner.clone(),
            synopsis: input.synopsis.clone(),
            trailer: input.trailer.clone(),
            director: input.director.clone(),
            rating: input.rating.clone(),
            release_date: input.release_date,
        }
    }
}

/// Backs every repository trait with one locked set of tables, following the
/// same not-found and conflict conventions as the Postgres store.
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        let tables = Tables {
            next_id: 2,
            roles: vec![
                Role { id: 1, name: ADMIN_ROLE.into(), description: Some("Administrator".into()) },
                Role { id: 2, name: USER_ROLE.into(), description: Some("Customer".into()) },
            ],
            ..Tables::default()
        };
        Self { tables: Mutex::new(tables) }
    }
}

impl MemoryStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    pub fn showtime(&self, id: Uuid) -> Option<Showtime> {
        self.lock().showtimes.iter().find(|s| s.id == id).cloned()
    }

    pub fn reservation_count(&self, showtime_id: Uuid) -> usize {
        self.lock().reservations.iter().filter(|r| r.showtime_id == showtime_id).count()
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        self.lock().users.iter().find(|(u, _)| u.email == email).map(|(u, _)| u.clone())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn list(&self) -> CoreResult<Vec<User>> {
        Ok(self.lock().users.iter().map(|(u, _)| u.clone()).collect())
    }

    async fn find(&self, id: Uuid) -> CoreResult<Option<User>> {
        Ok(self.lock().users.iter().find(|(u, _)| u.id == id).map(|(u, _)| u.clone()))
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<UserRecord>> {
        Ok(self.lock().users.iter().find(|(u, _)| u.email == email).map(|(u, hash)| UserRecord {
            user: u.clone(),
            password_hash: Masked(hash.clone()),
        }))
    }

    async fn create(&self, user: &NewUser) -> CoreResult<User> {
        let mut tables = self.lock();
        if !tables.roles.iter().any(|r| r.name == user.role) {
            return Err(CoreError::not_found("Role"));
        }
        if tables.users.iter().any(|(u, _)| u.email == user.email) {
            return Err(CoreError::Conflict("User already exists".into()));
        }
        let now = Utc::now();
        let created = User {
            id: Uuid::new_v4(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.role.clone(),
            email_validated: user.email_validated,
            created_at: now,
            updated_at: now,
        };
        tables.users.push((created.clone(), user.password_hash.clone()));
        Ok(created)
    }

    async fn update(&self, user: &User) -> CoreResult<User> {
        let mut tables = self.lock();
        if tables.users.iter().any(|(u, _)| u.email == user.email && u.id != user.id) {
            return Err(CoreError::Conflict("User already exists".into()));
        }
        let (stored, _) = tables
            .users
            .iter_mut()
            .find(|(u, _)| u.id == user.id)
            .ok_or_else(|| CoreError::not_found("User"))?;
        stored.first_name = user.first_name.clone();
        stored.last_name = user.last_name.clone();
        stored.email = user.email.clone();
        stored.email_validated = user.email_validated;
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }

    async fn mark_email_validated(&self, email: &str) -> CoreResult<()> {
        let mut tables = self.lock();
        let (stored, _) = tables
            .users
            .iter_mut()
            .find(|(u, _)| u.email == email)
            .ok_or_else(|| CoreError::not_found("User"))?;
        stored.email_validated = true;
        Ok(())
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> CoreResult<()> {
        let mut tables = self.lock();
        let (_, hash) = tables
            .users
            .iter_mut()
            .find(|(u, _)| u.email == email)
            .ok_or_else(|| CoreError::not_found("User"))?;
        *hash = password_hash.to_string();
        Ok(())
    }

    async fn assign_role(&self, user_id: Uuid, role_id: i32) -> CoreResult<User> {
        let mut tables = self.lock();
        let role = tables
            .roles
            .iter()
            .find(|r| r.id == role_id)
            .map(|r| r.name.clone())
            .ok_or_else(|| CoreError::not_found("Role"))?;
        let (stored, _) = tables
            .users
            .iter_mut()
            .find(|(u, _)| u.id == user_id)
            .ok_or_else(|| CoreError::not_found("User"))?;
        stored.role = role;
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> CoreResult<()> {
        let mut tables = self.lock();
        let before = tables.users.len();
        tables.users.retain(|(u, _)| u.id != id);
        if tables.users.len() == before {
            return Err(CoreError::not_found("User"));
        }
        tables.reservations.retain(|r| r.user_id != id);
        Ok(())
    }
}

#[async_trait]
impl RoleRepository for MemoryStore {
    async fn list(&self) -> CoreResult<Vec<Role>> {
        Ok(self.lock().roles.clone())
    }

    async fn find(&self, id: i32) -> CoreResult<Option<Role>> {
        Ok(self.lock().roles.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> CoreResult<Option<Role>> {
        let name = name.trim().to_uppercase();
        Ok(self.lock().roles.iter().find(|r| r.name == name).cloned())
    }

    async fn create(&self, role: &RoleInput) -> CoreResult<Role> {
        let mut tables = self.lock();
        let name = role.normalized_name();
        if tables.roles.iter().any(|r| r.name == name) {
            return Err(CoreError::Conflict("Role already exists".into()));
        }
        let created = Role { id: tables.next_id(), name, description: role.description.clone() };
        tables.roles.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: i32, role: &RoleInput) -> CoreResult<Role> {
        let mut tables = self.lock();
        let stored = tables
            .roles
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| CoreError::not_found("Role"))?;
        stored.name = role.normalized_name();
        stored.description = role.description.clone();
        Ok(stored.clone())
    }

    async fn delete(&self, id: i32) -> CoreResult<()> {
        let mut tables = self.lock();
        let before = tables.roles.len();
        tables.roles.retain(|r| r.id != id);
        if tables.roles.len() == before {
            return Err(CoreError::not_found("Role"));
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryRepository for MemoryStore {
    async fn list(&self) -> CoreResult<Vec<Category>> {
        Ok(self.lock().categories.clone())
    }

    async fn find(&self, id: i32) -> CoreResult<Option<Category>> {
        Ok(self.lock().categories.iter().find(|c| c.id == id).cloned())
    }

    async fn create(&self, category: &CategoryInput) -> CoreResult<Category> {
        let mut tables = self.lock();
        if tables.categories.iter().any(|c| c.name == category.name) {
            return Err(CoreError::Conflict("Category already exists".into()));
        }
        let created = Category { id: tables.next_id(), name: category.name.clone() };
        tables.categories.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: i32, category: &CategoryInput) -> CoreResult<Category> {
        let mut tables = self.lock();
        let stored = tables
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CoreError::not_found("Category"))?;
        stored.name = category.name.clone();
        Ok(stored.clone())
    }

    async fn delete(&self, id: i32) -> CoreResult<()> {
        let mut tables = self.lock();
        let before = tables.categories.len();
        tables.categories.retain(|c| c.id != id);
        if tables.categories.len() == before {
            return Err(CoreError::not_found("Category"));
        }
        Ok(())
    }
}

#[async_trait]
impl RoomRepository for MemoryStore {
    async fn list(&self) -> CoreResult<Vec<Room>> {
        Ok(self.lock().rooms.clone())
    }

    async fn find(&self, id: Uuid) -> CoreResult<Option<Room>> {
        Ok(self.lock().rooms.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> CoreResult<Option<Room>> {
        Ok(self.lock().rooms.iter().find(|r| r.name == name).cloned())
    }

    async fn create(&self, room: &RoomInput) -> CoreResult<Room> {
        let mut tables = self.lock();
        if tables.rooms.iter().any(|r| r.name == room.name) {
            return Err(CoreError::Conflict("Room already exists".into()));
        }
        let created = Room { id: Uuid::new_v4(), name: room.name.clone() };
        tables.rooms.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, room: &RoomInput) -> CoreResult<Room> {
        let mut tables = self.lock();
        let stored = tables
            .rooms
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| CoreError::not_found("Room"))?;
        stored.name = room.name.clone();
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> CoreResult<()> {
        let mut tables = self.lock();
        let before = tables.rooms.len();
        tables.rooms.retain(|r| r.id != id);
        if tables.rooms.len() == before {
            return Err(CoreError::not_found("Room"));
        }
        tables.seats.retain(|s| s.room != id);
        Ok(())
    }
}

#[async_trait]
impl SeatRepository for MemoryStore {
    async fn list(&self) -> CoreResult<Vec<Seat>> {
        Ok(self.lock().seats.clone())
    }

    async fn find(&self, id: Uuid) -> CoreResult<Option<Seat>> {
        Ok(self.lock().seats.iter().find(|s| s.id == id).cloned())
    }

    async fn list_by_room_name(&self, room: &str) -> CoreResult<Vec<Seat>> {
        let tables = self.lock();
        let Some(room) = tables.rooms.iter().find(|r| r.name == room) else {
            return Ok(Vec::new());
        };
        Ok(tables.seats.iter().filter(|s| s.room == room.id).cloned().collect())
    }

    async fn create(&self, seat: &SeatInput) -> CoreResult<Seat> {
        let mut tables = self.lock();
        if tables.seats.iter().any(|s| s.room == seat.room && s.seat_number == seat.seat_number) {
            return Err(CoreError::Conflict("Seat already exists".into()));
        }
        let created = Seat {
            id: Uuid::new_v4(),
            seat_number: seat.seat_number,
            room: seat.room,
            is_available: seat.is_available,
        };
        tables.seats.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, seat: &SeatInput) -> CoreResult<Seat> {
        let mut tables = self.lock();
        let stored = tables
            .seats
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| CoreError::not_found("Seat"))?;
        stored.seat_number = seat.seat_number;
        stored.room = seat.room;
        stored.is_available = seat.is_available;
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> CoreResult<()> {
        let mut tables = self.lock();
        let before = tables.seats.len();
        tables.seats.retain(|s| s.id != id);
        if tables.seats.len() == before {
            return Err(CoreError::not_found("Seat"));
        }
        Ok(())
    }
}

#[async_trait]
impl MovieRepository for MemoryStore {
    async fn list(&self) -> CoreResult<Vec<MovieDetail>> {
        let tables = self.lock();
        Ok(tables.movies.iter().map(|m| tables.movie_detail(m)).collect())
    }

    async fn find(&self, id: i32) -> CoreResult<Option<MovieDetail>> {
        let tables = self.lock();
        Ok(tables.movies.iter().find(|m| m.id == id).map(|m| tables.movie_detail(m)))
    }

    async fn find_by_title(&self, title: &str) -> CoreResult<Option<i32>> {
        Ok(self.lock().movies.iter().find(|m| m.input.title == title).map(|m| m.id))
    }

    async fn create(&self, movie: &MovieInput) -> CoreResult<MovieDetail> {
        let mut tables = self.lock();
        let row = MovieRow { id: tables.next_id(), input: movie.clone() };
        for showtime in &movie.showtimes {
            tables.showtimes.push(Showtime {
                id: Uuid::new_v4(),
                movie: row.id,
                room: showtime.room,
                start_time: showtime.start_time,
                end_time: showtime.end_time,
                is_full: showtime.is_full,
            });
        }
        tables.movies.push(row.clone());
        Ok(tables.movie_detail(&row))
    }

    async fn update(&self, id: i32, movie: &MovieInput) -> CoreResult<MovieDetail> {
        let mut tables = self.lock();
        let row = tables
            .movies
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| CoreError::not_found("Movie"))?;
        row.input = movie.clone();
        let row = row.clone();

        for nested in movie.showtimes.iter().filter(|s| s.id.is_some()) {
            if let Some(stored) = tables
                .showtimes
                .iter_mut()
                .find(|s| Some(s.id) == nested.id && s.movie == id)
            {
                stored.room = nested.room;
                stored.start_time = nested.start_time;
                stored.end_time = nested.end_time;
                stored.is_full = nested.is_full;
            }
        }
        Ok(tables.movie_detail(&row))
    }

    async fn delete(&self, id: i32) -> CoreResult<()> {
        let mut tables = self.lock();
        let before = tables.movies.len();
        tables.movies.retain(|m| m.id != id);
        if tables.movies.len() == before {
            return Err(CoreError::not_found("Movie"));
        }
        let dropped: Vec<Uuid> =
            tables.showtimes.iter().filter(|s| s.movie == id).map(|s| s.id).collect();
        tables.showtimes.retain(|s| s.movie != id);
        tables.reservations.retain(|r| !dropped.contains(&r.showtime_id));
        tables.cast.retain(|(movie, _)| *movie != id);
        Ok(())
    }
}

#[async_trait]
impl ShowtimeRepository for MemoryStore {
    async fn list(&self) -> CoreResult<Vec<ShowtimeListing>> {
        let tables = self.lock();
        Ok(tables.showtimes.iter().map(|s| tables.listing(s)).collect())
    }

    async fn find(&self, id: Uuid) -> CoreResult<Option<ShowtimeListing>> {
        let tables = self.lock();
        Ok(tables.showtimes.iter().find(|s| s.id == id).map(|s| tables.listing(s)))
    }

    async fn list_by_movie(&self, movie_id: i32) -> CoreResult<Vec<ShowtimeListing>> {
        let tables = self.lock();
        Ok(tables
            .showtimes
            .iter()
            .filter(|s| s.movie == movie_id)
            .map(|s| tables.listing(s))
            .collect())
    }

    async fn create(&self, showtime: &NewShowtime) -> CoreResult<Showtime> {
        let created = Showtime {
            id: Uuid::new_v4(),
            movie: showtime.movie,
            room: showtime.room,
            start_time: showtime.start_time,
            end_time: showtime.end_time,
            is_full: showtime.is_full,
        };
        self.lock().showtimes.push(created.clone());
        Ok(created)
    }

    async fn update(&self, showtime: &Showtime) -> CoreResult<Showtime> {
        let mut tables = self.lock();
        let stored = tables
            .showtimes
            .iter_mut()
            .find(|s| s.id == showtime.id)
            .ok_or_else(|| CoreError::not_found("Showtime"))?;
        *stored = showtime.clone();
        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> CoreResult<()> {
        let mut tables = self.lock();
        let before = tables.showtimes.len();
        tables.showtimes.retain(|s| s.id != id);
        if tables.showtimes.len() == before {
            return Err(CoreError::not_found("Showtime"));
        }
        tables.reservations.retain(|r| r.showtime_id != id);
        Ok(())
    }
}

#[async_trait]
impl ReservationRepository for MemoryStore {
    async fn list(&self) -> CoreResult<Vec<ReservationDetail>> {
        let tables = self.lock();
        Ok(tables.reservations.iter().filter_map(|r| tables.detail(r)).collect())
    }

    async fn find(&self, id: Uuid) -> CoreResult<Option<ReservationDetail>> {
        let tables = self.lock();
        Ok(tables.reservations.iter().find(|r| r.id == id).and_then(|r| tables.detail(r)))
    }

    async fn list_by_user(&self, user_id: Uuid) -> CoreResult<Vec<ReservationDetail>> {
        let tables = self.lock();
        Ok(tables
            .reservations
            .iter()
            .filter(|r| r.user_id == user_id)
            .filter_map(|r| tables.detail(r))
            .collect())
    }

    async fn booking_context(&self, showtime_id: Uuid) -> CoreResult<Option<BookingContext>> {
        let tables = self.lock();
        let Some(showtime) = tables.showtimes.iter().find(|s| s.id == showtime_id).cloned() else {
            return Ok(None);
        };
        let room_seats = tables.seats.iter().filter(|s| s.room == showtime.room).cloned().collect();
        let reserved_seats = tables
            .reservations
            .iter()
            .filter(|r| r.showtime_id == showtime_id)
            .map(|r| r.seat_id)
            .collect();
        Ok(Some(BookingContext { showtime, room_seats, reserved_seats }))
    }

    async fn commit(&self, plan: &ReservationPlan) -> CoreResult<ReservationReceipt> {
        let mut tables = self.lock();
        if let Some(taken) = plan.seat_ids.iter().find(|seat| {
            tables
                .reservations
                .iter()
                .any(|r| r.showtime_id == plan.showtime_id && r.seat_id == **seat)
        }) {
            return Err(CoreError::Conflict(format!("Seat {} is already reserved", taken)));
        }

        let now = Utc::now();
        let mut reservation_ids = Vec::with_capacity(plan.seat_ids.len());
        for seat_id in &plan.seat_ids {
            let id = Uuid::new_v4();
            tables.reservations.push(Reservation {
                id,
                user_id: plan.user_id,
                showtime_id: plan.showtime_id,
                seat_id: *seat_id,
                created_at: now,
            });
            reservation_ids.push(id);
        }

        let booked =
            tables.reservations.iter().filter(|r| r.showtime_id == plan.showtime_id).count() as i64;
        let is_full = booked >= plan.capacity;
        if is_full {
            if let Some(showtime) = tables.showtimes.iter_mut().find(|s| s.id == plan.showtime_id) {
                showtime.is_full = true;
            }
        }
        Ok(ReservationReceipt { reservation_ids, is_full })
    }

    async fn delete(&self, id: Uuid) -> CoreResult<Reservation> {
        let mut tables = self.lock();
        let index = tables
            .reservations
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| CoreError::not_found("Reservation"))?;
        let removed = tables.reservations.remove(index);
        if let Some(showtime) = tables.showtimes.iter_mut().find(|s| s.id == removed.showtime_id) {
            showtime.is_full = false;
        }
        Ok(removed)
    }
}

#[async_trait]
impl ActorRepository for MemoryStore {
    async fn list(&self) -> CoreResult<Vec<Actor>> {
        let mut actors = self.lock().actors.clone();
        actors.sort_by_key(|a| a.id);
        Ok(actors)
    }

    async fn search(&self, term: &str) -> CoreResult<Vec<Actor>> {
        let term = term.to_lowercase();
        let mut actors: Vec<Actor> = self
            .lock()
            .actors
            .iter()
            .filter(|a| {
                a.first_name.to_lowercase().contains(&term)
                    || a.last_name.to_lowercase().contains(&term)
            })
            .cloned()
            .collect();
        actors.sort_by(|a, b| a.first_name.cmp(&b.first_name));
        Ok(actors)
    }

    async fn find(&self, id: i32) -> CoreResult<Option<Actor>> {
        Ok(self.lock().actors.iter().find(|a| a.id == id).cloned())
    }

    async fn create(&self, actor: &CreateActor) -> CoreResult<Actor> {
        let mut tables = self.lock();
        if tables
            .actors
            .iter()
            .any(|a| a.first_name == actor.first_name && a.last_name == actor.last_name)
        {
            return Err(CoreError::Conflict("Actor already exists".into()));
        }
        let created = Actor {
            id: tables.next_id(),
            first_name: actor.first_name.clone(),
            last_name: actor.last_name.clone(),
            age: actor.age,
            nationality: actor.nationality.clone(),
        };
        tables.actors.push(created.clone());
        Ok(created)
    }

    async fn update(&self, actor: &Actor) -> CoreResult<Actor> {
        let mut tables = self.lock();
        let stored = tables
            .actors
            .iter_mut()
            .find(|a| a.id == actor.id)
            .ok_or_else(|| CoreError::not_found("Actor"))?;
        *stored = actor.clone();
        Ok(stored.clone())
    }

    async fn is_cast(&self, id: i32) -> CoreResult<bool> {
        Ok(self.lock().cast.iter().any(|(_, actor)| *actor == id))
    }

    async fn delete(&self, id: i32) -> CoreResult<()> {
        let mut tables = self.lock();
        let before = tables.actors.len();
        tables.actors.retain(|a| a.id != id);
        if tables.actors.len() == before {
            return Err(CoreError::not_found("Actor"));
        }
        Ok(())
    }
}

#[async_trait]
impl FutureReleaseRepository for MemoryStore {
    async fn list(&self) -> CoreResult<Vec<FutureRelease>> {
        let tables = self.lock();
        Ok(tables.releases.iter().map(|(id, input)| tables.release(*id, input)).collect())
    }

    async fn find(&self, id: i32) -> CoreResult<Option<FutureRelease>> {
        let tables = self.lock();
        Ok(tables
            .releases
            .iter()
            .find(|(stored, _)| *stored == id)
            .map(|(id, input)| tables.release(*id, input)))
    }

    async fn create(&self, release: &FutureReleaseInput) -> CoreResult<FutureRelease> {
        let mut tables = self.lock();
        let id = tables.next_id();
        tables.releases.push((id, release.clone()));
        Ok(tables.release(id, release))
    }

    async fn update(&self, id: i32, release: &FutureReleaseInput) -> CoreResult<FutureRelease> {
        let mut tables = self.lock();
        let (_, stored) = tables
            .releases
            .iter_mut()
            .find(|(stored, _)| *stored == id)
            .ok_or_else(|| CoreError::not_found("Future release"))?;
        *stored = release.clone();
        Ok(tables.release(id, release))
    }

    async fn delete(&self, id: i32) -> CoreResult<()> {
        let mut tables = self.lock();
        let before = tables.releases.len();
        tables.releases.retain(|(stored, _)| *stored != id);
        if tables.releases.len() == before {
            return Err(CoreError::not_found("Future release"));
        }
        Ok(())
    }
}

#[async_trait]
impl MovieCastRepository for MemoryStore {
    async fn list(&self) -> CoreResult<Vec<MovieCast>> {
        let tables = self.lock();
        Ok(tables.cast.iter().filter_map(|(m, a)| tables.cast_entry(*m, *a)).collect())
    }

    async fn list_by_movie(&self, movie_id: i32) -> CoreResult<Vec<MovieCast>> {
        let tables = self.lock();
        Ok(tables
            .cast
            .iter()
            .filter(|(m, _)| *m == movie_id)
            .filter_map(|(m, a)| tables.cast_entry(*m, *a))
            .collect())
    }

    async fn find(&self, movie_id: i32, actor_id: i32) -> CoreResult<Option<MovieCast>> {
        let tables = self.lock();
        if !tables.cast.contains(&(movie_id, actor_id)) {
            return Ok(None);
        }
        Ok(tables.cast_entry(movie_id, actor_id))
    }

    async fn create(&self, link: &MovieCastInput) -> CoreResult<MovieCast> {
        let mut tables = self.lock();
        if tables.cast.contains(&(link.movie, link.actor)) {
            return Err(CoreError::Conflict("Movie cast already exists".into()));
        }
        tables.cast.push((link.movie, link.actor));
        tables
            .cast_entry(link.movie, link.actor)
            .ok_or_else(|| CoreError::Validation("Movie or actor does not exist".into()))
    }

    async fn delete(&self, movie_id: i32, actor_id: i32) -> CoreResult<()> {
        let mut tables = self.lock();
        let before = tables.cast.len();
        tables.cast.retain(|link| *link != (movie_id, actor_id));
        if tables.cast.len() == before {
            return Err(CoreError::not_found("Movie cast"));
        }
        Ok(())
    }
}

// ============================================================================
// Email
// ============================================================================

/// Keeps every message instead of delivering it.
#[derive(Default)]
pub struct RecordingEmailSender {
    pub sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingEmailSender {
    pub fn last(&self) -> Option<EmailMessage> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send(&self, message: &EmailMessage) -> CoreResult<()> {
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

// ============================================================================
// Test application
// ============================================================================

pub const APP_URL: &str = "http://cinemaspot.test";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub mail: Arc<RecordingEmailSender>,
}

pub fn test_app() -> TestApp {
    test_app_with_capacity(20)
}

pub fn test_app_with_capacity(default_showtime_capacity: i64) -> TestApp {
    let store = Arc::new(MemoryStore::default());
    let mail = Arc::new(RecordingEmailSender::default());
    let (sse_tx, _) = broadcast::channel(16);

    let state = AppState {
        users: store.clone(),
        roles: store.clone(),
        categories: store.clone(),
        rooms: store.clone(),
        seats: store.clone(),
        movies: store.clone(),
        showtimes: store.clone(),
        reservations: store.clone(),
        actors: store.clone(),
        future_releases: store.clone(),
        movie_cast: store.clone(),
        email: mail.clone(),
        sse_tx,
        auth: AuthConfig {
            secret: "integration-secret".into(),
            session_hours: 24,
            email_hours: 2,
            reset_hours: 1,
        },
        app_url: APP_URL.into(),
        business_rules: BusinessRules { default_showtime_capacity },
    };

    TestApp { router: app(state.clone()), state, store, mail }
}

impl TestApp {
    /// Inserts an account directly, with a cheap hash.
    pub async fn add_user(&self, email: &str, password: &str, role: &str) -> User {
        let password_hash = hash_password_with_cost(password, 4).unwrap();
        UserRepository::create(
            self.store.as_ref(),
            &NewUser {
                first_name: "Test".into(),
                last_name: "User".into(),
                email: email.into(),
                password_hash,
                role: role.into(),
                email_validated: true,
            },
        )
        .await
        .unwrap()
    }

    pub fn token_for(&self, user: &User) -> String {
        issue_session_token(&self.state.auth, user.id).unwrap()
    }

    pub async fn admin_token(&self) -> String {
        let admin = self.add_user("admin@cinemaspot.io", "admin123", ADMIN_ROLE).await;
        self.token_for(&admin)
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }
}
