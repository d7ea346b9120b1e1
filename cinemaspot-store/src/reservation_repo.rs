use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use cinemaspot_core::booking::{
    BookingContext, MovieSummary, Reservation, ReservationDetail, ReservationPlan,
    ReservationReceipt, ReservationSeat, ReservationShowtime, ReservationUser,
};
use cinemaspot_core::repository::ReservationRepository;
use cinemaspot_core::venue::{RoomRef, Seat};
use cinemaspot_core::{CoreError, CoreResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbResultExt;
use crate::showtime_repo::ShowtimeRow;
use crate::venue_repo::SeatRow;

pub struct StoreReservationRepository {
    pool: PgPool,
}

impl StoreReservationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReservationRow {
    id: Uuid,
    user_id: Uuid,
    showtime_id: Uuid,
    seat_id: Uuid,
    created_at: DateTime<Utc>,
}

impl From<ReservationRow> for Reservation {
    fn from(row: ReservationRow) -> Self {
        Reservation {
            id: row.id,
            user_id: row.user_id,
            showtime_id: row.showtime_id,
            seat_id: row.seat_id,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DetailRow {
    id: Uuid,
    user_id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    showtime_id: Uuid,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    movie_id: i32,
    movie_title: String,
    movie_description: String,
    movie_poster: String,
    showtime_room_id: Uuid,
    showtime_room_name: String,
    seat_id: Uuid,
    seat_number: i32,
    seat_room_id: Uuid,
    seat_room_name: String,
}

impl From<DetailRow> for ReservationDetail {
    fn from(row: DetailRow) -> Self {
        ReservationDetail {
            id_reservation: row.id,
            user_data: ReservationUser {
                id: row.user_id,
                first_name: row.first_name,
                last_name: row.last_name,
                email: row.email,
            },
            showtime_data: ReservationShowtime {
                id: row.showtime_id,
                movie: MovieSummary {
                    id: row.movie_id,
                    title: row.movie_title,
                    description: row.movie_description,
                    poster: row.movie_poster,
                },
                start_time: row.start_time,
                end_time: row.end_time,
                room: RoomRef { id: row.showtime_room_id, name: row.showtime_room_name },
            },
            seat_data: ReservationSeat {
                id: row.seat_id,
                seat_number: row.seat_number,
                room: RoomRef { id: row.seat_room_id, name: row.seat_room_name },
            },
        }
    }
}

const SELECT_DETAIL: &str = r#"
    SELECT res.id,
           u.id AS user_id, u.first_name, u.last_name, u.email,
           s.id AS showtime_id, s.start_time, s.end_time,
           m.id AS movie_id, m.title AS movie_title, m.description AS movie_description, m.poster AS movie_poster,
           sr.id AS showtime_room_id, sr.name AS showtime_room_name,
           se.id AS seat_id, se.seat_number,
           ser.id AS seat_room_id, ser.name AS seat_room_name
    FROM reservations res
    JOIN users u ON u.id = res.user_id
    JOIN showtimes s ON s.id = res.showtime_id
    JOIN movies m ON m.id = s.movie
    JOIN rooms sr ON sr.id = s.room
    JOIN seats se ON se.id = res.seat_id
    JOIN rooms ser ON ser.id = se.room
"#;

#[async_trait]
impl ReservationRepository for StoreReservationRepository {
    async fn list(&self) -> CoreResult<Vec<ReservationDetail>> {
        let rows = sqlx::query_as::<_, DetailRow>(&format!("{} ORDER BY res.created_at", SELECT_DETAIL))
            .fetch_all(&self.pool)
            .await
            .or_db("Reservation")?;
        Ok(rows.into_iter().map(ReservationDetail::from).collect())
    }

    async fn find(&self, id: Uuid) -> CoreResult<Option<ReservationDetail>> {
        let row = sqlx::query_as::<_, DetailRow>(&format!("{} WHERE res.id = $1", SELECT_DETAIL))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .or_db("Reservation")?;
        Ok(row.map(ReservationDetail::from))
    }

    async fn list_by_user(&self, user_id: Uuid) -> CoreResult<Vec<ReservationDetail>> {
        let rows = sqlx::query_as::<_, DetailRow>(&format!(
            "{} WHERE res.user_id = $1 ORDER BY res.created_at",
            SELECT_DETAIL
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .or_db("Reservation")?;
        Ok(rows.into_iter().map(ReservationDetail::from).collect())
    }

    async fn booking_context(&self, showtime_id: Uuid) -> CoreResult<Option<BookingContext>> {
        let showtime = sqlx::query_as::<_, ShowtimeRow>(
            "SELECT id, movie, room, start_time, end_time, is_full FROM showtimes WHERE id = $1",
        )
        .bind(showtime_id)
        .fetch_optional(&self.pool)
        .await
        .or_db("Showtime")?;
        let Some(showtime) = showtime else {
            return Ok(None);
        };

        let room_seats = sqlx::query_as::<_, SeatRow>(
            "SELECT id, seat_number, room, is_available FROM seats WHERE room = $1 ORDER BY seat_number",
        )
        .bind(showtime.room)
        .fetch_all(&self.pool)
        .await
        .or_db("Seat")?;

        let reserved_seats: Vec<Uuid> =
            sqlx::query_scalar("SELECT seat_id FROM reservations WHERE showtime_id = $1")
                .bind(showtime_id)
                .fetch_all(&self.pool)
                .await
                .or_db("Reservation")?;

        Ok(Some(BookingContext {
            showtime: showtime.into(),
            room_seats: room_seats.into_iter().map(Seat::from).collect(),
            reserved_seats,
        }))
    }

    async fn commit(&self, plan: &ReservationPlan) -> CoreResult<ReservationReceipt> {
        let mut tx = self.pool.begin().await.or_db("Reservation")?;

        // 1. Lock the showtime so concurrent bookings serialize on it
        let is_full: Option<bool> =
            sqlx::query_scalar("SELECT is_full FROM showtimes WHERE id = $1 FOR UPDATE")
                .bind(plan.showtime_id)
                .fetch_optional(&mut *tx)
                .await
                .or_db("Showtime")?;
        match is_full {
            None => return Err(CoreError::not_found("Showtime")),
            Some(true) => return Err(CoreError::Forbidden("Showtime is already full".into())),
            Some(false) => {}
        }

        // 2. Re-check capacity under the lock
        let booked: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reservations WHERE showtime_id = $1")
                .bind(plan.showtime_id)
                .fetch_one(&mut *tx)
                .await
                .or_db("Reservation")?;
        let requested = plan.seat_ids.len() as i64;
        if booked + requested > plan.capacity {
            return Err(CoreError::Conflict(format!(
                "Not enough seats available: {} left",
                (plan.capacity - booked).max(0)
            )));
        }

        // 3. One row per seat
        let mut reservation_ids = Vec::with_capacity(plan.seat_ids.len());
        for seat_id in &plan.seat_ids {
            let id = Uuid::new_v4();
            sqlx::query(
                "INSERT INTO reservations (id, user_id, showtime_id, seat_id) VALUES ($1, $2, $3, $4)",
            )
            .bind(id)
            .bind(plan.user_id)
            .bind(plan.showtime_id)
            .bind(seat_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| match crate::error::db_error("Reservation", e) {
                CoreError::Conflict(_) => {
                    CoreError::Conflict(format!("Seat {} is already reserved", seat_id))
                }
                other => other,
            })?;
            reservation_ids.push(id);
        }

        // 4. Flip the flag once the room is sold out
        let is_full = booked + requested >= plan.capacity;
        if is_full {
            sqlx::query("UPDATE showtimes SET is_full = TRUE WHERE id = $1")
                .bind(plan.showtime_id)
                .execute(&mut *tx)
                .await
                .or_db("Showtime")?;
        }

        tx.commit().await.or_db("Reservation")?;

        tracing::info!(
            showtime_id = %plan.showtime_id,
            user_id = %plan.user_id,
            seats = reservation_ids.len(),
            is_full,
            "Reservation committed"
        );

        Ok(ReservationReceipt { reservation_ids, is_full })
    }

    async fn delete(&self, id: Uuid) -> CoreResult<Reservation> {
        let mut tx = self.pool.begin().await.or_db("Reservation")?;

        let row = sqlx::query_as::<_, ReservationRow>(
            r#"
            DELETE FROM reservations WHERE id = $1
            RETURNING id, user_id, showtime_id, seat_id, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .or_db("Reservation")?
        .ok_or_else(|| CoreError::not_found("Reservation"))?;

        sqlx::query("UPDATE showtimes SET is_full = FALSE WHERE id = $1")
            .bind(row.showtime_id)
            .execute(&mut *tx)
            .await
            .or_db("Showtime")?;

        tx.commit().await.or_db("Reservation")?;
        Ok(row.into())
    }
}
