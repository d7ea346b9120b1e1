use async_trait::async_trait;
use cinemaspot_core::repository::{RoomRepository, SeatRepository};
use cinemaspot_core::venue::{Room, RoomInput, Seat, SeatInput};
use cinemaspot_core::CoreResult;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{expect_rows, DbResultExt};

// ============================================================================
// Rooms
// ============================================================================

pub struct StoreRoomRepository {
    pool: PgPool,
}

impl StoreRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RoomRow {
    id: Uuid,
    name: String,
}

impl From<RoomRow> for Room {
    fn from(row: RoomRow) -> Self {
        Room { id: row.id, name: row.name }
    }
}

#[async_trait]
impl RoomRepository for StoreRoomRepository {
    async fn list(&self) -> CoreResult<Vec<Room>> {
        let rows = sqlx::query_as::<_, RoomRow>("SELECT id, name FROM rooms ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .or_db("Room")?;
        Ok(rows.into_iter().map(Room::from).collect())
    }

    async fn find(&self, id: Uuid) -> CoreResult<Option<Room>> {
        let row = sqlx::query_as::<_, RoomRow>("SELECT id, name FROM rooms WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .or_db("Room")?;
        Ok(row.map(Room::from))
    }

    async fn find_by_name(&self, name: &str) -> CoreResult<Option<Room>> {
        let row = sqlx::query_as::<_, RoomRow>("SELECT id, name FROM rooms WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .or_db("Room")?;
        Ok(row.map(Room::from))
    }

    async fn create(&self, room: &RoomInput) -> CoreResult<Room> {
        let row = sqlx::query_as::<_, RoomRow>(
            "INSERT INTO rooms (id, name) VALUES ($1, $2) RETURNING id, name",
        )
        .bind(Uuid::new_v4())
        .bind(room.name.trim())
        .fetch_one(&self.pool)
        .await
        .or_db("Room")?;
        Ok(row.into())
    }

    async fn update(&self, id: Uuid, room: &RoomInput) -> CoreResult<Room> {
        let row = sqlx::query_as::<_, RoomRow>(
            "UPDATE rooms SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(id)
        .bind(room.name.trim())
        .fetch_one(&self.pool)
        .await
        .or_db("Room")?;
        Ok(row.into())
    }

    async fn delete(&self, id: Uuid) -> CoreResult<()> {
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .or_db("Room")?;
        expect_rows(result.rows_affected(), "Room")
    }
}

// ============================================================================
// Seats
// ============================================================================

pub struct StoreSeatRepository {
    pool: PgPool,
}

impl StoreSeatRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct SeatRow {
    id: Uuid,
    seat_number: i32,
    room: Uuid,
    is_available: bool,
}

impl From<SeatRow> for Seat {
    fn from(row: SeatRow) -> Self {
        Seat {
            id: row.id,
            seat_number: row.seat_number,
            room: row.room,
            is_available: row.is_available,
        }
    }
}

#[async_trait]
impl SeatRepository for StoreSeatRepository {
    async fn list(&self) -> CoreResult<Vec<Seat>> {
        let rows = sqlx::query_as::<_, SeatRow>(
            "SELECT id, seat_number, room, is_available FROM seats ORDER BY seat_number, room",
        )
        .fetch_all(&self.pool)
        .await
        .or_db("Seat")?;
        Ok(rows.into_iter().map(Seat::from).collect())
    }

    async fn find(&self, id: Uuid) -> CoreResult<Option<Seat>> {
        let row = sqlx::query_as::<_, SeatRow>(
            "SELECT id, seat_number, room, is_available FROM seats WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .or_db("Seat")?;
        Ok(row.map(Seat::from))
    }

    async fn list_by_room_name(&self, room: &str) -> CoreResult<Vec<Seat>> {
        let rows = sqlx::query_as::<_, SeatRow>(
            r#"
            SELECT s.id, s.seat_number, s.room, s.is_available
            FROM seats s
            JOIN rooms r ON r.id = s.room
            WHERE r.name = $1
            ORDER BY s.seat_number
            "#,
        )
        .bind(room)
        .fetch_all(&self.pool)
        .await
        .or_db("Seat")?;
        Ok(rows.into_iter().map(Seat::from).collect())
    }

    async fn create(&self, seat: &SeatInput) -> CoreResult<Seat> {
        let row = sqlx::query_as::<_, SeatRow>(
            r#"
            INSERT INTO seats (id, seat_number, room, is_available)
            VALUES ($1, $2, $3, $4)
            RETURNING id, seat_number, room, is_available
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(seat.seat_number)
        .bind(seat.room)
        .bind(seat.is_available)
        .fetch_one(&self.pool)
        .await
        .or_db("Seat")?;
        Ok(row.into())
    }

    async fn update(&self, id: Uuid, seat: &SeatInput) -> CoreResult<Seat> {
        let row = sqlx::query_as::<_, SeatRow>(
            r#"
            UPDATE seats SET seat_number = $2, room = $3, is_available = $4
            WHERE id = $1
            RETURNING id, seat_number, room, is_available
            "#,
        )
        .bind(id)
        .bind(seat.seat_number)
        .bind(seat.room)
        .bind(seat.is_available)
        .fetch_one(&self.pool)
        .await
        .or_db("Seat")?;
        Ok(row.into())
    }

    async fn delete(&self, id: Uuid) -> CoreResult<()> {
        let result = sqlx::query("DELETE FROM seats WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .or_db("Seat")?;
        expect_rows(result.rows_affected(), "Seat")
    }
}
