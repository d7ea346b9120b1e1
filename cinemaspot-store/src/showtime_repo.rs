use async_trait::async_trait;
use chrono::NaiveDateTime;
use cinemaspot_core::repository::ShowtimeRepository;
use cinemaspot_core::screening::{NewShowtime, Showtime, ShowtimeListing};
use cinemaspot_core::CoreResult;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{expect_rows, DbResultExt};

pub struct StoreShowtimeRepository {
    pool: PgPool,
}

impl StoreShowtimeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct ShowtimeRow {
    pub(crate) id: Uuid,
    pub(crate) movie: i32,
    pub(crate) room: Uuid,
    pub(crate) start_time: NaiveDateTime,
    pub(crate) end_time: NaiveDateTime,
    pub(crate) is_full: bool,
}

impl From<ShowtimeRow> for Showtime {
    fn from(row: ShowtimeRow) -> Self {
        Showtime {
            id: row.id,
            movie: row.movie,
            room: row.room,
            start_time: row.start_time,
            end_time: row.end_time,
            is_full: row.is_full,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ListingRow {
    id: Uuid,
    movie: i32,
    room: Uuid,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    is_full: bool,
    movie_title: String,
    room_name: String,
}

impl From<ListingRow> for ShowtimeListing {
    fn from(row: ListingRow) -> Self {
        ShowtimeListing {
            showtime: Showtime {
                id: row.id,
                movie: row.movie,
                room: row.room,
                start_time: row.start_time,
                end_time: row.end_time,
                is_full: row.is_full,
            },
            movie_title: row.movie_title,
            room_name: row.room_name,
        }
    }
}

const SELECT_LISTING: &str = r#"
    SELECT s.id, s.movie, s.room, s.start_time, s.end_time, s.is_full,
           m.title AS movie_title, r.name AS room_name
    FROM showtimes s
    JOIN movies m ON m.id = s.movie
    JOIN rooms r ON r.id = s.room
"#;

#[async_trait]
impl ShowtimeRepository for StoreShowtimeRepository {
    async fn list(&self) -> CoreResult<Vec<ShowtimeListing>> {
        let rows = sqlx::query_as::<_, ListingRow>(&format!("{} ORDER BY s.start_time", SELECT_LISTING))
            .fetch_all(&self.pool)
            .await
            .or_db("Showtime")?;
        Ok(rows.into_iter().map(ShowtimeListing::from).collect())
    }

    async fn find(&self, id: Uuid) -> CoreResult<Option<ShowtimeListing>> {
        let row = sqlx::query_as::<_, ListingRow>(&format!("{} WHERE s.id = $1", SELECT_LISTING))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .or_db("Showtime")?;
        Ok(row.map(ShowtimeListing::from))
    }

    async fn list_by_movie(&self, movie_id: i32) -> CoreResult<Vec<ShowtimeListing>> {
        let rows = sqlx::query_as::<_, ListingRow>(&format!(
            "{} WHERE s.movie = $1 ORDER BY s.start_time",
            SELECT_LISTING
        ))
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await
        .or_db("Showtime")?;
        Ok(rows.into_iter().map(ShowtimeListing::from).collect())
    }

    async fn create(&self, showtime: &NewShowtime) -> CoreResult<Showtime> {
        let row = sqlx::query_as::<_, ShowtimeRow>(
            r#"
            INSERT INTO showtimes (id, movie, room, start_time, end_time, is_full)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, movie, room, start_time, end_time, is_full
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(showtime.movie)
        .bind(showtime.room)
        .bind(showtime.start_time)
        .bind(showtime.end_time)
        .bind(showtime.is_full)
        .fetch_one(&self.pool)
        .await
        .or_db("Showtime")?;

        tracing::info!(showtime_id = %row.id, movie_id = row.movie, "Showtime created");
        Ok(row.into())
    }

    async fn update(&self, showtime: &Showtime) -> CoreResult<Showtime> {
        let row = sqlx::query_as::<_, ShowtimeRow>(
            r#"
            UPDATE showtimes SET room = $2, start_time = $3, end_time = $4, is_full = $5
            WHERE id = $1
            RETURNING id, movie, room, start_time, end_time, is_full
            "#,
        )
        .bind(showtime.id)
        .bind(showtime.room)
        .bind(showtime.start_time)
        .bind(showtime.end_time)
        .bind(showtime.is_full)
        .fetch_one(&self.pool)
        .await
        .or_db("Showtime")?;
        Ok(row.into())
    }

    async fn delete(&self, id: Uuid) -> CoreResult<()> {
        let result = sqlx::query("DELETE FROM showtimes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .or_db("Showtime")?;
        expect_rows(result.rows_affected(), "Showtime")
    }
}
