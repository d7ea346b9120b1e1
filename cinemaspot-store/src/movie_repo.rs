use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use cinemaspot_core::catalog::{MovieDetail, MovieInput, MovieShowtime};
use cinemaspot_core::repository::MovieRepository;
use cinemaspot_core::venue::RoomRef;
use cinemaspot_core::{CoreError, CoreResult};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{expect_rows, DbResultExt};

pub struct StoreMovieRepository {
    pool: PgPool,
}

impl StoreMovieRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MovieRow {
    id: i32,
    title: String,
    description: String,
    poster: String,
    category_name: Option<String>,
    duration: String,
    banner: String,
    synopsis: String,
    trailer: String,
    director: String,
    rating: String,
    review: f64,
}

#[derive(sqlx::FromRow)]
struct MovieShowtimeRow {
    id: Uuid,
    movie: i32,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    room_id: Uuid,
    room_name: String,
    is_full: bool,
}

const SELECT_MOVIE: &str = r#"
    SELECT m.id, m.title, m.description, m.poster, c.name AS category_name,
           m.duration, m.banner, m.synopsis, m.trailer, m.director, m.rating, m.review
    FROM movies m
    LEFT JOIN categories c ON c.id = m.category
"#;

impl StoreMovieRepository {
    /// Loads showtimes for every movie in `rows` and assembles the details.
    async fn attach_showtimes(&self, rows: Vec<MovieRow>) -> CoreResult<Vec<MovieDetail>> {
        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();
        let showtimes = sqlx::query_as::<_, MovieShowtimeRow>(
            r#"
            SELECT s.id, s.movie, s.start_time, s.end_time, r.id AS room_id, r.name AS room_name, s.is_full
            FROM showtimes s
            JOIN rooms r ON r.id = s.room
            WHERE s.movie = ANY($1)
            ORDER BY s.start_time
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .or_db("Showtime")?;

        let mut by_movie: HashMap<i32, Vec<MovieShowtime>> = HashMap::new();
        for s in showtimes {
            by_movie.entry(s.movie).or_default().push(MovieShowtime {
                id: s.id,
                start_time: s.start_time,
                end_time: s.end_time,
                room: RoomRef { id: s.room_id, name: s.room_name },
                is_full: s.is_full,
            });
        }

        Ok(rows
            .into_iter()
            .map(|m| MovieDetail {
                showtimes: by_movie.remove(&m.id).unwrap_or_default(),
                id: m.id,
                title: m.title,
                description: m.description,
                poster: m.poster,
                category: m.category_name,
                duration: m.duration,
                banner: m.banner,
                synopsis: m.synopsis,
                trailer: m.trailer,
                director: m.director,
                rating: m.rating,
                review: m.review,
            })
            .collect())
    }

    async fn fetch_existing(&self, id: i32) -> CoreResult<MovieDetail> {
        self.find(id).await?.ok_or_else(|| CoreError::not_found("Movie"))
    }
}

#[async_trait]
impl MovieRepository for StoreMovieRepository {
    async fn list(&self) -> CoreResult<Vec<MovieDetail>> {
        let rows = sqlx::query_as::<_, MovieRow>(&format!("{} ORDER BY m.id", SELECT_MOVIE))
            .fetch_all(&self.pool)
            .await
            .or_db("Movie")?;
        self.attach_showtimes(rows).await
    }

    async fn find(&self, id: i32) -> CoreResult<Option<MovieDetail>> {
        let row = sqlx::query_as::<_, MovieRow>(&format!("{} WHERE m.id = $1", SELECT_MOVIE))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .or_db("Movie")?;
        match row {
            Some(row) => Ok(self.attach_showtimes(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_title(&self, title: &str) -> CoreResult<Option<i32>> {
        sqlx::query_scalar("SELECT id FROM movies WHERE title = $1 ORDER BY id LIMIT 1")
            .bind(title)
            .fetch_optional(&self.pool)
            .await
            .or_db("Movie")
    }

    async fn create(&self, movie: &MovieInput) -> CoreResult<MovieDetail> {
        let mut tx = self.pool.begin().await.or_db("Movie")?;

        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO movies (title, description, poster, category, duration, banner, synopsis, trailer, director, rating, review)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(&movie.title)
        .bind(&movie.description)
        .bind(&movie.poster)
        .bind(movie.category)
        .bind(&movie.duration)
        .bind(&movie.banner)
        .bind(&movie.synopsis)
        .bind(&movie.trailer)
        .bind(&movie.director)
        .bind(&movie.rating)
        .bind(movie.review)
        .fetch_one(&mut *tx)
        .await
        .or_db("Movie")?;

        for showtime in &movie.showtimes {
            sqlx::query(
                r#"
                INSERT INTO showtimes (id, movie, room, start_time, end_time, is_full)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(id)
            .bind(showtime.room)
            .bind(showtime.start_time)
            .bind(showtime.end_time)
            .bind(showtime.is_full)
            .execute(&mut *tx)
            .await
            .or_db("Showtime")?;
        }

        tx.commit().await.or_db("Movie")?;
        tracing::info!(movie_id = id, showtimes = movie.showtimes.len(), "Movie created");

        self.fetch_existing(id).await
    }

    async fn update(&self, id: i32, movie: &MovieInput) -> CoreResult<MovieDetail> {
        let mut tx = self.pool.begin().await.or_db("Movie")?;

        let result = sqlx::query(
            r#"
            UPDATE movies
            SET title = $2, description = $3, poster = $4, category = $5, duration = $6,
                banner = $7, synopsis = $8, trailer = $9, director = $10, rating = $11, review = $12
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&movie.title)
        .bind(&movie.description)
        .bind(&movie.poster)
        .bind(movie.category)
        .bind(&movie.duration)
        .bind(&movie.banner)
        .bind(&movie.synopsis)
        .bind(&movie.trailer)
        .bind(&movie.director)
        .bind(&movie.rating)
        .bind(movie.review)
        .execute(&mut *tx)
        .await
        .or_db("Movie")?;
        expect_rows(result.rows_affected(), "Movie")?;

        for showtime in &movie.showtimes {
            let Some(showtime_id) = showtime.id else { continue };
            let result = sqlx::query(
                r#"
                UPDATE showtimes SET start_time = $3, end_time = $4, room = $5, is_full = $6
                WHERE id = $1 AND movie = $2
                "#,
            )
            .bind(showtime_id)
            .bind(id)
            .bind(showtime.start_time)
            .bind(showtime.end_time)
            .bind(showtime.room)
            .bind(showtime.is_full)
            .execute(&mut *tx)
            .await
            .or_db("Showtime")?;
            expect_rows(result.rows_affected(), "Showtime")?;
        }

        tx.commit().await.or_db("Movie")?;
        self.fetch_existing(id).await
    }

    async fn delete(&self, id: i32) -> CoreResult<()> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .or_db("Movie")?;
        expect_rows(result.rows_affected(), "Movie")
    }
}
