use async_trait::async_trait;
use chrono::NaiveDate;
use cinemaspot_core::catalog::{FutureRelease, FutureReleaseInput};
use cinemaspot_core::repository::FutureReleaseRepository;
use cinemaspot_core::{CoreError, CoreResult};
use sqlx::PgPool;

use crate::error::{expect_rows, DbResultExt};

pub struct StoreFutureReleaseRepository {
    pool: PgPool,
}

impl StoreFutureReleaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct FutureReleaseRow {
    id: i32,
    title: String,
    description: String,
    poster: String,
    category_id: Option<i32>,
    category_name: Option<String>,
    duration: String,
    banner: String,
    synopsis: String,
    trailer: String,
    director: String,
    rating: String,
    release_date: NaiveDate,
}

impl From<FutureReleaseRow> for FutureRelease {
    fn from(row: FutureReleaseRow) -> Self {
        FutureRelease {
            id: row.id,
            title: row.title,
            description: row.description,
            poster: row.poster,
            category_id: row.category_id,
            category: row.category_name,
            duration: row.duration,
            banner: row.banner,
            synopsis: row.synopsis,
            trailer: row.trailer,
            director: row.director,
            rating: row.rating,
            release_date: row.release_date,
        }
    }
}

const SELECT_RELEASE: &str = r#"
    SELECT f.id, f.title, f.description, f.poster, f.category AS category_id, c.name AS category_name,
           f.duration, f.banner, f.synopsis, f.trailer, f.director, f.rating, f.release_date
    FROM future_releases f
    LEFT JOIN categories c ON c.id = f.category
"#;

impl StoreFutureReleaseRepository {
    async fn fetch_existing(&self, id: i32) -> CoreResult<FutureRelease> {
        self.find(id).await?.ok_or_else(|| CoreError::not_found("Future release"))
    }
}

#[async_trait]
impl FutureReleaseRepository for StoreFutureReleaseRepository {
    async fn list(&self) -> CoreResult<Vec<FutureRelease>> {
        let rows = sqlx::query_as::<_, FutureReleaseRow>(&format!(
            "{} ORDER BY f.release_date, f.id",
            SELECT_RELEASE
        ))
        .fetch_all(&self.pool)
        .await
        .or_db("Future release")?;
        Ok(rows.into_iter().map(FutureRelease::from).collect())
    }

    async fn find(&self, id: i32) -> CoreResult<Option<FutureRelease>> {
        let row = sqlx::query_as::<_, FutureReleaseRow>(&format!("{} WHERE f.id = $1", SELECT_RELEASE))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .or_db("Future release")?;
        Ok(row.map(FutureRelease::from))
    }

    async fn create(&self, release: &FutureReleaseInput) -> CoreResult<FutureRelease> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO future_releases (title, description, poster, category, duration, banner, synopsis, trailer, director, rating, release_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(&release.title)
        .bind(&release.description)
        .bind(&release.poster)
        .bind(release.category)
        .bind(&release.duration)
        .bind(&release.banner)
        .bind(&release.synopsis)
        .bind(&release.trailer)
        .bind(&release.director)
        .bind(&release.rating)
        .bind(release.release_date)
        .fetch_one(&self.pool)
        .await
        .or_db("Future release")?;

        self.fetch_existing(id).await
    }

    async fn update(&self, id: i32, release: &FutureReleaseInput) -> CoreResult<FutureRelease> {
        let result = sqlx::query(
            r#"
            UPDATE future_releases
            SET title = $2, description = $3, poster = $4, category = $5, duration = $6,
                banner = $7, synopsis = $8, trailer = $9, director = $10, rating = $11, release_date = $12
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&release.title)
        .bind(&release.description)
        .bind(&release.poster)
        .bind(release.category)
        .bind(&release.duration)
        .bind(&release.banner)
        .bind(&release.synopsis)
        .bind(&release.trailer)
        .bind(&release.director)
        .bind(&release.rating)
        .bind(release.release_date)
        .execute(&self.pool)
        .await
        .or_db("Future release")?;
        expect_rows(result.rows_affected(), "Future release")?;

        self.fetch_existing(id).await
    }

    async fn delete(&self, id: i32) -> CoreResult<()> {
        let result = sqlx::query("DELETE FROM future_releases WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .or_db("Future release")?;
        expect_rows(result.rows_affected(), "Future release")
    }
}
