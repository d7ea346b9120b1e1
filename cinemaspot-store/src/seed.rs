use cinemaspot_core::identity::ADMIN_ROLE;
use cinemaspot_core::password::hash_password;
use cinemaspot_core::validation::normalize_email;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::app_config::SeedConfig;

pub const CATEGORIES: &[&str] = &[
    "Action",
    "Adventure",
    "Animation",
    "Comedy",
    "Drama",
    "Horror",
    "Science Fiction",
    "Thriller",
];

pub const ROOMS: &[&str] = &["A1", "B1", "C1"];

pub const SEATS_PER_ROOM: i32 = 10;

/// Inserts reference data. Safe to run repeatedly.
pub async fn seed(pool: &PgPool, config: &SeedConfig) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;

    for name in CATEGORIES {
        sqlx::query("INSERT INTO categories (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }
    info!("Seeded {} categories", CATEGORIES.len());

    for name in ROOMS {
        sqlx::query("INSERT INTO rooms (id, name) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING")
            .bind(Uuid::new_v4())
            .bind(name)
            .execute(&mut *tx)
            .await?;

        let room_id: Uuid = sqlx::query_scalar("SELECT id FROM rooms WHERE name = $1")
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

        for seat_number in 1..=SEATS_PER_ROOM {
            sqlx::query(
                r#"
                INSERT INTO seats (id, seat_number, room, is_available)
                VALUES ($1, $2, $3, TRUE)
                ON CONFLICT (room, seat_number) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(seat_number)
            .bind(room_id)
            .execute(&mut *tx)
            .await?;
        }
    }
    info!("Seeded {} rooms with {} seats each", ROOMS.len(), SEATS_PER_ROOM);

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        let hash = hash_password(password)?;
        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, email, password, role, email_validated)
            SELECT $1, 'Admin', 'CinemaSpot', $2, $3, r.id, TRUE
            FROM roles r WHERE r.name = $4
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(normalize_email(email))
        .bind(hash)
        .bind(ADMIN_ROLE)
        .execute(&mut *tx)
        .await?;
        info!("Seeded admin account");
    } else {
        info!("No seed admin credentials configured, skipping admin account");
    }

    tx.commit().await?;
    Ok(())
}
