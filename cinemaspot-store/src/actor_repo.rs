use async_trait::async_trait;
use cinemaspot_core::catalog::{Actor, CreateActor, MovieCast, MovieCastInput};
use cinemaspot_core::repository::{ActorRepository, MovieCastRepository};
use cinemaspot_core::{CoreError, CoreResult};
use sqlx::PgPool;

use crate::error::{expect_rows, DbResultExt};

// ============================================================================
// Actors
// ============================================================================

pub struct StoreActorRepository {
    pool: PgPool,
}

impl StoreActorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ActorRow {
    id: i32,
    first_name: String,
    last_name: String,
    age: i32,
    nationality: String,
}

impl From<ActorRow> for Actor {
    fn from(row: ActorRow) -> Self {
        Actor {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            age: row.age,
            nationality: row.nationality,
        }
    }
}

/// `%term%` with the term's own LIKE wildcards matched literally.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::from("%");
    for c in term.trim().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[async_trait]
impl ActorRepository for StoreActorRepository {
    async fn list(&self) -> CoreResult<Vec<Actor>> {
        let rows = sqlx::query_as::<_, ActorRow>(
            "SELECT id, first_name, last_name, age, nationality FROM actors ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .or_db("Actor")?;
        Ok(rows.into_iter().map(Actor::from).collect())
    }

    async fn search(&self, term: &str) -> CoreResult<Vec<Actor>> {
        let pattern = contains_pattern(term);
        let rows = sqlx::query_as::<_, ActorRow>(
            r#"
            SELECT id, first_name, last_name, age, nationality
            FROM actors
            WHERE first_name ILIKE $1 ESCAPE '\' OR last_name ILIKE $1 ESCAPE '\'
            ORDER BY first_name
            "#,
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .or_db("Actor")?;
        Ok(rows.into_iter().map(Actor::from).collect())
    }

    async fn find(&self, id: i32) -> CoreResult<Option<Actor>> {
        let row = sqlx::query_as::<_, ActorRow>(
            "SELECT id, first_name, last_name, age, nationality FROM actors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .or_db("Actor")?;
        Ok(row.map(Actor::from))
    }

    async fn create(&self, actor: &CreateActor) -> CoreResult<Actor> {
        let row = sqlx::query_as::<_, ActorRow>(
            r#"
            INSERT INTO actors (first_name, last_name, age, nationality)
            VALUES ($1, $2, $3, $4)
            RETURNING id, first_name, last_name, age, nationality
            "#,
        )
        .bind(actor.first_name.trim())
        .bind(actor.last_name.trim())
        .bind(actor.age)
        .bind(actor.nationality.trim())
        .fetch_one(&self.pool)
        .await
        .or_db("Actor")?;
        Ok(row.into())
    }

    async fn update(&self, actor: &Actor) -> CoreResult<Actor> {
        let row = sqlx::query_as::<_, ActorRow>(
            r#"
            UPDATE actors SET first_name = $2, last_name = $3, age = $4, nationality = $5
            WHERE id = $1
            RETURNING id, first_name, last_name, age, nationality
            "#,
        )
        .bind(actor.id)
        .bind(actor.first_name.trim())
        .bind(actor.last_name.trim())
        .bind(actor.age)
        .bind(actor.nationality.trim())
        .fetch_one(&self.pool)
        .await
        .or_db("Actor")?;
        Ok(row.into())
    }

    async fn is_cast(&self, id: i32) -> CoreResult<bool> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM movie_cast WHERE actor = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .or_db("Actor")
    }

    async fn delete(&self, id: i32) -> CoreResult<()> {
        let result = sqlx::query("DELETE FROM actors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .or_db("Actor")?;
        expect_rows(result.rows_affected(), "Actor")
    }
}

// ============================================================================
// Movie cast
// ============================================================================

pub struct StoreMovieCastRepository {
    pool: PgPool,
}

impl StoreMovieCastRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct MovieCastRow {
    movie: i32,
    actor: i32,
    movie_title: String,
    actor_first_name: String,
    actor_last_name: String,
}

impl From<MovieCastRow> for MovieCast {
    fn from(row: MovieCastRow) -> Self {
        MovieCast {
            movie: row.movie,
            actor: row.actor,
            movie_title: row.movie_title,
            actor_first_name: row.actor_first_name,
            actor_last_name: row.actor_last_name,
        }
    }
}

const SELECT_CAST: &str = r#"
    SELECT mc.movie, mc.actor, m.title AS movie_title,
           a.first_name AS actor_first_name, a.last_name AS actor_last_name
    FROM movie_cast mc
    JOIN movies m ON m.id = mc.movie
    JOIN actors a ON a.id = mc.actor
"#;

#[async_trait]
impl MovieCastRepository for StoreMovieCastRepository {
    async fn list(&self) -> CoreResult<Vec<MovieCast>> {
        let rows = sqlx::query_as::<_, MovieCastRow>(&format!("{} ORDER BY mc.movie, mc.actor", SELECT_CAST))
            .fetch_all(&self.pool)
            .await
            .or_db("Movie cast")?;
        Ok(rows.into_iter().map(MovieCast::from).collect())
    }

    async fn list_by_movie(&self, movie_id: i32) -> CoreResult<Vec<MovieCast>> {
        let rows = sqlx::query_as::<_, MovieCastRow>(&format!(
            "{} WHERE mc.movie = $1 ORDER BY a.last_name, a.first_name",
            SELECT_CAST
        ))
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await
        .or_db("Movie cast")?;
        Ok(rows.into_iter().map(MovieCast::from).collect())
    }

    async fn find(&self, movie_id: i32, actor_id: i32) -> CoreResult<Option<MovieCast>> {
        let row = sqlx::query_as::<_, MovieCastRow>(&format!(
            "{} WHERE mc.movie = $1 AND mc.actor = $2",
            SELECT_CAST
        ))
        .bind(movie_id)
        .bind(actor_id)
        .fetch_optional(&self.pool)
        .await
        .or_db("Movie cast")?;
        Ok(row.map(MovieCast::from))
    }

    async fn create(&self, link: &MovieCastInput) -> CoreResult<MovieCast> {
        sqlx::query("INSERT INTO movie_cast (movie, actor) VALUES ($1, $2)")
            .bind(link.movie)
            .bind(link.actor)
            .execute(&self.pool)
            .await
            .or_db("Movie cast")?;

        self.find(link.movie, link.actor)
            .await?
            .ok_or_else(|| CoreError::not_found("Movie cast"))
    }

    async fn delete(&self, movie_id: i32, actor_id: i32) -> CoreResult<()> {
        let result = sqlx::query("DELETE FROM movie_cast WHERE movie = $1 AND actor = $2")
            .bind(movie_id)
            .bind(actor_id)
            .execute(&self.pool)
            .await
            .or_db("Movie cast")?;
        expect_rows(result.rows_affected(), "Movie cast")
    }
}
