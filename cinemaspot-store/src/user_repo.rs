use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cinemaspot_core::identity::{NewUser, Role, RoleInput, User, UserRecord};
use cinemaspot_core::repository::{RoleRepository, UserRepository};
use cinemaspot_core::{CoreError, CoreResult};
use cinemaspot_shared::Masked;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{expect_rows, DbResultExt};

// ============================================================================
// Users
// ============================================================================

pub struct StoreUserRepository {
    pool: PgPool,
}

impl StoreUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    role_name: String,
    email_validated: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_record(self) -> UserRecord {
        UserRecord {
            password_hash: Masked(self.password),
            user: User {
                id: self.id,
                first_name: self.first_name,
                last_name: self.last_name,
                email: self.email,
                role: self.role_name,
                email_validated: self.email_validated,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
        }
    }

    fn into_user(self) -> User {
        self.into_record().user
    }
}

const SELECT_USER: &str = r#"
    SELECT u.id, u.first_name, u.last_name, u.email, u.password,
           r.name AS role_name, u.email_validated, u.created_at, u.updated_at
    FROM users u
    JOIN roles r ON r.id = u.role
"#;

impl StoreUserRepository {
    async fn fetch(&self, id: Uuid) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE u.id = $1", SELECT_USER))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .or_db("User")?;
        Ok(row.map(UserRow::into_user))
    }

    async fn fetch_existing(&self, id: Uuid) -> CoreResult<User> {
        self.fetch(id).await?.ok_or_else(|| CoreError::not_found("User"))
    }
}

#[async_trait]
impl UserRepository for StoreUserRepository {
    async fn list(&self) -> CoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!("{} ORDER BY u.created_at", SELECT_USER))
            .fetch_all(&self.pool)
            .await
            .or_db("User")?;
        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    async fn find(&self, id: Uuid) -> CoreResult<Option<User>> {
        self.fetch(id).await
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{} WHERE u.email = $1", SELECT_USER))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .or_db("User")?;
        Ok(row.map(UserRow::into_record))
    }

    async fn create(&self, user: &NewUser) -> CoreResult<User> {
        let role_id: Option<i32> = sqlx::query_scalar("SELECT id FROM roles WHERE name = $1")
            .bind(&user.role)
            .fetch_optional(&self.pool)
            .await
            .or_db("Role")?;
        let role_id = role_id.ok_or_else(|| CoreError::not_found("Role"))?;

        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO users (id, first_name, last_name, email, password, role, email_validated)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(role_id)
        .bind(user.email_validated)
        .execute(&self.pool)
        .await
        .or_db("User")?;

        tracing::info!(user_id = %id, role = %user.role, "User created");
        self.fetch_existing(id).await
    }

    async fn update(&self, user: &User) -> CoreResult<User> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, email = $4, email_validated = $5, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(user.email_validated)
        .execute(&self.pool)
        .await
        .or_db("User")?;
        expect_rows(result.rows_affected(), "User")?;

        self.fetch_existing(user.id).await
    }

    async fn mark_email_validated(&self, email: &str) -> CoreResult<()> {
        let result = sqlx::query(
            "UPDATE users SET email_validated = TRUE, updated_at = NOW() WHERE email = $1",
        )
        .bind(email)
        .execute(&self.pool)
        .await
        .or_db("User")?;
        expect_rows(result.rows_affected(), "User")
    }

    async fn update_password(&self, email: &str, password_hash: &str) -> CoreResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password = $2, updated_at = NOW() WHERE email = $1",
        )
        .bind(email)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .or_db("User")?;
        expect_rows(result.rows_affected(), "User")
    }

    async fn assign_role(&self, user_id: Uuid, role_id: i32) -> CoreResult<User> {
        let result = sqlx::query("UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(role_id)
            .execute(&self.pool)
            .await
            .or_db("User")?;
        expect_rows(result.rows_affected(), "User")?;

        self.fetch_existing(user_id).await
    }

    async fn delete(&self, id: Uuid) -> CoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .or_db("User")?;
        expect_rows(result.rows_affected(), "User")
    }
}

// ============================================================================
// Roles
// ============================================================================

pub struct StoreRoleRepository {
    pool: PgPool,
}

impl StoreRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RoleRow {
    id: i32,
    name: String,
    description: Option<String>,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Role { id: row.id, name: row.name, description: row.description }
    }
}

#[async_trait]
impl RoleRepository for StoreRoleRepository {
    async fn list(&self) -> CoreResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>("SELECT id, name, description FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .or_db("Role")?;
        Ok(rows.into_iter().map(Role::from).collect())
    }

    async fn find(&self, id: i32) -> CoreResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>("SELECT id, name, description FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .or_db("Role")?;
        Ok(row.map(Role::from))
    }

    async fn find_by_name(&self, name: &str) -> CoreResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>("SELECT id, name, description FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .or_db("Role")?;
        Ok(row.map(Role::from))
    }

    async fn create(&self, role: &RoleInput) -> CoreResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            "INSERT INTO roles (name, description) VALUES ($1, $2) RETURNING id, name, description",
        )
        .bind(role.normalized_name())
        .bind(&role.description)
        .fetch_one(&self.pool)
        .await
        .or_db("Role")?;
        Ok(row.into())
    }

    async fn update(&self, id: i32, role: &RoleInput) -> CoreResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(
            r#"
            UPDATE roles SET name = $2, description = $3
            WHERE id = $1
            RETURNING id, name, description
            "#,
        )
        .bind(id)
        .bind(role.normalized_name())
        .bind(&role.description)
        .fetch_one(&self.pool)
        .await
        .or_db("Role")?;
        Ok(row.into())
    }

    async fn delete(&self, id: i32) -> CoreResult<()> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .or_db("Role")?;
        expect_rows(result.rows_affected(), "Role")
    }
}
