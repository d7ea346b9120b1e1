use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use cinemaspot_core::identity::{CreateUser, NewUser, UpdateUser, User, USER_ROLE};
use cinemaspot_core::validation::{normalize_email, validate};
use uuid::Uuid;

use crate::auth::hash_blocking;
use crate::error::{ApiJson, ApiPath, AppError};
use crate::middleware::{admin, CurrentUser};
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", admin(get(list_users).post(create_user), state))
        .route(
            "/{id}",
            get(get_user).merge(admin(axum::routing::put(update_user).delete(delete_user), state)),
        )
}

/// GET /api/users
async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.users.list().await?))
}

/// GET /api/users/{id}
async fn get_user(
    State(state): State<AppState>,
    current: CurrentUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<User>, AppError> {
    current.ensure_self_or_admin(id)?;
    let user = state
        .users
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("User not found".into()))?;
    Ok(Json(user))
}

/// POST /api/users
async fn create_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    validate(&req)?;
    let email = normalize_email(req.email.expose());
    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::ConflictError("User already exists".into()));
    }

    let role = req
        .role
        .as_deref()
        .map(|r| r.trim().to_uppercase())
        .unwrap_or_else(|| USER_ROLE.to_string());
    let password_hash = hash_blocking(req.password.into_inner()).await?;

    let user = state
        .users
        .create(&NewUser {
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            email,
            password_hash,
            role,
            email_validated: req.email_validated,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// PUT /api/users/{id}
async fn update_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateUser>,
) -> Result<Json<User>, AppError> {
    validate(&req)?;
    let current = state
        .users
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("User not found".into()))?;

    let updated = req.apply(current);
    Ok(Json(state.users.update(&updated).await?))
}

/// DELETE /api/users/{id}
async fn delete_user(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<StatusCode, AppError> {
    state.users.delete(id).await?;
    tracing::info!(user_id = %id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
