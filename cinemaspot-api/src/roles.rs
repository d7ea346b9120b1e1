use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use cinemaspot_core::identity::{AssignRole, Role, RoleInput, User};
use cinemaspot_core::validation::validate;

use crate::error::{ApiJson, ApiPath, AppError};
use crate::middleware::admin;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", admin(get(list_roles).post(create_role), state))
        .route("/assign-role", admin(post(assign_role), state))
        .route(
            "/{id}",
            get(get_role).merge(admin(put(update_role).delete(delete_role), state)),
        )
}

/// POST /api/roles/assign-role
async fn assign_role(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AssignRole>,
) -> Result<Json<User>, AppError> {
    validate(&req)?;
    let role = state
        .roles
        .find_by_name(&req.role.trim().to_uppercase())
        .await?
        .ok_or_else(|| AppError::NotFoundError("Role not found".into()))?;

    let user = state.users.assign_role(req.user_id, role.id).await?;
    tracing::info!(user_id = %user.id, role = %role.name, "Role assigned");
    Ok(Json(user))
}

/// GET /api/roles
async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<Role>>, AppError> {
    Ok(Json(state.roles.list().await?))
}

/// GET /api/roles/{id}
async fn get_role(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Role>, AppError> {
    let role = state
        .roles
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Role not found".into()))?;
    Ok(Json(role))
}

/// POST /api/roles
async fn create_role(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RoleInput>,
) -> Result<(StatusCode, Json<Role>), AppError> {
    validate(&req)?;
    Ok((StatusCode::CREATED, Json(state.roles.create(&req).await?)))
}

/// PUT /api/roles/{id}
async fn update_role(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(req): ApiJson<RoleInput>,
) -> Result<Json<Role>, AppError> {
    validate(&req)?;
    Ok(Json(state.roles.update(id, &req).await?))
}

/// DELETE /api/roles/{id}
async fn delete_role(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, AppError> {
    state.roles.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
