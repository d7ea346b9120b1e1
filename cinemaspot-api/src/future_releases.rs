use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use cinemaspot_core::catalog::{FutureRelease, FutureReleaseInput};
use cinemaspot_core::validation::validate;

use crate::error::{ApiJson, ApiPath, AppError};
use crate::middleware::admin;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_releases).merge(admin(post(create_release), state)))
        .route(
            "/{id}",
            get(get_release).merge(admin(put(update_release).delete(delete_release), state)),
        )
}

async fn ensure_category(state: &AppState, category: i32) -> Result<(), AppError> {
    match state.categories.find(category).await? {
        Some(_) => Ok(()),
        None => Err(AppError::NotFoundError("Category not found".into())),
    }
}

/// GET /api/future-releases
async fn list_releases(
    State(state): State<AppState>,
) -> Result<Json<Vec<FutureRelease>>, AppError> {
    Ok(Json(state.future_releases.list().await?))
}

/// GET /api/future-releases/{id}
async fn get_release(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<FutureRelease>, AppError> {
    let release = state
        .future_releases
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Future release not found".into()))?;
    Ok(Json(release))
}

/// POST /api/future-releases
async fn create_release(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<FutureReleaseInput>,
) -> Result<(StatusCode, Json<FutureRelease>), AppError> {
    validate(&req)?;
    ensure_category(&state, req.category).await?;
    Ok((StatusCode::CREATED, Json(state.future_releases.create(&req).await?)))
}

/// PUT /api/future-releases/{id}
async fn update_release(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(req): ApiJson<FutureReleaseInput>,
) -> Result<Json<FutureRelease>, AppError> {
    validate(&req)?;
    ensure_category(&state, req.category).await?;
    Ok(Json(state.future_releases.update(id, &req).await?))
}

/// DELETE /api/future-releases/{id}
async fn delete_release(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, AppError> {
    state.future_releases.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
