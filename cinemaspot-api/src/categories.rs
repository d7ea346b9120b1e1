use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use cinemaspot_core::catalog::{Category, CategoryInput};
use cinemaspot_core::validation::validate;

use crate::error::{ApiJson, ApiPath, AppError};
use crate::middleware::admin;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).merge(admin(post(create_category), state)))
        .route(
            "/{id}",
            get(get_category).merge(admin(put(update_category).delete(delete_category), state)),
        )
}

/// GET /api/categories
async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(state.categories.list().await?))
}

/// GET /api/categories/{id}
async fn get_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Category>, AppError> {
    let category = state
        .categories
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Category not found".into()))?;
    Ok(Json(category))
}

/// POST /api/categories
async fn create_category(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CategoryInput>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    validate(&req)?;
    Ok((StatusCode::CREATED, Json(state.categories.create(&req).await?)))
}

/// PUT /api/categories/{id}
async fn update_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(req): ApiJson<CategoryInput>,
) -> Result<Json<Category>, AppError> {
    validate(&req)?;
    Ok(Json(state.categories.update(id, &req).await?))
}

/// DELETE /api/categories/{id}
async fn delete_category(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, AppError> {
    state.categories.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
