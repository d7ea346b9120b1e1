use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use cinemaspot_core::catalog::{Actor, ActorSearch, CreateActor, UpdateActor};
use cinemaspot_core::validation::validate;

use crate::error::{ApiJson, ApiPath, ApiQuery, AppError};
use crate::middleware::admin;
use crate::state::AppState;

/// Every actor route is admin-only.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", admin(get(list_actors).post(create_actor), state))
        .route("/search", admin(get(search_actors), state))
        .route("/{id}", admin(get(get_actor).put(update_actor).delete(delete_actor), state))
}

/// GET /api/actors
async fn list_actors(State(state): State<AppState>) -> Result<Json<Vec<Actor>>, AppError> {
    Ok(Json(state.actors.list().await?))
}

/// GET /api/actors/search?q=term
async fn search_actors(
    State(state): State<AppState>,
    ApiQuery(search): ApiQuery<ActorSearch>,
) -> Result<Json<Vec<Actor>>, AppError> {
    let term = search.q.trim();
    if term.is_empty() {
        return Err(AppError::ValidationError("Search term is required".into()));
    }
    Ok(Json(state.actors.search(term).await?))
}

/// GET /api/actors/{id}
async fn get_actor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Actor>, AppError> {
    let actor = state
        .actors
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Actor not found".into()))?;
    Ok(Json(actor))
}

/// POST /api/actors
async fn create_actor(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateActor>,
) -> Result<(StatusCode, Json<Actor>), AppError> {
    validate(&req)?;
    let actor = state.actors.create(&req).await?;
    tracing::info!(actor_id = actor.id, "Actor created");
    Ok((StatusCode::CREATED, Json(actor)))
}

/// PUT /api/actors/{id}
async fn update_actor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(req): ApiJson<UpdateActor>,
) -> Result<Json<Actor>, AppError> {
    validate(&req)?;
    let current = state
        .actors
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Actor not found".into()))?;

    Ok(Json(state.actors.update(&req.apply(current)).await?))
}

/// DELETE /api/actors/{id}
async fn delete_actor(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<StatusCode, AppError> {
    if state.actors.is_cast(id).await? {
        return Err(AppError::ValidationError(
            "Actor is part of a movie cast and cannot be deleted".into(),
        ));
    }
    state.actors.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
