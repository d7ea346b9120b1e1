pub mod auth;

pub use auth::{require_admin, CurrentUser};

use axum::routing::MethodRouter;

use crate::state::AppState;

/// Puts a single method route behind `require_admin`.
pub fn admin(route: MethodRouter<AppState>, state: &AppState) -> MethodRouter<AppState> {
    route.route_layer(axum::middleware::from_fn_with_state(state.clone(), require_admin))
}
