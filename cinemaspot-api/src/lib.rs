use axum::{http::Method, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod actors;
pub mod auth;
pub mod categories;
pub mod error;
pub mod future_releases;
pub mod middleware;
pub mod movie_cast;
pub mod movies;
pub mod reservations;
pub mod roles;
pub mod rooms;
pub mod seats;
pub mod showtimes;
pub mod state;
pub mod users;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let api = Router::new()
        .nest("/auth", auth::routes())
        .nest("/users", users::routes(&state))
        .nest("/roles", roles::routes(&state))
        .nest("/categories", categories::routes(&state))
        .nest("/rooms", rooms::routes(&state))
        .nest("/seats", seats::routes(&state))
        .nest("/movies", movies::routes(&state))
        .nest("/showtimes", showtimes::routes(&state))
        .nest("/reservations", reservations::routes(&state))
        .nest("/actors", actors::routes(&state))
        .nest("/future-releases", future_releases::routes(&state))
        .nest("/movie-cast", movie_cast::routes(&state));

    Router::new()
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
