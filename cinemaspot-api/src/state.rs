use std::sync::Arc;

use cinemaspot_core::email::EmailSender;
use cinemaspot_core::repository::{
    ActorRepository, CategoryRepository, FutureReleaseRepository, MovieCastRepository,
    MovieRepository, ReservationRepository, RoleRepository, RoomRepository, SeatRepository,
    ShowtimeRepository, UserRepository,
};
use cinemaspot_shared::models::events::ShowtimeEvent;
use cinemaspot_store::actor_repo::{StoreActorRepository, StoreMovieCastRepository};
use cinemaspot_store::app_config::{BusinessRules, Config};
use cinemaspot_store::category_repo::StoreCategoryRepository;
use cinemaspot_store::movie_repo::StoreMovieRepository;
use cinemaspot_store::release_repo::StoreFutureReleaseRepository;
use cinemaspot_store::reservation_repo::StoreReservationRepository;
use cinemaspot_store::showtime_repo::StoreShowtimeRepository;
use cinemaspot_store::user_repo::{StoreRoleRepository, StoreUserRepository};
use cinemaspot_store::venue_repo::{StoreRoomRepository, StoreSeatRepository};
use cinemaspot_store::DbClient;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub session_hours: i64,
    pub email_hours: i64,
    pub reset_hours: i64,
}

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub rooms: Arc<dyn RoomRepository>,
    pub seats: Arc<dyn SeatRepository>,
    pub movies: Arc<dyn MovieRepository>,
    pub showtimes: Arc<dyn ShowtimeRepository>,
    pub reservations: Arc<dyn ReservationRepository>,
    pub actors: Arc<dyn ActorRepository>,
    pub future_releases: Arc<dyn FutureReleaseRepository>,
    pub movie_cast: Arc<dyn MovieCastRepository>,
    pub email: Arc<dyn EmailSender>,
    pub sse_tx: broadcast::Sender<ShowtimeEvent>,
    pub auth: AuthConfig,
    /// Base URL for links sent by email.
    pub app_url: String,
    pub business_rules: BusinessRules,
}

impl AuthConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            secret: config.auth.jwt_secret.clone(),
            session_hours: config.auth.session_token_hours,
            email_hours: config.auth.email_token_hours,
            reset_hours: config.auth.reset_token_hours,
        }
    }
}

impl AppState {
    /// Wires every repository to the Postgres pool.
    pub fn postgres(
        db: &DbClient,
        config: &Config,
        email: Arc<dyn EmailSender>,
        sse_tx: broadcast::Sender<ShowtimeEvent>,
    ) -> Self {
        let pool = db.pool.clone();
        Self {
            users: Arc::new(StoreUserRepository::new(pool.clone())),
            roles: Arc::new(StoreRoleRepository::new(pool.clone())),
            categories: Arc::new(StoreCategoryRepository::new(pool.clone())),
            rooms: Arc::new(StoreRoomRepository::new(pool.clone())),
            seats: Arc::new(StoreSeatRepository::new(pool.clone())),
            movies: Arc::new(StoreMovieRepository::new(pool.clone())),
            showtimes: Arc::new(StoreShowtimeRepository::new(pool.clone())),
            reservations: Arc::new(StoreReservationRepository::new(pool.clone())),
            actors: Arc::new(StoreActorRepository::new(pool.clone())),
            future_releases: Arc::new(StoreFutureReleaseRepository::new(pool.clone())),
            movie_cast: Arc::new(StoreMovieCastRepository::new(pool)),
            email,
            sse_tx,
            auth: AuthConfig::from_config(config),
            app_url: config.server.app_url.trim_end_matches('/').to_string(),
            business_rules: config.business_rules.clone(),
        }
    }
}
