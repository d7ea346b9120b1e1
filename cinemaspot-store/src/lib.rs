pub mod app_config;
pub mod database;
pub mod error;
pub mod email;
pub mod seed;

pub mod user_repo;
pub mod category_repo;
pub mod venue_repo;
pub mod movie_repo;
pub mod release_repo;
pub mod actor_repo;
pub mod showtime_repo;
pub mod reservation_repo;

pub use app_config::Config;
pub use database::DbClient;
pub use email::{email_sender, LogEmailSender, ResendEmailSender};
