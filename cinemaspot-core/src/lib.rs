pub mod catalog;
pub mod venue;
pub mod screening;
pub mod booking;
pub mod identity;
pub mod password;
pub mod email;
pub mod repository;
pub mod validation;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("Internal service error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(what: &str) -> Self {
        CoreError::NotFound(format!("{} not found", what))
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
