use cinemaspot_core::CoreError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Maps a database failure onto the domain error the API understands.
/// `what` names the resource, as in "Seat" or "Movie".
pub fn db_error(what: &str, err: sqlx::Error) -> CoreError {
    match &err {
        sqlx::Error::RowNotFound => CoreError::not_found(what),
        sqlx::Error::Database(db) => match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => CoreError::Conflict(format!("{} already exists", what)),
            Some(FOREIGN_KEY_VIOLATION) => CoreError::Validation(format!(
                "{} references a record that does not exist or is still in use",
                what
            )),
            _ => internal(what, err),
        },
        _ => internal(what, err),
    }
}

fn internal(what: &str, err: sqlx::Error) -> CoreError {
    tracing::error!("Database error on {}: {:?}", what, err);
    CoreError::Internal(format!("database error on {}", what))
}

/// Shorthand for `map_err(|e| db_error(what, e))`.
pub(crate) trait DbResultExt<T> {
    fn or_db(self, what: &str) -> Result<T, CoreError>;
}

impl<T> DbResultExt<T> for Result<T, sqlx::Error> {
    fn or_db(self, what: &str) -> Result<T, CoreError> {
        self.map_err(|e| db_error(what, e))
    }
}

/// `NotFound` when a write touched no rows.
pub(crate) fn expect_rows(affected: u64, what: &str) -> Result<(), CoreError> {
    if affected == 0 {
        return Err(CoreError::not_found(what));
    }
    Ok(())
}
