//! Database error types.

/// Database operation errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Database connection pool error.
    #[error(transparent)]
    R2D2(#[from] diesel::r2d2::PoolError),

    /// Diesel ORM operation error.
    #[error(transparent)]
    Diesel(#[from] diesel::result::Error),

    /// The blocking task running a query panicked or was cancelled.
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),

    /// A configured table or column name was rejected.
    #[error(transparent)]
    Config(#[from] warden_config::error::Error),

    /// Find-or-create kept losing races against concurrent deletes.
    #[error("Couldn't find or create '{name}' in {table}")]
    FindOrCreateConflict {
        /// Table the row was looked up in.
        table: String,
        /// Name that was looked up.
        name: String,
    },
}

impl From<Error> for warden::Error {
    fn from(value: Error) -> Self {
        warden::Error::store(value)
    }
}
