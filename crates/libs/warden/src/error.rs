//! Authorization error types.

/// Errors raised by the capabilities.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The entity lacks the permission a `check_permission_to` asked for.
    #[error("Unauthorized: missing permission '{permission}'")]
    Unauthorized {
        /// Name of the denied permission.
        permission: String,
    },

    /// Failure reported by the backing store, passed through untouched.
    #[error(transparent)]
    Store(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    /// Wrap a store failure.
    pub fn store(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Store(Box::new(err))
    }

    /// Whether this is the designed authorization failure.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}
