//! Configuration error types.

/// Configuration errors.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error(transparent)]
    IO(#[from] std::io::Error),

    /// TOML deserialization failed.
    #[error(transparent)]
    Deserialization(#[from] toml::de::Error),

    /// A configured table name is not a usable SQL identifier.
    #[error("Invalid identifier '{0}'")]
    InvalidIdentifier(String),

    /// A required environment variable is not set.
    #[error("Env Variable '{0}' missing")]
    MissingEnv(String),
}
