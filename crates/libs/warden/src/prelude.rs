//! Common types and utilities.

/// Authorization error type.
pub use crate::error::Error;

/// Authorization result type.
pub type Result<T> = core::result::Result<T, Error>;
