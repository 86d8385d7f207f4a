//! Connection pooling.

pub mod connection;
