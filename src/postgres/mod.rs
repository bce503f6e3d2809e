//! PostgreSQL backend built on the blocking `postgres` client.

pub(crate) mod config;
pub(crate) mod executor;
pub(crate) mod params;
pub(crate) mod positional;

pub use config::ConnectionSettings;
