//! SQLite backend built on `rusqlite`.

pub(crate) mod config;
pub(crate) mod executor;
pub(crate) mod params;
