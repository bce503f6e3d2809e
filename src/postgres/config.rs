use lazy_static::lazy_static;
use postgres::{Client, NoTls};
use regex::Regex;
use serde::Deserialize;

use crate::error::SqlShimError;

lazy_static! {
    static ref HOST_AND_SOCKET: Regex = Regex::new("^(.+):(.+)$").expect("valid regex");
}

/// Connection settings for the Postgres backend.
///
/// `host` may encode a Unix socket path after a colon (`"ignored:/run/postgresql"`);
/// when a socket is present it is used instead of the host name. The session
/// is forced to UTF-8 encoding.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionSettings {
    pub dbname: String,
    pub user: String,
    pub password: String,
    /// Host name, or `host:/path/to/socket` to select a Unix socket.
    pub host: String,
    /// Defaults to 5432 when unset.
    #[serde(default)]
    pub port: Option<u16>,
}

impl ConnectionSettings {
    #[must_use]
    pub fn new(
        dbname: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            dbname: dbname.into(),
            user: user.into(),
            password: password.into(),
            host: host.into(),
            port: None,
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Split the host string into a host name and an optional socket path.
    pub(crate) fn split_host_and_socket(&self) -> (&str, Option<&str>) {
        match HOST_AND_SOCKET.captures(&self.host) {
            Some(caps) => {
                let host = caps.get(1).map_or("", |m| m.as_str());
                let socket = caps.get(2).map_or("", |m| m.as_str());
                (host, Some(socket))
            }
            None => (self.host.as_str(), None),
        }
    }
}

/// Open a blocking client from the settings.
///
/// Missing required fields are a `ConfigError`; driver failures during the
/// handshake propagate untouched.
pub(crate) fn connect(settings: &ConnectionSettings) -> Result<Client, SqlShimError> {
    if settings.dbname.is_empty() {
        return Err(SqlShimError::ConfigError("dbname is required".to_string()));
    }
    if settings.user.is_empty() {
        return Err(SqlShimError::ConfigError("user is required".to_string()));
    }
    if settings.host.is_empty() {
        return Err(SqlShimError::ConfigError("host is required".to_string()));
    }

    let mut config = postgres::Config::new();
    config
        .dbname(&settings.dbname)
        .user(&settings.user)
        .password(&settings.password)
        .port(settings.port.unwrap_or(5432))
        .options("-c client_encoding=UTF8");

    // Host and socket are mutually exclusive; the driver treats a leading
    // `/` as a Unix socket directory.
    let (host, socket) = settings.split_host_and_socket();
    match socket {
        Some(path) => config.host(path),
        None => config.host(host),
    };

    Ok(config.connect(NoTls)?)
}
