//! Process configuration.
//!
//! A single required value, the MongoDB connection string, read from the
//! `MONGOURI` environment variable. A `.env` file in the working directory is
//! loaded first if one exists; variables already set in the environment win.

use std::net::SocketAddr;

use tracing::debug;

use crate::error::Error;

/// Environment variable holding the MongoDB connection string.
pub const MONGO_URI_VAR: &str = "MONGOURI";

/// Database every collection handle is scoped to.
pub const DATABASE_NAME: &str = "go-mux-mongo";

/// Collection holding user documents.
pub const USERS_COLLECTION: &str = "users";

/// Fixed listen address.
pub const LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_uri: String,
    pub listen_addr: SocketAddr,
}

impl Config {
    /// Reads `.env` (if present) and then the process environment.
    pub fn load() -> Result<Self, Error> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "loaded environment file"),
            Err(e) if e.not_found() => debug!("no .env file, using process environment"),
            Err(e) => return Err(Error::Config(format!("reading .env: {e}"))),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mongo_uri = lookup(MONGO_URI_VAR)
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::Config(format!("{MONGO_URI_VAR} is not set")))?;

        let listen_addr = LISTEN_ADDR
            .parse()
            .map_err(|e| Error::Config(format!("invalid listen address `{LISTEN_ADDR}`: {e}")))?;

        Ok(Self { mongo_uri, listen_addr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_uri_from_lookup() {
        let cfg = Config::from_lookup(|k| {
            (k == MONGO_URI_VAR).then(|| "mongodb://localhost:27017".to_owned())
        })
        .unwrap();
        assert_eq!(cfg.mongo_uri, "mongodb://localhost:27017");
        assert_eq!(cfg.listen_addr.port(), 8080);
    }

    #[test]
    fn missing_uri_is_an_error() {
        let err = Config::from_lookup(|_| None).unwrap_err();
        assert!(err.to_string().contains(MONGO_URI_VAR));
    }

    #[test]
    fn blank_uri_is_an_error() {
        assert!(Config::from_lookup(|_| Some("   ".to_owned())).is_err());
    }
}
