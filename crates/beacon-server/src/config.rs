//! Server configuration.
//!
//! Two layers, in priority order: compiled defaults, then environment
//! variables (`PORT`, `BEACON_HOST`, `BEACON_STATIC_DIR`). There is no
//! settings file — the server carries no persisted state of any kind.

use std::path::PathBuf;

use tracing::warn;

/// Listener and asset-serving configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Directory served as static assets for non-API paths.
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8080,
            static_dir: PathBuf::from("public"),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment over defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `host:port` string suitable for a TCP bind.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => match raw.parse::<u16>() {
                Ok(port) => port,
                Err(_) => {
                    warn!(value = %raw, "ignoring unparseable PORT, using default");
                    defaults.port
                }
            },
            None => defaults.port,
        };

        Self {
            host: lookup("BEACON_HOST").unwrap_or(defaults.host),
            port,
            static_dir: lookup("BEACON_STATIC_DIR")
                .map_or(defaults.static_dir, PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (*v).to_owned())
        }
    }

    #[test]
    fn defaults() {
        let config = ServerConfig::from_lookup(|_| None);
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn port_override() {
        let config = ServerConfig::from_lookup(lookup_from(&[("PORT", "9000")]));
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "0.0.0.0");
    }

    #[test]
    fn unparseable_port_falls_back_to_default() {
        let config = ServerConfig::from_lookup(lookup_from(&[("PORT", "not-a-port")]));
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn host_and_static_dir_overrides() {
        let config = ServerConfig::from_lookup(lookup_from(&[
            ("BEACON_HOST", "127.0.0.1"),
            ("BEACON_STATIC_DIR", "/srv/assets"),
        ]));
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.static_dir, PathBuf::from("/srv/assets"));
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }
}
