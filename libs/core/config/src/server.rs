use crate::{env_or_default, env_parse_or, ConfigError, FromEnv};
use std::net::Ipv4Addr;
use std::time::Duration;

/// HTTP listener settings.
///
/// - `HOST` (0.0.0.0), `PORT` (8080)
/// - `SHUTDOWN_TIMEOUT_SECS` (30): budget for cleanup after SIGINT/SIGTERM
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// `host:port`, as accepted by `TcpListener::bind`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

impl FromEnv for ServerConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: env_or_default("HOST", &defaults.host),
            port: env_parse_or("PORT", defaults.port)?,
            shutdown_timeout_secs: env_parse_or(
                "SHUTDOWN_TIMEOUT_SECS",
                defaults.shutdown_timeout_secs,
            )?,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::UNSPECIFIED.to_string(),
            port: 8080,
            shutdown_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unset_all<F: FnOnce()>(f: F) {
        temp_env::with_vars(
            [
                ("HOST", None::<&str>),
                ("PORT", None),
                ("SHUTDOWN_TIMEOUT_SECS", None),
            ],
            f,
        );
    }

    #[test]
    fn test_server_config_defaults() {
        unset_all(|| {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config, ServerConfig::default());
            assert_eq!(config.address(), "0.0.0.0:8080");
            assert_eq!(config.shutdown_timeout(), Duration::from_secs(30));
        });
    }

    #[test]
    fn test_server_config_overrides() {
        unset_all(|| {
            temp_env::with_vars(
                [("PORT", Some("3000")), ("SHUTDOWN_TIMEOUT_SECS", Some("5"))],
                || {
                    let config = ServerConfig::from_env().unwrap();
                    assert_eq!(config.address(), "0.0.0.0:3000");
                    assert_eq!(config.shutdown_timeout_secs, 5);
                },
            );
        });
    }

    #[test]
    fn test_server_config_rejects_bad_port() {
        for raw in ["not_a_number", "99999"] {
            temp_env::with_var("PORT", Some(raw), || {
                let err = ServerConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("PORT"));
            });
        }
    }

    #[test]
    fn test_server_config_new_keeps_default_timeout() {
        let config = ServerConfig::new("127.0.0.1", 9000);
        assert_eq!(config.address(), "127.0.0.1:9000");
        assert_eq!(config.shutdown_timeout_secs, 30);
    }
}
