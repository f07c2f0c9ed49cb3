use crate::error::AppError;
use config::{Config as Cfg, File};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// HTTP server settings shared by every service.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        Self::load_from("configuration")
    }

    /// Loads `.env`, then the optional config file `name`, then `APP__*` variables.
    pub fn load_from(name: &str) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name(name).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Listen on all interfaces. Port 0 lets the OS pick one.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_falls_back_to_default_port() {
        let config = Config::load_from("does-not-exist").unwrap();
        // APP__PORT may be set in the environment running the tests.
        if std::env::var("APP__PORT").is_err() {
            assert_eq!(config.port, 8080);
        }
    }

    #[test]
    fn test_bind_addr_uses_unspecified_host() {
        let config = Config { port: 0 };
        let addr = config.bind_addr();
        assert!(addr.ip().is_unspecified());
        assert_eq!(addr.port(), 0);
    }
}
