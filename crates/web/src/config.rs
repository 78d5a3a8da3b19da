use anyhow::{Context, Result};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub api_keys: String,
}

impl Config {
    /// Only DATABASE_URL is required. HOST/PORT fall back to
    /// 0.0.0.0:8080; empty API_KEYS leaves every mutating route locked.
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT must be a number")?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port,
            database_url: std::env::var("DATABASE_URL")
                .context("Cannot load DATABASE_URL env variable")?,
            api_keys: std::env::var("API_KEYS").unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_host_and_port() {
        // SAFETY: no other test in this binary touches these variables.
        unsafe {
            std::env::remove_var("HOST");
            std::env::remove_var("PORT");
            std::env::remove_var("API_KEYS");
            std::env::set_var("DATABASE_URL", "sqlite::memory:");
        }

        let config = Config::from_env().unwrap();

        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.database_url, "sqlite::memory:");
        assert!(config.api_keys.is_empty());
    }
}
