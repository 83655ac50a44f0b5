use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use http::HeaderValue;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://duties.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub api_path: String,
    pub database_url: String,
    pub max_connections: u32,
    pub client_origin: Option<HeaderValue>,
    pub seed: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            api_path: String::new(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 5,
            client_origin: None,
            seed: false,
        }
    }
}

impl Config {
    /// Loads `.env` (or `.env.test` when `APP_ENV=test`) and then reads the
    /// process environment.
    pub fn from_env() -> Result<Self> {
        let env_file = if std::env::var("APP_ENV").as_deref() == Ok("test") { ".env.test" } else { ".env" };
        load_env_file(Path::new(env_file))?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            host: parse_or(&lookup, "HOST", defaults.host)?,
            port: parse_or(&lookup, "PORT", defaults.port)?,
            api_path: lookup("API_PATH").unwrap_or(defaults.api_path),
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections)?,
            client_origin: parse_origin(lookup("CLIENT_URL"))?,
            seed: parse_or(&lookup, "DB_SEED", defaults.seed)?,
        })
    }

    pub fn addr(&self) -> SocketAddr { SocketAddr::new(self.host, self.port) }
}

/// A missing file is fine; a malformed one fails startup.
pub fn load_env_file(path: &Path) -> Result<()> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(err).with_context(|| format!("failed to load {}", path.display())),
    }
}

fn parse_origin(raw: Option<String>) -> Result<Option<HeaderValue>> {
    let Some(raw) = raw.filter(|v| !v.trim().is_empty()) else { return Ok(None) };
    let origin = raw.trim().trim_end_matches('/');
    if !(origin.starts_with("http://") || origin.starts_with("https://")) {
        bail!("invalid CLIENT_URL value {raw:?}: expected an http(s) origin");
    }
    let value = HeaderValue::from_str(origin).with_context(|| format!("invalid CLIENT_URL value {raw:?}"))?;
    Ok(Some(value))
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().with_context(|| format!("invalid {key} value {raw:?}")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.addr().to_string(), "127.0.0.1:3000");
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("API_PATH", "/api"),
            ("DATABASE_URL", "sqlite::memory:"),
            ("CLIENT_URL", "http://localhost:5173"),
            ("DB_SEED", "true"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.api_path, "/api");
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.client_origin, Some(HeaderValue::from_static("http://localhost:5173")));
        assert!(config.seed);
    }

    #[test]
    fn client_url_trailing_slash_is_dropped() {
        let config = Config::from_lookup(lookup(&[("CLIENT_URL", "https://duties.example/")])).unwrap();
        assert_eq!(config.client_origin, Some(HeaderValue::from_static("https://duties.example")));
    }

    #[test]
    fn malformed_client_url_names_the_key() {
        for raw in ["localhost:5173", "http://bad\norigin"] {
            let err = Config::from_lookup(lookup(&[("CLIENT_URL", raw)])).unwrap_err();
            assert!(err.to_string().contains("CLIENT_URL"), "{err}");
        }
    }

    #[test]
    fn missing_env_file_is_ignored() {
        let path = std::env::temp_dir().join(format!("duties-missing-{}.env", std::process::id()));
        assert!(load_env_file(&path).is_ok());
    }

    #[test]
    fn malformed_env_file_fails() {
        let path = std::env::temp_dir().join(format!("duties-malformed-{}.env", std::process::id()));
        std::fs::write(&path, "DUTIES_BROKEN_VALUE=\"unterminated\n").unwrap();
        let err = load_env_file(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(err.to_string().contains("failed to load"), "{err}");
    }

    #[test]
    fn malformed_port_names_the_key() {
        let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
