use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;

        // No fallback secret: a missing key is a startup failure.
        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .context("JWT_SECRET must be set to a non-empty value")?;

        let ttl_minutes = match lookup("JWT_TTL_MINUTES") {
            Some(v) => v
                .parse::<i64>()
                .with_context(|| format!("JWT_TTL_MINUTES is not an integer: {v}"))?,
            None => 30,
        };
        anyhow::ensure!(ttl_minutes > 0, "JWT_TTL_MINUTES must be positive");

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v
                .parse::<u32>()
                .with_context(|| format!("DATABASE_MAX_CONNECTIONS is not an integer: {v}"))?,
            None => 10,
        };

        let port = match lookup("APP_PORT") {
            Some(v) => v
                .parse::<u16>()
                .with_context(|| format!("APP_PORT is not a valid port: {v}"))?,
            None => 8080,
        };

        let jwt = JwtConfig {
            secret,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "physiotrack".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "physiotrack-users".into()),
            ttl_minutes,
        };
        Ok(Self {
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            database_url,
            max_connections,
            jwt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_optional_vars_missing() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/physio"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .expect("config should load");
        assert_eq!(cfg.jwt.ttl_minutes, 30);
        assert_eq!(cfg.jwt.issuer, "physiotrack");
        assert_eq!(cfg.jwt.audience, "physiotrack-users");
        assert_eq!(cfg.max_connections, 10);
        assert_eq!((cfg.host.as_str(), cfg.port), ("0.0.0.0", 8080));
    }

    #[test]
    fn listen_address_comes_from_config() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/physio"),
            ("JWT_SECRET", "s3cret"),
            ("APP_HOST", "127.0.0.1"),
            ("APP_PORT", "9090"),
        ]))
        .unwrap();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 9090);

        let bad_port = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/physio"),
            ("JWT_SECRET", "s3cret"),
            ("APP_PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(bad_port.to_string().contains("APP_PORT"));
    }

    #[test]
    fn missing_secret_fails_fast() {
        let err = AppConfig::from_lookup(lookup_from(&[(
            "DATABASE_URL",
            "postgres://localhost/physio",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn blank_secret_is_rejected() {
        let err = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/physio"),
            ("JWT_SECRET", "   "),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn ttl_must_be_positive_integer() {
        let bad = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/physio"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_TTL_MINUTES", "0"),
        ]));
        assert!(bad.is_err());

        let garbage = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/physio"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_TTL_MINUTES", "half-an-hour"),
        ]));
        assert!(garbage.is_err());

        let ok = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/physio"),
            ("JWT_SECRET", "s3cret"),
            ("JWT_TTL_MINUTES", "45"),
        ]))
        .unwrap();
        assert_eq!(ok.jwt.ttl_minutes, 45);
    }

    #[test]
    fn missing_database_url_fails() {
        let err = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "s3cret")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }
}
