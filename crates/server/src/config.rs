use std::env;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} is not a valid value: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Credentials for the IGDB API (issued through a Twitch developer app).
#[derive(Clone, Debug)]
pub struct IgdbConfig {
    pub client_id: String,
    pub client_secret: String,
    pub base_url: String,
    pub token_url: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    /// `None` disables metadata lookups; games can still be added by hand.
    pub igdb: Option<IgdbConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let igdb = match (lookup("IGDB_CLIENT_ID"), lookup("IGDB_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret))
                if !client_id.is_empty() && !client_secret.is_empty() =>
            {
                Some(IgdbConfig {
                    client_id,
                    client_secret,
                    base_url: lookup("IGDB_BASE_URL")
                        .unwrap_or_else(|| "https://api.igdb.com/v4".to_string()),
                    token_url: lookup("TWITCH_TOKEN_URL")
                        .unwrap_or_else(|| "https://id.twitch.tv/oauth2/token".to_string()),
                })
            }
            _ => None,
        };

        Ok(Self {
            database_url,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8000)?,
            igdb,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&'static str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<&str, String> = pairs.iter().map(|(k, v)| (*k, v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/checkpoint")]).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.db_max_connections, 10);
        assert!(config.igdb.is_none());
    }

    #[test]
    fn test_missing_database_url() {
        assert!(matches!(config_from(&[]), Err(ConfigError::Missing("DATABASE_URL"))));
    }

    #[test]
    fn test_invalid_port() {
        let err = config_from(&[("DATABASE_URL", "postgres://x"), ("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn test_igdb_needs_both_credentials() {
        let config = config_from(&[("DATABASE_URL", "postgres://x"), ("IGDB_CLIENT_ID", "abc")]).unwrap();
        assert!(config.igdb.is_none());

        let config = config_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("IGDB_CLIENT_ID", "abc"),
            ("IGDB_CLIENT_SECRET", "shh"),
        ])
        .unwrap();
        let igdb = config.igdb.unwrap();
        assert_eq!(igdb.base_url, "https://api.igdb.com/v4");
        assert_eq!(igdb.client_id, "abc");
    }
}
