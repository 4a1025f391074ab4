use std::{env, fmt::Display, net::SocketAddr, str::FromStr};

use axum::http::HeaderName;
use encoding_rs::Encoding;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Text encoding applied to raw request bodies before JSON decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyEncoding(pub &'static Encoding);

impl Default for BodyEncoding {
    fn default() -> Self {
        BodyEncoding(encoding_rs::UTF_8)
    }
}

impl FromStr for BodyEncoding {
    type Err = String;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        Encoding::for_label(label.trim().as_bytes())
            .map(BodyEncoding)
            .ok_or_else(|| format!("unknown text encoding {label:?}"))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub identity_header: HeaderName,
    pub catalog_page_size: i64,
    pub category_max_depth: usize,
    pub body_encoding: BodyEncoding,
    pub run_migrations: bool,
    pub pool_max_size: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let config = Self {
            database_url,
            bind_addr: try_load(&lookup, "BIND_ADDR", "127.0.0.1:3000")?,
            identity_header: try_load(&lookup, "IDENTITY_HEADER", "x-user-id")?,
            catalog_page_size: try_load(&lookup, "CATALOG_PAGE_SIZE", "20")?,
            category_max_depth: try_load(&lookup, "CATEGORY_MAX_DEPTH", "32")?,
            body_encoding: try_load(&lookup, "BODY_ENCODING", "utf-8")?,
            run_migrations: try_load(&lookup, "RUN_MIGRATIONS", "true")?,
            pool_max_size: try_load(&lookup, "POOL_MAX_SIZE", "16")?,
        };

        if config.catalog_page_size < 1 {
            return Err(ConfigError::Invalid {
                key: "CATALOG_PAGE_SIZE",
                value: config.catalog_page_size.to_string(),
                reason: "must be positive".to_owned(),
            });
        }
        if config.category_max_depth < 1 {
            return Err(ConfigError::Invalid {
                key: "CATEGORY_MAX_DEPTH",
                value: config.category_max_depth.to_string(),
                reason: "must be at least 1".to_owned(),
            });
        }

        Ok(config)
    }
}

fn try_load<T, F>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_owned()
    });

    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/shop")]).unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.identity_header.as_str(), "x-user-id");
        assert_eq!(config.catalog_page_size, 20);
        assert_eq!(config.category_max_depth, 32);
        assert_eq!(config.body_encoding, BodyEncoding(encoding_rs::UTF_8));
        assert!(config.run_migrations);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        assert!(matches!(
            load(&[]),
            Err(ConfigError::Missing("DATABASE_URL"))
        ));
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("BODY_ENCODING", "klingon-8"),
        ])
        .unwrap_err();

        assert!(matches!(err, ConfigError::Invalid { key: "BODY_ENCODING", .. }));
    }

    #[test]
    fn encoding_labels_are_resolved() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("BODY_ENCODING", "windows-1251"),
        ])
        .unwrap();

        assert_eq!(config.body_encoding.0, encoding_rs::WINDOWS_1251);
    }

    #[test]
    fn non_positive_page_size_is_rejected() {
        assert!(
            load(&[
                ("DATABASE_URL", "postgres://localhost/shop"),
                ("CATALOG_PAGE_SIZE", "0"),
            ])
            .is_err()
        );
    }

    #[test]
    fn zero_category_depth_is_rejected() {
        assert!(matches!(
            load(&[
                ("DATABASE_URL", "postgres://localhost/shop"),
                ("CATEGORY_MAX_DEPTH", "0"),
            ]),
            Err(ConfigError::Invalid {
                key: "CATEGORY_MAX_DEPTH",
                ..
            })
        ));
    }
}
