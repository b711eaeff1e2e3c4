use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use tracing::info;

use crate::error::ConfigError;

pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

pub struct Config {
    pub port: u16,
    pub request_timeout: Duration,
    /// Sessions untouched for this long are evicted
    pub session_idle_timeout: Duration,
    pub menu_source: MenuSource,
}

/// Where the menu is loaded from
#[derive(Debug, Clone, PartialEq)]
pub enum MenuSource {
    Firestore(FirestoreConfig),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FirestoreConfig {
    pub base_url: String,
    pub project_id: String,
    pub database: String,
    pub collection: String,
    pub api_key: Option<String>,
    pub bearer_token: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, typically the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let menu_source = match lookup("MENU_FILE") {
            Some(path) => {
                info!("MENU_FILE set, serving menu from {path}");
                MenuSource::File(PathBuf::from(path))
            }
            None => MenuSource::Firestore(FirestoreConfig {
                base_url: try_load(&lookup, "FIRESTORE_BASE_URL", DEFAULT_FIRESTORE_BASE_URL)?,
                project_id: lookup("FIRESTORE_PROJECT_ID")
                    .ok_or(ConfigError::Missing("FIRESTORE_PROJECT_ID"))?,
                database: try_load(&lookup, "FIRESTORE_DATABASE", "(default)")?,
                collection: try_load(&lookup, "FIRESTORE_COLLECTION", "menu")?,
                api_key: lookup("FIRESTORE_API_KEY"),
                bearer_token: lookup("FIRESTORE_BEARER_TOKEN"),
            }),
        };

        Ok(Self {
            port: try_load(&lookup, "PORT", "8000")?,
            request_timeout: Duration::from_secs(try_load(&lookup, "REQUEST_TIMEOUT_SECS", "15")?),
            session_idle_timeout: Duration::from_secs(try_load(
                &lookup,
                "SESSION_IDLE_SECS",
                "1800",
            )?),
            menu_source,
        })
    }
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    lookup(key)
        .unwrap_or_else(|| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        })
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
    fn firestore_defaults_apply() {
        let config = Config::from_lookup(lookup_from(&[("FIRESTORE_PROJECT_ID", "demo")])).unwrap();

        assert_eq!(config.port, 8000);
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.session_idle_timeout, Duration::from_secs(1800));
        assert_eq!(
            config.menu_source,
            MenuSource::Firestore(FirestoreConfig {
                base_url: DEFAULT_FIRESTORE_BASE_URL.into(),
                project_id: "demo".into(),
                database: "(default)".into(),
                collection: "menu".into(),
                api_key: None,
                bearer_token: None,
            })
        );
    }

    #[test]
    fn menu_file_takes_precedence_over_firestore() {
        let config = Config::from_lookup(lookup_from(&[
            ("MENU_FILE", "menu.json"),
            ("PORT", "9000"),
            ("SESSION_IDLE_SECS", "60"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.session_idle_timeout, Duration::from_secs(60));
        assert_eq!(config.menu_source, MenuSource::File(PathBuf::from("menu.json")));
    }

    #[test]
    fn missing_project_id_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[])).err().unwrap();
        assert!(matches!(err, ConfigError::Missing("FIRESTORE_PROJECT_ID")));
    }

    #[test]
    fn unparsable_port_is_an_error() {
        let err = Config::from_lookup(lookup_from(&[("MENU_FILE", "m.json"), ("PORT", "http")]))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }
}
