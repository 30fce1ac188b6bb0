//! Client settings from the environment (`.env` honoured via dotenvy).

use crate::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://localhost:7164/api";
pub const DEFAULT_DEBOUNCE_MS: u64 = 400;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Clone, Debug)]
pub struct ClientSettings {
    pub base_url: String,
    /// Bearer credential attached to every request when set.
    pub token: Option<String>,
    /// Tenant database discriminator sent as the `DbName` header.
    pub db_name: Option<String>,
    pub search_debounce: Duration,
    pub page_size: u32,
    /// Entity catalog JSON (file or directory); the built-in catalog is used when unset.
    pub catalog_path: Option<PathBuf>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        ClientSettings {
            base_url: DEFAULT_BASE_URL.into(),
            token: None,
            db_name: None,
            search_debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            page_size: DEFAULT_PAGE_SIZE,
            catalog_path: None,
        }
    }
}

impl ClientSettings {
    /// Load `.env` (if present) and read `ADMIN_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = ClientSettings::default();

        let debounce_ms = match get("ADMIN_SEARCH_DEBOUNCE_MS") {
            Some(v) => v.parse::<u64>().map_err(|_| {
                ConfigError::Settings(format!("ADMIN_SEARCH_DEBOUNCE_MS must be a number, got '{}'", v))
            })?,
            None => DEFAULT_DEBOUNCE_MS,
        };
        let page_size = match get("ADMIN_PAGE_SIZE") {
            Some(v) => match v.parse::<u32>() {
                Ok(n) if n >= 1 => n,
                _ => {
                    return Err(ConfigError::Settings(format!(
                        "ADMIN_PAGE_SIZE must be a positive number, got '{}'",
                        v
                    )))
                }
            },
            None => defaults.page_size,
        };

        Ok(ClientSettings {
            base_url: get("ADMIN_API_BASE_URL").unwrap_or(defaults.base_url),
            token: get("ADMIN_API_TOKEN"),
            db_name: get("ADMIN_API_DB_NAME"),
            search_debounce: Duration::from_millis(debounce_ms),
            page_size,
            catalog_path: get("ADMIN_CATALOG_PATH").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let s = ClientSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(s.base_url, DEFAULT_BASE_URL);
        assert_eq!(s.search_debounce, Duration::from_millis(400));
        assert_eq!(s.page_size, 10);
        assert!(s.token.is_none());
    }

    #[test]
    fn reads_overrides_and_ignores_blank() {
        let s = ClientSettings::from_lookup(lookup(&[
            ("ADMIN_API_BASE_URL", "http://127.0.0.1:9000/api"),
            ("ADMIN_API_TOKEN", "abc"),
            ("ADMIN_API_DB_NAME", "  "),
            ("ADMIN_PAGE_SIZE", "25"),
        ]))
        .unwrap();
        assert_eq!(s.base_url, "http://127.0.0.1:9000/api");
        assert_eq!(s.token.as_deref(), Some("abc"));
        assert!(s.db_name.is_none());
        assert_eq!(s.page_size, 25);
    }

    #[test]
    fn rejects_zero_page_size() {
        let res = ClientSettings::from_lookup(lookup(&[("ADMIN_PAGE_SIZE", "0")]));
        assert!(matches!(res, Err(ConfigError::Settings(_))));
    }
}
