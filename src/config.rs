use anyhow::{anyhow, Context, Result};
use std::env;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageKind {
    Postgres,
    Memory,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage: StorageKind,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub bind_addr: String,
    pub page_size: Option<u64>,
    pub max_page_size: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageKind::Postgres,
            database_url: None,
            database_max_connections: 5,
            bind_addr: "127.0.0.1:8080".into(),
            page_size: None,
            max_page_size: 100,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let storage = match lookup("STORAGE").as_deref().map(str::trim) {
            None | Some("") | Some("postgres") => StorageKind::Postgres,
            Some("memory") => StorageKind::Memory,
            Some(other) => return Err(anyhow!("unknown STORAGE {:?}, expected postgres or memory", other)),
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        if storage == StorageKind::Postgres && database_url.is_none() {
            return Err(anyhow!("DATABASE_URL must be set"));
        }

        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS")?
            .unwrap_or(defaults.database_max_connections);
        let bind_addr = lookup("BIND_ADDR").unwrap_or(defaults.bind_addr);
        let page_size = parse_or(&lookup, "PAGE_SIZE")?;
        let max_page_size = parse_or(&lookup, "MAX_PAGE_SIZE")?.unwrap_or(defaults.max_page_size);

        Ok(Self {
            storage,
            database_url,
            database_max_connections,
            bind_addr,
            page_size,
            max_page_size,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("invalid {}", key)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn postgres_requires_database_url() {
        assert!(config(&[]).is_err());
        let cfg = config(&[("DATABASE_URL", "postgres://localhost/employees")]).unwrap();
        assert_eq!(cfg.storage, StorageKind::Postgres);
        assert_eq!(cfg.bind_addr, "127.0.0.1:8080");
        assert_eq!(cfg.page_size, None);
        assert_eq!(cfg.max_page_size, 100);
    }

    #[test]
    fn memory_storage_needs_no_database() {
        let cfg = config(&[("STORAGE", "memory"), ("PAGE_SIZE", "20")]).unwrap();
        assert_eq!(cfg.storage, StorageKind::Memory);
        assert_eq!(cfg.page_size, Some(20));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config(&[("STORAGE", "sqlite")]).is_err());
        assert!(config(&[("STORAGE", "memory"), ("PAGE_SIZE", "ten")]).is_err());
    }
}
