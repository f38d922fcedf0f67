//! Process configuration, read from the environment.

use std::net::SocketAddr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::record_store::Collection;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_EMPRESAS_TABLE: &str = "empresas";
pub const DEFAULT_SEDES_TABLE: &str = "sedes";

static TABLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid table name regex"));

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not a valid socket address: {value}")]
    InvalidAddr { name: &'static str, value: String },

    #[error("{name} must be a positive integer, got {value}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("{name} must be a plain SQL identifier, got {value}")]
    InvalidTableName { name: &'static str, value: String },

    #[error("DATABASE_URL is required when USE_PERSISTENT_STORES is enabled")]
    MissingDatabaseUrl,
}

/// Physical table per collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub empresas: String,
    pub sedes: String,
}

impl TableNames {
    pub fn for_collection(&self, collection: Collection) -> &str {
        match collection {
            Collection::Empresas => &self.empresas,
            Collection::Sedes => &self.sedes,
        }
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            empresas: DEFAULT_EMPRESAS_TABLE.to_string(),
            sedes: DEFAULT_SEDES_TABLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

/// Which record store backs the services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSettings {
    InMemory,
    Postgres(DatabaseSettings),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub store: StoreSettings,
    pub tables: TableNames,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let raw_addr = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr.parse().map_err(|_| ConfigError::InvalidAddr {
            name: "BIND_ADDR",
            value: raw_addr.clone(),
        })?;

        let tables = TableNames {
            empresas: table_name("EMPRESAS_TABLE", var("EMPRESAS_TABLE"), DEFAULT_EMPRESAS_TABLE)?,
            sedes: table_name("SEDES_TABLE", var("SEDES_TABLE"), DEFAULT_SEDES_TABLE)?,
        };

        let persistent = var("USE_PERSISTENT_STORES").is_some_and(|v| is_truthy(&v));
        let store = if persistent {
            let url = var("DATABASE_URL").ok_or(ConfigError::MissingDatabaseUrl)?;
            let max_connections = match var("DATABASE_MAX_CONNECTIONS") {
                Some(raw) => match raw.parse::<u32>() {
                    Ok(n) if n > 0 => n,
                    _ => {
                        return Err(ConfigError::InvalidNumber {
                            name: "DATABASE_MAX_CONNECTIONS",
                            value: raw,
                        });
                    }
                },
                None => DEFAULT_MAX_CONNECTIONS,
            };
            StoreSettings::Postgres(DatabaseSettings {
                url,
                max_connections,
            })
        } else {
            StoreSettings::InMemory
        };

        Ok(Self {
            bind_addr,
            store,
            tables,
        })
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn table_name(name: &'static str, value: Option<String>, default: &str) -> Result<String, ConfigError> {
    let value = value.unwrap_or_else(|| default.to_string());
    if TABLE_NAME.is_match(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidTableName { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_to_in_memory_store() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(s.store, StoreSettings::InMemory);
        assert_eq!(s.tables, TableNames::default());
    }

    #[test]
    fn persistent_store_requires_database_url() {
        let err = settings(&[("USE_PERSISTENT_STORES", "true")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingDatabaseUrl));

        let s = settings(&[
            ("USE_PERSISTENT_STORES", "1"),
            ("DATABASE_URL", "postgres://localhost/corporativo"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
        ])
        .unwrap();
        assert_eq!(
            s.store,
            StoreSettings::Postgres(DatabaseSettings {
                url: "postgres://localhost/corporativo".to_string(),
                max_connections: 12,
            })
        );
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            settings(&[("BIND_ADDR", "nowhere")]),
            Err(ConfigError::InvalidAddr { .. })
        ));
        assert!(matches!(
            settings(&[("SEDES_TABLE", "sedes; drop table x")]),
            Err(ConfigError::InvalidTableName { name: "SEDES_TABLE", .. })
        ));
        assert!(matches!(
            settings(&[
                ("USE_PERSISTENT_STORES", "true"),
                ("DATABASE_URL", "postgres://x"),
                ("DATABASE_MAX_CONNECTIONS", "0"),
            ]),
            Err(ConfigError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn table_names_map_to_collections() {
        let s = settings(&[("EMPRESAS_TABLE", "prod_empresas")]).unwrap();
        assert_eq!(s.tables.for_collection(Collection::Empresas), "prod_empresas");
        assert_eq!(s.tables.for_collection(Collection::Sedes), DEFAULT_SEDES_TABLE);
    }
}
