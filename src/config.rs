use crate::error::RegistryError;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Runtime configuration, read from `REGISTRY_*` environment variables.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Config {
    /// SQLite connection string, e.g. `sqlite:users.db`.
    pub database_url: String,
    /// Fallback `EnvFilter` directive when `RUST_LOG` is unset.
    pub loglevel: String,
    /// Upper bound on pooled SQLite connections.
    pub max_connections: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite:users.db".to_string(),
            loglevel: "info".to_string(),
            max_connections: 1,
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default())).merge(Env::prefixed("REGISTRY_"))
    }

    pub fn load() -> Result<Self, RegistryError> {
        Ok(Self::figment().extract()?)
    }
}

pub static CONFIG: LazyLock<Config> =
    LazyLock::new(|| Config::load().expect("FATAL: invalid REGISTRY_* configuration"));
