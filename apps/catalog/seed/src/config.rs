use core_config::{Environment, FromEnv};
use database::postgres::PostgresConfig;

/// Seeder configuration, composed from the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub database: PostgresConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            database: PostgresConfig::from_env()?,
            environment: Environment::from_env(),
        })
    }
}
