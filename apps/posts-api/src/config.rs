use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::{RetryConfig, mongodb::MongoConfig};

pub use core_config::Environment;

/// Everything the service reads from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    /// Backoff for the initial MongoDB connection
    pub mongodb_retry: RetryConfig,
    pub server: ServerConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let app = app_info!();
        let mongodb = MongoConfig::from_env()?;
        let mongodb = match mongodb.app_name {
            Some(_) => mongodb,
            None => mongodb.with_app_name(app.name),
        };

        Ok(Self {
            app,
            mongodb,
            mongodb_retry: RetryConfig::from_env()?,
            server: ServerConfig::from_env()?,
            environment,
        })
    }
}
