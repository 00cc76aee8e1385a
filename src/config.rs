// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{ConsoleError, Result};
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 15 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub connection_api: ServiceConfig,
    pub dataset_api: ServiceConfig,
    pub file_service: ServiceConfig,
    pub tracker: TrackerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackerConfig {
    pub poll_interval_secs: u64,
    pub max_upload_bytes: u64,
    pub page_limit: u32,
}

impl TrackerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 20,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            page_limit: 10,
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("KB_CONSOLE")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| ConsoleError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| ConsoleError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            connection_api: ServiceConfig {
                base_url: "http://localhost:3000".to_string(),
                timeout_secs: 5,
            },
            dataset_api: ServiceConfig {
                base_url: "http://localhost:3000".to_string(),
                timeout_secs: 5,
            },
            file_service: ServiceConfig {
                base_url: "http://localhost:3001".to_string(),
                timeout_secs: 30,
            },
            tracker: TrackerConfig::default(),
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, service) in [
            ("connection_api", &self.connection_api),
            ("dataset_api", &self.dataset_api),
            ("file_service", &self.file_service),
        ] {
            Validator::validate_url(&service.base_url)
                .map_err(|e| ConsoleError::Config(format!("{}: {}", name, e)))?;

            if service.timeout_secs == 0 {
                return Err(ConsoleError::Config(format!(
                    "{}.timeout_secs must be greater than 0",
                    name
                )));
            }
        }

        if self.tracker.poll_interval_secs == 0 {
            return Err(ConsoleError::Config(
                "poll_interval_secs must be greater than 0".to_string(),
            ));
        }

        if self.tracker.max_upload_bytes == 0 {
            return Err(ConsoleError::Config(
                "max_upload_bytes must be greater than 0".to_string(),
            ));
        }

        if self.tracker.page_limit == 0 {
            return Err(ConsoleError::Config(
                "page_limit must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
