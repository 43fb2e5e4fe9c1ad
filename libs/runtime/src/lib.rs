pub mod config;
pub mod home_dir;
pub mod logging;

pub use config::{
    default_logging_config, AppConfig, CliOverrides, DatabaseConfig, LoggingConfig, Section,
    ServerConfig,
};
