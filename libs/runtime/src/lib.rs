//! Process-level plumbing shared by the server binary and its modules:
//! layered configuration, logging setup and shutdown signals.

pub mod config;
pub mod logging;
pub mod shutdown;

pub use config::{
    module_config_or_default, AppConfig, AppConfigProvider, CliArgs, ConfigProvider,
    LoggingConfig, Section, ServerConfig,
};
