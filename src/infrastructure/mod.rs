// Ambient infrastructure: configuration and logging
pub mod config;
pub mod logging;

pub use config::{Config, CONFIG_FILE};
pub use logging::{init_logging, LogConfig, LogFormat, LogOutput};
