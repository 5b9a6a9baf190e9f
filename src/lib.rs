pub mod config;
pub mod error;
pub mod globals;
pub mod logging;
pub mod modules;

// Re-exports
pub use config::{find_config_file, MonitorSettings, CONFIG};
pub use error::MonitorError;
pub use globals::*;
pub use modules::*;
