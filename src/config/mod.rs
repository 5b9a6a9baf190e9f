// src/config/mod.rs

pub mod config;

pub use config::{find_config_file, Config, MonitorSettings, CONFIG};
