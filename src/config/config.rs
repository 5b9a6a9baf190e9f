// src/config/config.rs

use anyhow::{anyhow, bail, Context, Result};

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use configparser::ini::Ini;

use crate::globals::{CPUINFO_PATH, CPU_MAX_FREQ_PATH, GRAPH_HEADROOM_MHZ, GRAPH_WINDOW_SECS};

pub struct Config {
    path: Arc<Mutex<PathBuf>>,
    config: Arc<Mutex<Ini>>,
}

impl Config {
    pub fn new() -> Self {
        Config {
            path: Arc::new(Mutex::new(PathBuf::new())),
            config: Arc::new(Mutex::new(Ini::new())),
        }
    }

    pub fn set_path(&self, path: PathBuf) -> Result<()> {
        *self.lock_path()? = path.clone();

        if path.exists() {
            self.update_config()?;
        }

        Ok(())
    }

    pub fn has_config(&self) -> bool {
        self.lock_path().map(|p| p.exists()).unwrap_or(false)
    }

    pub fn get_path(&self) -> PathBuf {
        self.lock_path().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn update_config(&self) -> Result<()> {
        let path = self.get_path();
        let path_str = path
            .to_str()
            .ok_or_else(|| anyhow!("config path is not valid UTF-8: {}", path.display()))?;

        let mut new_config = Ini::new();
        new_config
            .load(path_str)
            .map_err(|e| anyhow!("failed to parse config file {}: {}", path.display(), e))?;
        *self.lock_config()? = new_config;
        Ok(())
    }

    /// Replaces the loaded settings with `content` parsed as INI.
    pub fn load_str(&self, content: &str) -> Result<()> {
        let mut new_config = Ini::new();
        new_config
            .read(content.to_string())
            .map_err(|e| anyhow!("failed to parse config: {}", e))?;
        *self.lock_config()? = new_config;
        Ok(())
    }

    pub fn get_string(&self, section: &str, key: &str) -> Result<Option<String>> {
        Ok(self.lock_config()?.get(section, key))
    }

    pub fn get_int(&self, section: &str, key: &str) -> Result<Option<u32>> {
        match self.get_string(section, key)? {
            Some(s) => Ok(Some(
                s.trim()
                    .parse()
                    .with_context(|| format!("[{}] {} is not a whole number: {}", section, key, s))?,
            )),
            None => Ok(None),
        }
    }

    pub fn get_float(&self, section: &str, key: &str) -> Result<Option<f64>> {
        match self.get_string(section, key)? {
            Some(s) => Ok(Some(
                s.trim()
                    .parse()
                    .with_context(|| format!("[{}] {} is not a number: {}", section, key, s))?,
            )),
            None => Ok(None),
        }
    }

    pub fn has_option(&self, section: &str, key: &str) -> bool {
        self.get_string(section, key).ok().flatten().is_some()
    }

    pub fn get(&self, section: &str, key: &str, fallback: &str) -> String {
        self.get_string(section, key)
            .ok()
            .flatten()
            .unwrap_or_else(|| fallback.to_string())
    }

    fn lock_path(&self) -> Result<std::sync::MutexGuard<'_, PathBuf>> {
        self.path.lock().map_err(|_| anyhow!("config path lock poisoned"))
    }

    fn lock_config(&self) -> Result<std::sync::MutexGuard<'_, Ini>> {
        self.config.lock().map_err(|_| anyhow!("config lock poisoned"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

// Global config instance
lazy_static::lazy_static! {
    pub static ref CONFIG: Config = Config::new();
}

/// Typed view of the settings the monitor consumes.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSettings {
    pub cpuinfo_path: PathBuf,
    pub max_freq_path: PathBuf,
    pub window_seconds: f64,
    pub headroom_mhz: u32,
    pub log_level: log::LevelFilter,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            cpuinfo_path: PathBuf::from(CPUINFO_PATH),
            max_freq_path: PathBuf::from(CPU_MAX_FREQ_PATH),
            window_seconds: GRAPH_WINDOW_SECS,
            headroom_mhz: GRAPH_HEADROOM_MHZ,
            log_level: log::LevelFilter::Warn,
        }
    }
}

impl MonitorSettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        let defaults = Self::default();

        let window_seconds = config
            .get_float("graph", "window_seconds")?
            .unwrap_or(defaults.window_seconds);
        if !(window_seconds > 0.0) {
            bail!("[graph] window_seconds must be positive, got {}", window_seconds);
        }

        let log_level = match config.get_string("logging", "level")? {
            Some(name) => crate::logging::parse_level(&name)
                .ok_or_else(|| anyhow!("[logging] level is not a log level: {}", name))?,
            None => defaults.log_level,
        };

        Ok(Self {
            cpuinfo_path: config
                .get_string("sources", "cpuinfo")?
                .map(PathBuf::from)
                .unwrap_or(defaults.cpuinfo_path),
            max_freq_path: config
                .get_string("sources", "max_freq")?
                .map(PathBuf::from)
                .unwrap_or(defaults.max_freq_path),
            window_seconds,
            headroom_mhz: config
                .get_int("graph", "headroom_mhz")?
                .unwrap_or(defaults.headroom_mhz),
            log_level,
        })
    }
}

/// Find the config file to use
///
/// Look for a config file in the following prioritization order:
/// 1. Command line argument
/// 2. User config file
/// 3. System config file
pub fn find_config_file(args_config_file: Option<&Path>) -> Result<PathBuf> {
    // (1) Command line argument was specified
    if let Some(config_path) = args_config_file {
        if config_path.is_file() {
            return Ok(config_path.to_path_buf());
        }
        bail!(
            "Config file specified with '--config {}' not found.",
            config_path.display()
        );
    }

    // (2) User config file
    if let Some(user_config_file) = user_config_file() {
        if user_config_file.is_file() {
            return Ok(user_config_file);
        }
    }

    // (3) System config file (default if nothing else is found)
    Ok(PathBuf::from("/etc/cpu-monitor.conf"))
}

fn user_config_file() -> Option<PathBuf> {
    let user_config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;

    Some(user_config_dir.join("cpu-monitor/cpu-monitor.conf"))
}
