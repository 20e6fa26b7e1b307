use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

use serde::Deserialize;

static CONFIG: OnceLock<Mutex<Config>> = OnceLock::new();

const CONFIG_FILE: &str = "config.toml";

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// Base URL of the backend, e.g. `http://localhost:5000`
    pub endpoint: String,
    /// Directory local saves are written into
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Set when the backend session is already authenticated with Drive;
    /// triggers the folder listing at startup
    #[serde(default)]
    pub auth_success: bool,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000".to_string(),
            output_dir: default_output_dir(),
            auth_success: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load_config() -> Config {
        match fs::read_to_string(CONFIG_FILE) {
            Ok(config_str) => match toml::from_str(&config_str) {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!("invalid {CONFIG_FILE}: {err}, using defaults");
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }
}

pub fn init_config() {
    CONFIG.get_or_init(|| {
        let config = Config::load_config();
        Mutex::new(config)
    });
}

pub fn get_config() -> Config {
    init_config();
    CONFIG.get().unwrap().lock().unwrap().clone()
}
