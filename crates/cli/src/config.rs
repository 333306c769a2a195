//! Optional `~/.config/ptyhost/config.toml` overrides for `start`'s
//! defaults, grounded in the teacher's `termstack::Config::load` (same
//! `$HOME/.config/<name>/config.toml`, warn-and-fall-back-to-default on a
//! parse error rather than aborting).

use std::env;
use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub emulator: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            size: None,
            emulator: None,
        }
    }
}

impl Config {
    /// Load from `~/.config/ptyhost/config.toml`, falling back to defaults
    /// (with a stderr warning) when the file is missing or malformed.
    pub fn load() -> Self {
        let path = Self::config_path();
        if let Ok(contents) = std::fs::read_to_string(&path) {
            match toml::from_str(&contents) {
                Ok(config) => return config,
                Err(e) => eprintln!("warning: failed to parse {}: {e}", path.display()),
            }
        }
        Self::default()
    }

    fn config_path() -> PathBuf {
        let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home)
            .join(".config")
            .join("ptyhost")
            .join("config.toml")
    }
}
