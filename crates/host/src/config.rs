//! Host defaults (spec.md §6 "Terminal defaults") and the emulator mode
//! that decides the child's `TERM` (spec.md §4.3, §6).
//!
//! Styled after the teacher's `crates/compositor/src/config.rs`: a
//! `#[serde(default)]` struct plus a `rename_all = "lowercase"` mode enum,
//! loadable from a TOML file the way `termstack::Config` is.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmulatorMode {
    Xterm,
    Custom,
}

impl Default for EmulatorMode {
    fn default() -> Self {
        EmulatorMode::Xterm
    }
}

impl EmulatorMode {
    /// `TERM` handed to the child (spec.md §4.3, §6 "Environment handed to
    /// the child").
    pub fn term_value(self) -> &'static str {
        match self {
            EmulatorMode::Xterm => "xterm-256color",
            EmulatorMode::Custom => "ansi",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub cols: u16,
    pub rows: u16,
    pub emulator: EmulatorMode,
    pub debug_ring_capacity: usize,
    pub pty_dump: Option<std::path::PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cols: terminal::DEFAULT_COLS as u16,
            rows: terminal::DEFAULT_ROWS as u16,
            emulator: EmulatorMode::default(),
            debug_ring_capacity: terminal::DEBUG_RING_CAPACITY,
            pty_dump: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = Config::default();
        assert_eq!(config.cols, 80);
        assert_eq!(config.rows, 24);
        assert_eq!(config.emulator.term_value(), "xterm-256color");
        assert_eq!(config.debug_ring_capacity, 10);
    }

    #[test]
    fn custom_mode_uses_ansi_term() {
        assert_eq!(EmulatorMode::Custom.term_value(), "ansi");
    }
}
