// config.rs

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::history::MAX_HISTORY;

pub const HISTORY_FILE: &str = "repeat_strokes.txt";
pub const MEMORY_FILE: &str = "repeat_memory.txt";
pub const DEBUG_FILE: &str = "repeat_debug.txt";

/// How the memory strokes behave.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MemoryMode {
    /// One stroke: records while memory is empty, plays back and clears
    /// once it holds something.
    #[default]
    Combined,
    /// Separate toggle, paste and reset strokes; playback keeps the memory.
    Separate,
}

/// How many history entries the undo stroke removes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UndoPolicy {
    #[default]
    Single,
    /// Pop two entries, for hosts where the undo stroke itself took a
    /// history slot before being interpreted.
    Double,
}

impl UndoPolicy {
    pub fn pops(self) -> usize {
        match self {
            UndoPolicy::Single => 1,
            UndoPolicy::Double => 2,
        }
    }
}

impl FromStr for MemoryMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "combined" => Ok(MemoryMode::Combined),
            "separate" => Ok(MemoryMode::Separate),
            _ => Err(ConfigError::InvalidValue {
                key: "memory mode",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for UndoPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "1" => Ok(UndoPolicy::Single),
            "double" | "2" => Ok(UndoPolicy::Double),
            _ => Err(ConfigError::InvalidValue {
                key: "undo policy",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for MemoryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MemoryMode::Combined => "combined",
            MemoryMode::Separate => "separate",
        })
    }
}

impl fmt::Display for UndoPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UndoPolicy::Single => "single",
            UndoPolicy::Double => "double",
        })
    }
}

/// Knobs the engine itself reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub max_history: usize,
    pub memory_mode: MemoryMode,
    pub undo_policy: UndoPolicy,
    /// Retract the mark stroke's own output.
    pub mark_sends_undo: bool,
    /// Wipe the history file at startup, after it has been read.
    pub clear_history_on_start: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_history: MAX_HISTORY,
            memory_mode: MemoryMode::default(),
            undo_policy: UndoPolicy::default(),
            mark_sends_undo: true,
            clear_history_on_start: true,
        }
    }
}

/// Runtime configuration: where state lives plus engine options.
#[derive(Debug, Clone)]
pub struct Config {
    pub state_dir: PathBuf,
    pub debug_log: bool,
    pub options: EngineOptions,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    env::current_dir().ok()
}

fn default_state_dir() -> PathBuf {
    resolve_home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("steno-repeat")
}

/// Parse a boolean-like flag value.
///
/// Truthy: `1`, `true`, `yes`, `on`. Falsy: `0`, `false`, `no`, `off`, empty.
/// Case-insensitive, surrounding whitespace ignored.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn env_flag(name: &'static str, default: bool) -> Result<bool, ConfigError> {
    match env::var(name) {
        Ok(value) => parse_flag(&value).ok_or(ConfigError::InvalidValue { key: name, value }),
        Err(_) => Ok(default),
    }
}

fn env_parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key: name, value }),
        Err(_) => Ok(default),
    }
}

/// History must hold at least one stroke.
pub fn checked_max_history(key: &'static str, max: usize) -> Result<usize, ConfigError> {
    if max == 0 {
        return Err(ConfigError::InvalidValue {
            key,
            value: max.to_string(),
        });
    }
    Ok(max)
}

impl Config {
    /// Configuration rooted at `state_dir` with default options.
    pub fn with_state_dir(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
            debug_log: true,
            options: EngineOptions::default(),
        }
    }

    /// Load configuration from environment variables, applying defaults for
    /// anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let state_dir = env::var("STENO_REPEAT_DIR")
            .map(expand_tilde)
            .unwrap_or_else(|_| default_state_dir());
        let defaults = EngineOptions::default();
        let max_history = checked_max_history(
            "STENO_REPEAT_MAX_HISTORY",
            env_parsed("STENO_REPEAT_MAX_HISTORY", defaults.max_history)?,
        )?;
        Ok(Self {
            state_dir,
            debug_log: env_flag("STENO_REPEAT_DEBUG", true)?,
            options: EngineOptions {
                max_history,
                memory_mode: env_parsed("STENO_REPEAT_MEMORY_MODE", defaults.memory_mode)?,
                undo_policy: env_parsed("STENO_REPEAT_UNDO_POLICY", defaults.undo_policy)?,
                mark_sends_undo: env_flag("STENO_REPEAT_MARK_UNDO", defaults.mark_sends_undo)?,
                clear_history_on_start: env_flag(
                    "STENO_REPEAT_CLEAR_ON_START",
                    defaults.clear_history_on_start,
                )?,
            },
        })
    }

    pub fn history_path(&self) -> PathBuf {
        self.state_dir.join(HISTORY_FILE)
    }

    pub fn memory_path(&self) -> PathBuf {
        self.state_dir.join(MEMORY_FILE)
    }

    pub fn debug_log_path(&self) -> PathBuf {
        self.state_dir.join(DEBUG_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_flag_accepts_truthy_values() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert_eq!(parse_flag(value), Some(true), "value: {}", value);
        }
    }

    #[test]
    fn parse_flag_accepts_falsy_values() {
        for value in ["", "0", "false", "FALSE", " no ", "off"] {
            assert_eq!(parse_flag(value), Some(false), "value: {}", value);
        }
    }

    #[test]
    fn parse_flag_rejects_unknown_values() {
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("Separate".parse::<MemoryMode>(), Ok(MemoryMode::Separate));
        assert_eq!(" combined ".parse::<MemoryMode>(), Ok(MemoryMode::Combined));
        assert_eq!("DOUBLE".parse::<UndoPolicy>(), Ok(UndoPolicy::Double));
        assert!("triple".parse::<UndoPolicy>().is_err());
    }

    #[test]
    fn zero_history_is_rejected() {
        assert_eq!(
            checked_max_history("--max-history", 0),
            Err(ConfigError::InvalidValue {
                key: "--max-history",
                value: "0".to_string(),
            })
        );
        assert_eq!(checked_max_history("--max-history", 5), Ok(5));
    }

    #[test]
    fn paths_live_under_state_dir() {
        let config = Config::with_state_dir("/tmp/steno");
        assert_eq!(config.history_path(), PathBuf::from("/tmp/steno/repeat_strokes.txt"));
        assert_eq!(config.memory_path(), PathBuf::from("/tmp/steno/repeat_memory.txt"));
        assert_eq!(config.debug_log_path(), PathBuf::from("/tmp/steno/repeat_debug.txt"));
        assert_eq!(config.options.max_history, MAX_HISTORY);
    }
}
