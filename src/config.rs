//! This module provides `RuntimeConfig`, which selects the tape strategy and sizing used by a
//! run. A configuration can be loaded from a JSON file, from a string, or from the environment.

use crate::types::{RuntimeError, STDIN_BUFSIZE, TAPE_SIZE};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Names a JSON configuration file to load.
pub const CONFIG_ENV: &str = "TURINGRT_CONFIG";
/// Overrides the tape kind (`reserved` or `growable`).
pub const TAPE_ENV: &str = "TURINGRT_TAPE";

/// The backing strategy for the tape.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TapeKind {
    /// One fixed anonymous memory reservation with the origin at its midpoint.
    #[default]
    Reserved,
    /// Two vectors growing away from the origin.
    Growable,
}

impl std::str::FromStr for TapeKind {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reserved" => Ok(TapeKind::Reserved),
            "growable" => Ok(TapeKind::Growable),
            other => Err(RuntimeError::ConfigError(format!(
                "unknown tape kind `{}` (expected `reserved` or `growable`)",
                other
            ))),
        }
    }
}

/// Tunables for a single runtime invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Which tape implementation to allocate.
    pub tape: TapeKind,
    /// Size of the reservation in bytes. Only used by `TapeKind::Reserved`.
    pub tape_bytes: usize,
    /// Number of bytes requested from the input stream per read.
    pub chunk_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            tape: TapeKind::default(),
            tape_bytes: TAPE_SIZE,
            chunk_size: STDIN_BUFSIZE,
        }
    }
}

impl RuntimeConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// # Returns
    ///
    /// * `Ok(RuntimeConfig)` if the file is read, parsed and valid.
    /// * `Err(RuntimeError::ConfigError)` otherwise.
    pub fn load(path: &Path) -> Result<Self, RuntimeError> {
        let content = fs::read_to_string(path).map_err(|e| {
            RuntimeError::ConfigError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Self::from_json(&content)
    }

    /// Parses and validates a configuration from JSON text. Missing fields take their defaults.
    pub fn from_json(content: &str) -> Result<Self, RuntimeError> {
        let config: RuntimeConfig = serde_json::from_str(content)
            .map_err(|e| RuntimeError::ConfigError(format!("Invalid configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Builds a configuration from the process environment.
    ///
    /// `TURINGRT_CONFIG` names a JSON file to start from (defaults otherwise), and
    /// `TURINGRT_TAPE` overrides the tape kind.
    pub fn from_env() -> Result<Self, RuntimeError> {
        let mut config = match env::var_os(CONFIG_ENV) {
            Some(path) => Self::load(Path::new(&path))?,
            None => Self::default(),
        };

        if let Ok(kind) = env::var(TAPE_ENV) {
            config.tape = kind.parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks that the sizes describe a usable tape and input buffer.
    pub fn validate(&self) -> Result<(), RuntimeError> {
        if self.chunk_size == 0 {
            return Err(RuntimeError::ConfigError(
                "chunk_size must be greater than zero".to_string(),
            ));
        }

        if self.tape == TapeKind::Reserved && (self.tape_bytes == 0 || self.tape_bytes % 8 != 0) {
            return Err(RuntimeError::ConfigError(format!(
                "tape_bytes must be a nonzero multiple of 8, got {}",
                self.tape_bytes
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();

        assert_eq!(config.tape, TapeKind::Reserved);
        assert_eq!(config.tape_bytes, 1 << 31);
        assert_eq!(config.chunk_size, 8192);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let config = RuntimeConfig::from_json(r#"{ "tape": "growable" }"#).unwrap();

        assert_eq!(config.tape, TapeKind::Growable);
        assert_eq!(config.chunk_size, STDIN_BUFSIZE);
    }

    #[test]
    fn test_from_json_rejects_unknown_fields() {
        let result = RuntimeConfig::from_json(r#"{ "tape_size": 64 }"#);
        assert!(matches!(result, Err(RuntimeError::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_bad_sizes() {
        let zero_chunk = RuntimeConfig {
            chunk_size: 0,
            ..RuntimeConfig::default()
        };
        assert!(zero_chunk.validate().is_err());

        let unaligned = RuntimeConfig {
            tape_bytes: 1001,
            ..RuntimeConfig::default()
        };
        assert!(unaligned.validate().is_err());

        // The input buffer is not carved from the tape, so it may outgrow it
        let small_tape = RuntimeConfig {
            tape_bytes: 64,
            chunk_size: 128,
            ..RuntimeConfig::default()
        };
        assert!(small_tape.validate().is_ok());

        // Growable tapes ignore tape_bytes
        let growable = RuntimeConfig {
            tape: TapeKind::Growable,
            tape_bytes: 0,
            ..RuntimeConfig::default()
        };
        assert!(growable.validate().is_ok());
    }

    #[test]
    fn test_tape_kind_from_str() {
        assert_eq!("reserved".parse::<TapeKind>().unwrap(), TapeKind::Reserved);
        assert_eq!(" Growable ".parse::<TapeKind>().unwrap(), TapeKind::Growable);
        assert!("sparse".parse::<TapeKind>().is_err());
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("turingrt.json");

        let mut file = File::create(&file_path).unwrap();
        file.write_all(br#"{ "tape": "reserved", "tape_bytes": 65536, "chunk_size": 16 }"#)
            .unwrap();

        let config = RuntimeConfig::load(&file_path).unwrap();
        assert_eq!(config.tape_bytes, 65536);
        assert_eq!(config.chunk_size, 16);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = RuntimeConfig::load(&dir.path().join("missing.json"));

        match result {
            Err(RuntimeError::ConfigError(msg)) => assert!(msg.contains("Failed to read file")),
            other => panic!("Expected a ConfigError, but got {:?}", other),
        }
    }
}
