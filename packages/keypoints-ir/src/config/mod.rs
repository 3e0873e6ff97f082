//! Instrumentation configuration
//!
//! Resolution order: built-in defaults, then an optional YAML file
//! (`version: 1`), then environment overrides:
//!
//! - `KEYPOINTS_OUTPUT_DIR`: directory holding the dictionary and counter files
//! - `KEYPOINTS_LOCK_COUNTER`: `1`/`true` or `0`/`false`

pub mod error;
pub mod io;

use std::path::{Path, PathBuf};
use std::time::Duration;

use keypoints_storage::{LockOptions, DEFAULT_COUNTER_FILE, DEFAULT_DICTIONARY_FILE};

pub use error::{ConfigError, ConfigResult};
pub use io::{ConfigFileV1, LockSection, SUPPORTED_VERSIONS};

pub const OUTPUT_DIR_ENV: &str = "KEYPOINTS_OUTPUT_DIR";
pub const LOCK_COUNTER_ENV: &str = "KEYPOINTS_LOCK_COUNTER";

const MAX_LOCK_ATTEMPTS: u32 = 10_000;
const MAX_LOCK_RETRY_MS: u64 = 60_000;

/// Where the pass keeps its cross-invocation state, and how it guards it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentationConfig {
    /// Directory holding the dictionary and counter files
    pub output_dir: PathBuf,
    pub dictionary_file: String,
    pub counter_file: String,
    /// Guard the counter read-allocate-write with an advisory lock.
    /// Off by default: concurrent invocations then race on the counter.
    pub lock_counter: bool,
    pub lock_attempts: u32,
    pub lock_retry_ms: u64,
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        let lock = LockOptions::default();
        Self {
            output_dir: PathBuf::from("."),
            dictionary_file: DEFAULT_DICTIONARY_FILE.to_string(),
            counter_file: DEFAULT_COUNTER_FILE.to_string(),
            lock_counter: false,
            lock_attempts: lock.attempts,
            lock_retry_ms: lock.retry_delay.as_millis() as u64,
        }
    }
}

impl InstrumentationConfig {
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_lock(mut self, enabled: bool) -> Self {
        self.lock_counter = enabled;
        self
    }

    pub fn dictionary_path(&self) -> PathBuf {
        self.output_dir.join(&self.dictionary_file)
    }

    pub fn counter_path(&self) -> PathBuf {
        self.output_dir.join(&self.counter_file)
    }

    pub fn lock_options(&self) -> LockOptions {
        LockOptions {
            attempts: self.lock_attempts,
            retry_delay: Duration::from_millis(self.lock_retry_ms),
        }
    }

    /// Load from a YAML file and validate
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let file: ConfigFileV1 = serde_yaml::from_str(content)?;

        let version = file.version.ok_or(ConfigError::MissingVersion)?;
        if !SUPPORTED_VERSIONS.contains(&version) {
            return Err(ConfigError::UnsupportedVersion {
                found: version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let mut config = Self::default();
        if let Some(dir) = file.output_dir {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(name) = file.dictionary_file {
            config.dictionary_file = name;
        }
        if let Some(name) = file.counter_file {
            config.counter_file = name;
        }
        if let Some(lock) = file.lock {
            config.lock_counter = lock.enabled;
            if let Some(attempts) = lock.attempts {
                config.lock_attempts = attempts;
            }
            if let Some(retry_ms) = lock.retry_ms {
                config.lock_retry_ms = retry_ms;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        let file = ConfigFileV1 {
            version: Some(1),
            output_dir: Some(self.output_dir.to_string_lossy().into_owned()),
            dictionary_file: Some(self.dictionary_file.clone()),
            counter_file: Some(self.counter_file.clone()),
            lock: Some(LockSection {
                enabled: self.lock_counter,
                attempts: Some(self.lock_attempts),
                retry_ms: Some(self.lock_retry_ms),
            }),
        };
        Ok(serde_yaml::to_string(&file)?)
    }

    /// Apply `KEYPOINTS_*` environment overrides
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.with_overrides_from(|var| std::env::var(var).ok())
    }

    fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        if let Some(dir) = lookup(OUTPUT_DIR_ENV) {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup(LOCK_COUNTER_ENV) {
            self.lock_counter = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: LOCK_COUNTER_ENV.to_string(),
                        value,
                    })
                }
            };
        }
        Ok(self)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.dictionary_file.trim().is_empty() {
            return Err(ConfigError::Custom("dictionary_file must not be empty".to_string()));
        }
        if self.counter_file.trim().is_empty() {
            return Err(ConfigError::Custom("counter_file must not be empty".to_string()));
        }
        if self.dictionary_file == self.counter_file {
            return Err(ConfigError::Custom(format!(
                "dictionary_file and counter_file both point at '{}'",
                self.counter_file
            )));
        }
        if !(1..=MAX_LOCK_ATTEMPTS).contains(&self.lock_attempts) {
            return Err(ConfigError::range_with_hint(
                "lock.attempts",
                self.lock_attempts,
                1,
                MAX_LOCK_ATTEMPTS,
                "At least one acquisition attempt is required.",
            ));
        }
        if self.lock_retry_ms > MAX_LOCK_RETRY_MS {
            return Err(ConfigError::range_with_hint(
                "lock.retry_ms",
                self.lock_retry_ms,
                0,
                MAX_LOCK_RETRY_MS,
                "",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = InstrumentationConfig::default();
        assert_eq!(config.dictionary_path(), PathBuf::from("./branch_dictionary.txt"));
        assert_eq!(config.counter_path(), PathBuf::from("./counter.log"));
        assert!(!config.lock_counter);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = InstrumentationConfig::default()
            .with_overrides_from(env(&[(OUTPUT_DIR_ENV, "/tmp/kp"), (LOCK_COUNTER_ENV, "TRUE")]))
            .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/kp"));
        assert!(config.lock_counter);
    }

    #[test]
    fn test_invalid_env_override() {
        let result = InstrumentationConfig::default()
            .with_overrides_from(env(&[(LOCK_COUNTER_ENV, "sometimes")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnv { .. })));
    }

    #[test]
    fn test_validation_rejects_zero_attempts() {
        let mut config = InstrumentationConfig::default();
        config.lock_attempts = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Range { .. })));
    }

    #[test]
    fn test_validation_rejects_shared_file() {
        let mut config = InstrumentationConfig::default();
        config.counter_file = config.dictionary_file.clone();
        assert!(matches!(config.validate(), Err(ConfigError::Custom(_))));
    }
}
