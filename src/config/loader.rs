// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_LOG_FILTER, MAX_CONCURRENCY_LIMIT};
use crate::errors::{ConfigError, FailureStrategy};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::Path;

/// Engine-level configuration.
///
/// Everything has a default, so an empty document is a valid configuration.
///
/// # Example
/// ```yaml
/// mode: concurrent
/// failure_strategy: continue_on_error
/// executor_options:
///   max_concurrency: 8
/// log_filter: "blockflow=debug"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub mode: ExecutionMode,
    #[serde(default)]
    pub failure_strategy: FailureStrategy,
    #[serde(default)]
    pub executor_options: ExecutorOptions,
    #[serde(default)]
    pub log_filter: Option<String>,
}

impl EngineConfig {
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}

/// Which scheduler drives a run.
///
/// * `Sequential` - one compute at a time on the caller's task, declaration-order tie-break
/// * `Concurrent` - every ready instance is dispatched as its own unit of work
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    Sequential,
    #[default]
    Concurrent,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Sequential => "sequential",
            ExecutionMode::Concurrent => "concurrent",
        }
    }
}

impl Display for ExecutionMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Executor tuning.
///
/// * `max_concurrency` - cap on in-flight units in concurrent mode; unbounded when absent
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ExecutorOptions {
    #[serde(default)]
    pub max_concurrency: Option<usize>,
}

/// Load an engine config; the format follows the file extension (`.toml`, `.json`,
/// anything else is read as YAML).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parse_error = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&content).map_err(|e| parse_error(e.to_string())),
        Some("json") => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string())),
        _ => serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string())),
    }
}

/// Load a config and reject settings the executors cannot honour.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let cfg = load_config(path)?;
    validate_config(&cfg)?;
    Ok(cfg)
}

pub fn validate_config(cfg: &EngineConfig) -> Result<(), ConfigError> {
    match cfg.executor_options.max_concurrency {
        Some(0) => Err(ConfigError::InvalidSetting {
            setting: "executor_options.max_concurrency".into(),
            reason: "must be at least 1".into(),
        }),
        Some(n) if n > MAX_CONCURRENCY_LIMIT => Err(ConfigError::InvalidSetting {
            setting: "executor_options.max_concurrency".into(),
            reason: format!("must not exceed {}", MAX_CONCURRENCY_LIMIT),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn parse_basic_config() {
        let yaml = r#"
mode: sequential
failure_strategy: fail_fast
executor_options:
  max_concurrency: 2
"#;
        let cfg: EngineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.mode, ExecutionMode::Sequential);
        assert_eq!(cfg.failure_strategy, FailureStrategy::FailFast);
        assert_eq!(cfg.executor_options.max_concurrency, Some(2));
        assert_eq!(cfg.log_filter(), "info");
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let cfg: EngineConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert_eq!(cfg.mode, ExecutionMode::Concurrent);
        assert_eq!(cfg.executor_options.max_concurrency, None);
    }

    #[test]
    fn test_load_toml_by_extension() {
        let file = write_temp(
            ".toml",
            "mode = \"concurrent\"\nlog_filter = \"debug\"\n\n[executor_options]\nmax_concurrency = 3\n",
        );
        let cfg = load_and_validate_config(file.path()).unwrap();
        assert_eq!(cfg.executor_options.max_concurrency, Some(3));
        assert_eq!(cfg.log_filter(), "debug");
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let file = write_temp(".yaml", "executor_options:\n  max_concurrency: 0\n");
        let err = load_and_validate_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { .. }));
    }

    #[test]
    fn test_unknown_mode_is_a_parse_error() {
        let file = write_temp(".yaml", "mode: hybrid\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = load_config("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
