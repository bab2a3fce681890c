// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::Path;
use std::sync::Arc;

use crate::block::BlockDefinition;
use crate::config::{load_and_validate_config, validate_config, BlockRegistry, EngineConfig};
use crate::engine::ComputeEngine;
use crate::errors::ConfigError;
use crate::observability::messages::engine::RegistryConfigured;
use crate::observability::messages::validation::ConfigLoaded;
use crate::observability::messages::StructuredLog;
use crate::traits::EventSink;

/// Engine runtime builder - assembles a [`ComputeEngine`] from configuration.
///
/// Collects the engine settings, the block catalogue and any event sinks, then
/// validates the settings once in [`RuntimeBuilder::build`].
///
/// # Examples
///
/// ```
/// use blockflow::config::{EngineConfig, ExecutionMode, RuntimeBuilder};
///
/// let config = EngineConfig {
///     mode: ExecutionMode::Sequential,
///     ..EngineConfig::default()
/// };
///
/// let engine = RuntimeBuilder::new(config).build().unwrap();
///
/// assert_eq!(engine.config().mode, ExecutionMode::Sequential);
/// ```
pub struct RuntimeBuilder {
    config: EngineConfig,
    registry: BlockRegistry,
    sinks: Vec<Arc<dyn EventSink>>,
}

impl RuntimeBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            registry: BlockRegistry::new(),
            sinks: Vec::new(),
        }
    }

    /// Start from an engine config file (`.yaml`, `.yml`, `.json` or `.toml`).
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = load_and_validate_config(&path)?;
        ConfigLoaded {
            path: &path.as_ref().display().to_string(),
            mode: config.mode.as_str(),
        }
        .log();
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the whole catalogue.
    pub fn with_registry(mut self, registry: BlockRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn register(mut self, definition: BlockDefinition) -> Result<Self, ConfigError> {
        self.registry.register(definition)?;
        Ok(self)
    }

    /// Give direct access to the catalogue, e.g. for bulk registration.
    pub fn registry_mut(&mut self) -> &mut BlockRegistry {
        &mut self.registry
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn build(self) -> Result<ComputeEngine, ConfigError> {
        validate_config(&self.config)?;
        RegistryConfigured {
            block_count: self.registry.len(),
        }
        .log();
        let engine = ComputeEngine::with_registry(self.config, self.registry);
        for sink in self.sinks {
            engine.add_sink(sink);
        }
        Ok(engine)
    }
}
