// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use super::{AddBlock, CollectorBlock, ConstantBlock, DelayBlock, ScaleBlock};
use crate::block::BlockDefinition;
use crate::config::BlockRegistry;
use crate::errors::ConfigError;
use crate::traits::ResultSink;

/// Factory for the built-in (in-process) block types
pub struct LocalBlockFactory;

impl LocalBlockFactory {
    /// Create a definition by type name
    ///
    /// - "Constant" -> ConstantBlock
    /// - "Scale" -> ScaleBlock
    /// - "Add" -> AddBlock
    /// - "Delay" -> DelayBlock (suspending)
    /// - "Collector" -> CollectorBlock, publishing to `results`
    pub fn create_definition(
        name: &str,
        results: &Arc<dyn ResultSink>,
    ) -> Result<BlockDefinition, ConfigError> {
        match name {
            ConstantBlock::NAME => ConstantBlock::definition(),
            ScaleBlock::NAME => ScaleBlock::definition(),
            AddBlock::NAME => AddBlock::definition(),
            DelayBlock::NAME => DelayBlock::definition(),
            CollectorBlock::NAME => CollectorBlock::definition(Arc::clone(results)),
            _ => Err(ConfigError::UnknownBlockType {
                block_type: name.to_string(),
            }),
        }
    }

    /// List all built-in block type names
    pub fn list_available_blocks() -> Vec<&'static str> {
        vec![
            ConstantBlock::NAME,
            ScaleBlock::NAME,
            AddBlock::NAME,
            DelayBlock::NAME,
            CollectorBlock::NAME,
        ]
    }

    pub fn is_block_available(name: &str) -> bool {
        Self::list_available_blocks().contains(&name)
    }

    /// Register every built-in block into `registry`
    pub fn register_all(
        registry: &mut BlockRegistry,
        results: Arc<dyn ResultSink>,
    ) -> Result<(), ConfigError> {
        for name in Self::list_available_blocks() {
            registry.register(Self::create_definition(name, &results)?)?;
        }
        Ok(())
    }

    /// A fresh registry holding every built-in block
    pub fn registry(results: Arc<dyn ResultSink>) -> Result<BlockRegistry, ConfigError> {
        let mut registry = BlockRegistry::new();
        Self::register_all(&mut registry, results)?;
        Ok(registry)
    }
}
