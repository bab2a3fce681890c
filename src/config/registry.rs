// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::block::{BlockDefinition, BlockDescriptor, BlockInstance};
use crate::errors::ConfigError;
use crate::observability::messages::block::{BlockRegistered, BlockUnregistered};
use crate::observability::messages::StructuredLog;

/// Catalogue of block definitions, keyed by type tag.
///
/// Registering a name that already exists replaces the previous definition. Instances
/// created earlier keep the definition they were built from.
#[derive(Debug, Clone, Default)]
pub struct BlockRegistry {
    blocks: BTreeMap<String, Arc<BlockDefinition>>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a definition, returning the one it replaced.
    pub fn register(
        &mut self,
        definition: BlockDefinition,
    ) -> Result<Option<Arc<BlockDefinition>>, ConfigError> {
        definition.validate()?;
        let name = definition.name().to_string();
        let previous = self.blocks.insert(name.clone(), Arc::new(definition));
        BlockRegistered {
            name: &name,
            replaced: previous.is_some(),
        }
        .log();
        Ok(previous)
    }

    pub fn unregister(&mut self, name: &str) -> Option<Arc<BlockDefinition>> {
        let removed = self.blocks.remove(name);
        if removed.is_some() {
            BlockUnregistered { name }.log();
        }
        removed
    }

    pub fn get(&self, name: &str) -> Option<&Arc<BlockDefinition>> {
        self.blocks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blocks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.blocks.keys()
    }

    /// Create a fresh instance of a registered block, pre-populated with its defaults.
    pub fn instantiate(&self, name: &str, instance_id: &str) -> Result<BlockInstance, ConfigError> {
        let definition = self
            .blocks
            .get(name)
            .ok_or_else(|| ConfigError::UnknownBlockType {
                block_type: name.to_string(),
            })?;
        Ok(BlockInstance::new(instance_id, Arc::clone(definition)))
    }

    /// Serializable shapes of every registered block, ordered by name.
    pub fn export(&self) -> Vec<BlockDescriptor> {
        self.blocks.values().map(|d| d.to_descriptor()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn constant(value: f64) -> BlockDefinition {
        BlockDefinition::builder("Constant")
            .add_output("out")
            .add_number_option("value", value, None, None)
            .build()
            .unwrap()
    }

    #[test]
    fn test_register_and_instantiate() {
        let mut registry = BlockRegistry::new();
        assert!(registry.register(constant(1.0)).unwrap().is_none());

        let instance = registry.instantiate("Constant", "c1").unwrap();
        assert_eq!(instance.id(), "c1");
        assert_eq!(instance.option_f64("value"), Some(1.0));
    }

    #[test]
    fn test_unknown_block_type() {
        let registry = BlockRegistry::new();
        let err = registry.instantiate("Missing", "m1").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBlockType { block_type } if block_type == "Missing"));
    }

    #[test]
    fn test_reregistration_replaces_without_touching_existing_instances() {
        let mut registry = BlockRegistry::new();
        registry.register(constant(1.0)).unwrap();
        let before = registry.instantiate("Constant", "c1").unwrap();

        let replaced = registry.register(constant(7.0)).unwrap();
        assert!(replaced.is_some());
        assert_eq!(registry.len(), 1);

        let after = registry.instantiate("Constant", "c2").unwrap();
        assert_eq!(before.option_f64("value"), Some(1.0));
        assert_eq!(after.option_f64("value"), Some(7.0));
    }

    #[test]
    fn test_unregister_removes_block() {
        let mut registry = BlockRegistry::new();
        registry.register(constant(1.0)).unwrap();
        assert!(registry.unregister("Constant").is_some());
        assert!(registry.unregister("Constant").is_none());
        assert!(registry.instantiate("Constant", "c1").is_err());
    }

    #[test]
    fn test_export_lists_blocks_by_name() {
        let mut registry = BlockRegistry::new();
        registry.register(constant(1.0)).unwrap();
        registry
            .register(BlockDefinition::builder("Add").add_input("a").add_input("b").add_output("sum").build().unwrap())
            .unwrap();

        let exported = registry.export();
        let names: Vec<_> = exported.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Add", "Constant"]);
        assert_eq!(
            serde_json::to_value(&exported[1]).unwrap()["options"][0],
            json!({ "name": "value", "type": "Number", "value": 1.0 })
        );
    }
}
