// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::definition::BlockDefinition;
use super::interface::Interface;
use super::option::OptionSpec;
use crate::config::consts::INFO_STATE_KEY;
use crate::errors::{ComputeError, ConfigError};

/// Engine-maintained run statistics, stored under the reserved `info` state key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    pub compute_count: u64,
    pub error_count: u64,
    pub last_status: Option<String>,
    pub last_duration_ms: Option<u64>,
}

/// A concrete node of a graph.
///
/// The shape (inputs, outputs, options) mirrors the definition the instance was created
/// from. The definition is held by reference, so registry changes only reach an instance
/// once its graph is rebuilt.
#[derive(Debug, Clone)]
pub struct BlockInstance {
    id: String,
    title: String,
    definition: Arc<BlockDefinition>,
    inputs: Vec<Interface>,
    outputs: Vec<Interface>,
    options: Vec<OptionSpec>,
    state: HashMap<String, Value>,
}

impl BlockInstance {
    pub fn new(id: impl Into<String>, definition: Arc<BlockDefinition>) -> Self {
        Self {
            id: id.into(),
            title: definition.name().to_string(),
            inputs: definition.inputs().to_vec(),
            outputs: definition.outputs().to_vec(),
            options: definition.options().to_vec(),
            state: HashMap::new(),
            definition,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The type tag, equal to the definition's name.
    pub fn block_type(&self) -> &str {
        self.definition.name()
    }

    /// Declared display name; falls back to the type tag.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn definition(&self) -> &Arc<BlockDefinition> {
        &self.definition
    }

    pub fn inputs(&self) -> &[Interface] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Interface] {
        &self.outputs
    }

    pub fn options(&self) -> &[OptionSpec] {
        &self.options
    }

    pub fn input(&self, name: &str) -> Result<&Value, ComputeError> {
        self.inputs
            .iter()
            .find(|i| i.name == name)
            .map(|i| &i.value)
            .ok_or_else(|| ComputeError::UnknownInterface(name.to_string()))
    }

    /// The input's value, failing with `MissingInput` when it holds nothing.
    pub fn require_input(&self, name: &str) -> Result<&Value, ComputeError> {
        let value = self.input(name)?;
        if value.is_null() {
            return Err(ComputeError::MissingInput(name.to_string()));
        }
        Ok(value)
    }

    pub fn require_input_f64(&self, name: &str) -> Result<f64, ComputeError> {
        let value = self.require_input(name)?;
        value
            .as_f64()
            .ok_or_else(|| ComputeError::invalid_value(name, format!("expected a number, got {}", value)))
    }

    pub fn set_input(&mut self, name: &str, value: Value) -> Result<(), ComputeError> {
        let slot = self
            .inputs
            .iter_mut()
            .find(|i| i.name == name)
            .ok_or_else(|| ComputeError::UnknownInterface(name.to_string()))?;
        slot.value = value;
        Ok(())
    }

    pub fn output(&self, name: &str) -> Result<&Value, ComputeError> {
        self.outputs
            .iter()
            .find(|o| o.name == name)
            .map(|o| &o.value)
            .ok_or_else(|| ComputeError::UnknownInterface(name.to_string()))
    }

    pub fn set_output(&mut self, name: &str, value: Value) -> Result<(), ComputeError> {
        let slot = self
            .outputs
            .iter_mut()
            .find(|o| o.name == name)
            .ok_or_else(|| ComputeError::UnknownInterface(name.to_string()))?;
        slot.value = value;
        Ok(())
    }

    pub fn option(&self, name: &str) -> Option<&OptionSpec> {
        self.options.iter().find(|o| o.name() == name)
    }

    pub fn option_value(&self, name: &str) -> Option<&Value> {
        self.option(name).map(OptionSpec::value)
    }

    pub fn option_f64(&self, name: &str) -> Option<f64> {
        self.option_value(name).and_then(Value::as_f64)
    }

    pub fn option_i64(&self, name: &str) -> Option<i64> {
        self.option_value(name).and_then(Value::as_i64)
    }

    pub fn option_bool(&self, name: &str) -> Option<bool> {
        self.option_value(name).and_then(Value::as_bool)
    }

    pub fn option_str(&self, name: &str) -> Option<&str> {
        self.option_value(name).and_then(Value::as_str)
    }

    /// Change an option's value, coercing and clamping per its kind.
    pub fn set_option(&mut self, name: &str, value: Value) -> Result<(), ConfigError> {
        let id = self.id.clone();
        let option = self
            .options
            .iter_mut()
            .find(|o| o.name() == name)
            .ok_or_else(|| ConfigError::UnknownOption {
                instance_id: id,
                option: name.to_string(),
            })?;
        option.set_value(value)
    }

    pub fn state(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }

    pub fn set_state(&mut self, key: impl Into<String>, value: Value) -> Result<(), ComputeError> {
        let key = key.into();
        if key == INFO_STATE_KEY {
            return Err(ComputeError::ReservedStateKey(key));
        }
        self.state.insert(key, value);
        Ok(())
    }

    pub fn remove_state(&mut self, key: &str) -> Result<Option<Value>, ComputeError> {
        if key == INFO_STATE_KEY {
            return Err(ComputeError::ReservedStateKey(key.to_string()));
        }
        Ok(self.state.remove(key))
    }

    pub fn info(&self) -> RunInfo {
        self.state
            .get(INFO_STATE_KEY)
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    /// Update the engine-owned run statistics after a compute.
    pub(crate) fn record_run(&mut self, duration: Duration, succeeded: bool) {
        let mut info = self.info();
        info.compute_count += 1;
        if !succeeded {
            info.error_count += 1;
        }
        let status = if succeeded { "finished" } else { "failed" };
        info.last_status = Some(status.to_string());
        info.last_duration_ms = Some(duration.as_millis() as u64);
        self.state.insert(
            INFO_STATE_KEY.to_string(),
            json!({
                "compute_count": info.compute_count,
                "error_count": info.error_count,
                "last_status": info.last_status,
                "last_duration_ms": info.last_duration_ms,
            }),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale_definition() -> Arc<BlockDefinition> {
        Arc::new(
            BlockDefinition::builder("Scale")
                .add_input("in")
                .add_output("out")
                .add_number_option("factor", 2.0, Some(0.0), Some(10.0))
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_instance_mirrors_definition() {
        let instance = BlockInstance::new("s1", scale_definition());
        assert_eq!(instance.id(), "s1");
        assert_eq!(instance.block_type(), "Scale");
        assert_eq!(instance.title(), "Scale");
        assert_eq!(instance.inputs().len(), 1);
        assert_eq!(instance.option_f64("factor"), Some(2.0));
    }

    #[test]
    fn test_reserved_info_key_is_not_writable() {
        let mut instance = BlockInstance::new("s1", scale_definition());
        assert!(matches!(
            instance.set_state("info", Value::Null),
            Err(ComputeError::ReservedStateKey(_))
        ));
        assert!(instance.remove_state("info").is_err());
        instance.set_state("count", Value::from(1)).unwrap();
        assert_eq!(instance.state("count"), Some(&Value::from(1)));
    }

    #[test]
    fn test_record_run_accumulates() {
        let mut instance = BlockInstance::new("s1", scale_definition());
        instance.record_run(Duration::from_millis(3), true);
        instance.record_run(Duration::from_millis(5), false);
        let info = instance.info();
        assert_eq!(info.compute_count, 2);
        assert_eq!(info.error_count, 1);
        assert_eq!(info.last_status.as_deref(), Some("failed"));
        assert_eq!(info.last_duration_ms, Some(5));
    }

    #[test]
    fn test_missing_and_unknown_inputs() {
        let mut instance = BlockInstance::new("s1", scale_definition());
        assert!(matches!(
            instance.require_input("in"),
            Err(ComputeError::MissingInput(_))
        ));
        assert!(matches!(
            instance.input("nope"),
            Err(ComputeError::UnknownInterface(_))
        ));
        instance.set_input("in", Value::from(4.0)).unwrap();
        assert_eq!(instance.require_input_f64("in").unwrap(), 4.0);
    }

    #[test]
    fn test_set_option_clamps_and_reports_unknown() {
        let mut instance = BlockInstance::new("s1", scale_definition());
        instance.set_option("factor", Value::from(99)).unwrap();
        assert_eq!(instance.option_f64("factor"), Some(10.0));
        assert!(matches!(
            instance.set_option("gain", Value::from(1)),
            Err(ConfigError::UnknownOption { .. })
        ));
    }

    #[test]
    fn test_typed_option_accessors() {
        let definition = BlockDefinition::builder("Toggle")
            .add_checkbox_option("enabled", false)
            .add_text_option("label", "off")
            .build()
            .unwrap();
        let mut instance = BlockInstance::new("t1", Arc::new(definition));

        instance.set_option("enabled", Value::Bool(true)).unwrap();

        assert_eq!(instance.option_bool("enabled"), Some(true));
        assert_eq!(instance.option_str("label"), Some("off"));
        assert_eq!(instance.option_bool("label"), None);
    }
}
