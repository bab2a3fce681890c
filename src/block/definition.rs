// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use super::interface::Interface;
use super::option::{OptionDescriptor, OptionSpec};
use crate::errors::ConfigError;
use crate::traits::{Compute, ComputeFn};

/// Serialized shape of a block type: the catalogue entry an editor renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub inputs: Vec<Interface>,
    #[serde(default)]
    pub outputs: Vec<Interface>,
    #[serde(default)]
    pub options: Vec<OptionDescriptor>,
}

/// A named block template: ordered inputs, outputs and options plus a compute routine.
///
/// Definitions are immutable once built. Instances keep a shared reference to the
/// definition they were created from.
#[derive(Debug, Clone)]
pub struct BlockDefinition {
    name: String,
    category: Option<String>,
    inputs: Vec<Interface>,
    outputs: Vec<Interface>,
    options: Vec<OptionSpec>,
    compute: ComputeFn,
}

impl BlockDefinition {
    pub fn builder(name: impl Into<String>) -> BlockDefinitionBuilder {
        BlockDefinitionBuilder::new(name)
    }

    /// Rebuild a definition from its descriptor and bind a compute routine to it.
    pub fn from_descriptor(
        descriptor: &BlockDescriptor,
        compute: ComputeFn,
    ) -> Result<Self, ConfigError> {
        let mut builder = BlockDefinitionBuilder::new(descriptor.name.clone()).compute(compute);
        builder.category = descriptor.category.clone();
        builder.inputs = descriptor.inputs.clone();
        builder.outputs = descriptor.outputs.clone();
        builder.options = descriptor
            .options
            .iter()
            .map(OptionSpec::from_descriptor)
            .collect::<Result<_, _>>()?;
        builder.build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
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

    pub fn compute(&self) -> &ComputeFn {
        &self.compute
    }

    pub fn has_input(&self, name: &str) -> bool {
        self.inputs.iter().any(|i| i.name == name)
    }

    pub fn has_output(&self, name: &str) -> bool {
        self.outputs.iter().any(|o| o.name == name)
    }

    /// Names must be distinct across the union of inputs, outputs and options, and every
    /// option default must be a value its kind accepts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        let names = self
            .inputs
            .iter()
            .map(|i| i.name.as_str())
            .chain(self.outputs.iter().map(|o| o.name.as_str()))
            .chain(self.options.iter().map(|o| o.name()));
        for name in names {
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateInterfaceName {
                    block: self.name.clone(),
                    name: name.to_string(),
                });
            }
        }
        for option in &self.options {
            option.validate_default()?;
        }
        Ok(())
    }

    pub fn to_descriptor(&self) -> BlockDescriptor {
        BlockDescriptor {
            name: self.name.clone(),
            category: self.category.clone(),
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            options: self.options.iter().map(OptionSpec::to_descriptor).collect(),
        }
    }
}

/// Incremental builder for [`BlockDefinition`].
///
/// ```
/// use blockflow::block::BlockDefinition;
///
/// let scale = BlockDefinition::builder("Scale")
///     .add_input("in")
///     .add_output("out")
///     .add_number_option("factor", 2.0, None, None)
///     .compute_blocking(|instance| {
///         let input = instance.require_input_f64("in")?;
///         let factor = instance.option_f64("factor").unwrap_or(1.0);
///         instance.set_output("out", (input * factor).into())
///     })
///     .build()
///     .unwrap();
///
/// assert_eq!(scale.inputs().len(), 1);
/// ```
pub struct BlockDefinitionBuilder {
    name: String,
    category: Option<String>,
    inputs: Vec<Interface>,
    outputs: Vec<Interface>,
    options: Vec<OptionSpec>,
    compute: Option<ComputeFn>,
}

impl BlockDefinitionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            options: Vec::new(),
            compute: None,
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn add_input(mut self, name: impl Into<String>) -> Self {
        self.inputs.push(Interface::new(name));
        self
    }

    /// An input that starts with a value; used when the input is left unconnected.
    pub fn add_input_with_default(mut self, name: impl Into<String>, value: Value) -> Self {
        self.inputs.push(Interface::with_value(name, value));
        self
    }

    pub fn add_output(mut self, name: impl Into<String>) -> Self {
        self.outputs.push(Interface::new(name));
        self
    }

    pub fn add_option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    pub fn add_button_option(self, name: impl Into<String>) -> Self {
        self.add_option(OptionSpec::button(name))
    }

    pub fn add_checkbox_option(self, name: impl Into<String>, default: bool) -> Self {
        self.add_option(OptionSpec::checkbox(name, default))
    }

    pub fn add_integer_option(
        self,
        name: impl Into<String>,
        default: i64,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Self {
        self.add_option(OptionSpec::integer(name, default, min, max))
    }

    pub fn add_number_option(
        self,
        name: impl Into<String>,
        default: f64,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Self {
        self.add_option(OptionSpec::number(name, default, min, max))
    }

    /// Slider bounded to 0..=100.
    pub fn add_slider_option(self, name: impl Into<String>, default: f64) -> Self {
        self.add_option(OptionSpec::slider(name, default, 0.0, 100.0))
    }

    pub fn add_select_option(
        self,
        name: impl Into<String>,
        items: Vec<String>,
        default: Option<&str>,
    ) -> Self {
        self.add_option(OptionSpec::select(name, items, default))
    }

    pub fn add_text_option(self, name: impl Into<String>, default: impl Into<String>) -> Self {
        self.add_option(OptionSpec::text(name, default))
    }

    pub fn add_text_input_option(self, name: impl Into<String>, default: impl Into<String>) -> Self {
        self.add_option(OptionSpec::text_input(name, default))
    }

    pub fn add_textarea_input_option(
        self,
        name: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        self.add_option(OptionSpec::textarea_input(name, default))
    }

    pub fn add_display_option(self, name: impl Into<String>) -> Self {
        self.add_option(OptionSpec::display(name, Value::Null))
    }

    pub fn compute(mut self, compute: ComputeFn) -> Self {
        self.compute = Some(compute);
        self
    }

    pub fn compute_blocking<F>(self, f: F) -> Self
    where
        F: Fn(&mut super::BlockInstance) -> Result<(), crate::errors::ComputeError>
            + Send
            + Sync
            + 'static,
    {
        self.compute(ComputeFn::blocking(f))
    }

    pub fn compute_suspending<C: Compute + 'static>(self, compute: C) -> Self {
        self.compute(ComputeFn::suspending(compute))
    }

    /// Finish the definition, rejecting name collisions. Without a compute routine the
    /// block does nothing when run.
    pub fn build(self) -> Result<BlockDefinition, ConfigError> {
        let definition = BlockDefinition {
            name: self.name,
            category: self.category,
            inputs: self.inputs,
            outputs: self.outputs,
            options: self.options,
            compute: self.compute.unwrap_or_else(ComputeFn::noop),
        };
        definition.validate()?;
        Ok(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::option::OptionKind;
    use serde_json::json;

    #[test]
    fn test_duplicate_names_across_collections_are_rejected() {
        let err = BlockDefinition::builder("Bad")
            .add_input("x")
            .add_output("y")
            .add_number_option("x", 1.0, None, None)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DuplicateInterfaceName { ref block, ref name } if block == "Bad" && name == "x"
        ));
    }

    #[test]
    fn test_descriptor_preserves_declaration_order() {
        let def = BlockDefinition::builder("Mixer")
            .category("transform")
            .add_input("b")
            .add_input("a")
            .add_output("out")
            .add_select_option("mode", vec!["sum".into(), "max".into()], None)
            .add_button_option("reset")
            .build()
            .unwrap();

        let descriptor = def.to_descriptor();
        let inputs: Vec<_> = descriptor.inputs.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(inputs, vec!["b", "a"]);
        assert_eq!(descriptor.options[0].value, Some(json!("sum")));

        let exported = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(exported["inputs"][0], json!({ "name": "b" }));
        assert!(exported["options"][1].get("value").is_none());
    }

    #[test]
    fn test_from_descriptor_rejects_unknown_option_kind() {
        let descriptor: BlockDescriptor = serde_json::from_value(json!({
            "name": "Knob",
            "inputs": [],
            "outputs": [{ "name": "out" }],
            "options": [{ "name": "angle", "type": "Dial" }]
        }))
        .unwrap();
        let err = BlockDefinition::from_descriptor(&descriptor, ComputeFn::noop()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOptionKind { .. }));
    }

    #[test]
    fn test_from_descriptor_round_trips_shape() {
        let original = BlockDefinition::builder("Gain")
            .add_input("in")
            .add_output("out")
            .add_integer_option("steps", 3, Some(1), Some(8))
            .build()
            .unwrap();
        let rebuilt =
            BlockDefinition::from_descriptor(&original.to_descriptor(), ComputeFn::noop()).unwrap();
        assert_eq!(rebuilt.to_descriptor(), original.to_descriptor());
    }

    #[test]
    fn test_builder_covers_every_option_kind() {
        let def = BlockDefinition::builder("Panel")
            .add_button_option("reset")
            .add_checkbox_option("enabled", true)
            .add_integer_option("count", 3, Some(0), None)
            .add_number_option("gain", 1.5, None, None)
            .add_select_option("mode", vec!["a".into(), "b".into()], Some("b"))
            .add_slider_option("mix", 50.0)
            .add_text_option("label", "hi")
            .add_text_input_option("name", "")
            .add_textarea_input_option("notes", "")
            .add_display_option("readout")
            .build()
            .unwrap();

        let kinds: Vec<OptionKind> = def.options().iter().map(|o| o.kind()).collect();
        assert_eq!(kinds, OptionKind::ALL.to_vec());
        assert_eq!(def.options()[1].value(), &json!(true));
        assert_eq!(def.options()[5].max(), Some(100.0));
    }

    #[test]
    fn test_select_default_outside_items_is_rejected() {
        let err = BlockDefinition::builder("Picker")
            .add_select_option("mode", vec!["a".into(), "b".into()], Some("zzz"))
            .build()
            .unwrap_err();

        assert!(matches!(err, ConfigError::InvalidOptionValue { option, .. } if option == "mode"));
    }
}
