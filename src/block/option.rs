// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed, user-configurable block parameters.
//!
//! An [`OptionSpec`] carries its kind, current value and the constraints the kind
//! supports (`min`/`max` for numeric kinds, `items` for selects). Values only change
//! through [`OptionSpec::set_value`], which coerces and clamps them.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::errors::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionKind {
    Button,
    Checkbox,
    Integer,
    Number,
    Select,
    Slider,
    Text,
    TextInput,
    TextareaInput,
    Display,
}

impl OptionKind {
    pub const ALL: [OptionKind; 10] = [
        OptionKind::Button,
        OptionKind::Checkbox,
        OptionKind::Integer,
        OptionKind::Number,
        OptionKind::Select,
        OptionKind::Slider,
        OptionKind::Text,
        OptionKind::TextInput,
        OptionKind::TextareaInput,
        OptionKind::Display,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKind::Button => "Button",
            OptionKind::Checkbox => "Checkbox",
            OptionKind::Integer => "Integer",
            OptionKind::Number => "Number",
            OptionKind::Select => "Select",
            OptionKind::Slider => "Slider",
            OptionKind::Text => "Text",
            OptionKind::TextInput => "TextInput",
            OptionKind::TextareaInput => "TextareaInput",
            OptionKind::Display => "Display",
        }
    }

    /// Kinds that honour `min`/`max`.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            OptionKind::Integer | OptionKind::Number | OptionKind::Slider
        )
    }
}

impl Display for OptionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptionKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OptionKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidOptionKind { kind: s.to_string() })
    }
}

/// Serialized shape of an option, as exported to editors and accepted in block descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    name: String,
    kind: OptionKind,
    value: Value,
    min: Option<f64>,
    max: Option<f64>,
    items: Vec<String>,
}

impl OptionSpec {
    fn raw(name: impl Into<String>, kind: OptionKind, value: Value) -> Self {
        Self {
            name: name.into(),
            kind,
            value,
            min: None,
            max: None,
            items: Vec::new(),
        }
    }

    pub fn button(name: impl Into<String>) -> Self {
        Self::raw(name, OptionKind::Button, Value::Null)
    }

    pub fn checkbox(name: impl Into<String>, default: bool) -> Self {
        Self::raw(name, OptionKind::Checkbox, Value::Bool(default))
    }

    pub fn integer(
        name: impl Into<String>,
        default: i64,
        min: Option<i64>,
        max: Option<i64>,
    ) -> Self {
        let mut spec = Self::raw(name, OptionKind::Integer, Value::Null);
        spec.min = min.map(|m| m as f64);
        spec.max = max.map(|m| m as f64);
        spec.value = Value::from(spec.clamp_i64(default));
        spec
    }

    pub fn number(name: impl Into<String>, default: f64, min: Option<f64>, max: Option<f64>) -> Self {
        Self::bounded(name, OptionKind::Number, default, min, max)
    }

    pub fn slider(name: impl Into<String>, default: f64, min: f64, max: f64) -> Self {
        Self::bounded(name, OptionKind::Slider, default, Some(min), Some(max))
    }

    fn bounded(
        name: impl Into<String>,
        kind: OptionKind,
        default: f64,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Self {
        let mut spec = Self::raw(name, kind, Value::Null);
        spec.min = min;
        spec.max = max;
        spec.value = Number::from_f64(spec.clamp(default))
            .map(Value::Number)
            .unwrap_or(Value::Null);
        spec
    }

    /// A select defaults to its first item when no default is given.
    pub fn select(name: impl Into<String>, items: Vec<String>, default: Option<&str>) -> Self {
        let value = match default {
            Some(d) => Value::String(d.to_string()),
            None => items
                .first()
                .map(|first| Value::String(first.clone()))
                .unwrap_or(Value::Null),
        };
        let mut spec = Self::raw(name, OptionKind::Select, value);
        spec.items = items;
        spec
    }

    pub fn text(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self::raw(name, OptionKind::Text, Value::String(default.into()))
    }

    pub fn text_input(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self::raw(name, OptionKind::TextInput, Value::String(default.into()))
    }

    pub fn textarea_input(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self::raw(name, OptionKind::TextareaInput, Value::String(default.into()))
    }

    /// Read-only display slot, typically written by the block itself.
    pub fn display(name: impl Into<String>, value: Value) -> Self {
        Self::raw(name, OptionKind::Display, value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn min(&self) -> Option<f64> {
        self.min
    }

    pub fn max(&self) -> Option<f64> {
        self.max
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Replace the current value.
    ///
    /// Numeric values outside `min`/`max` are clamped to the nearest bound. Values of the
    /// wrong shape, select values outside `items` and any value for a button are rejected
    /// with [`ConfigError::InvalidOptionValue`].
    pub fn set_value(&mut self, value: Value) -> Result<(), ConfigError> {
        self.value = self.coerce(value)?;
        Ok(())
    }

    fn clamp(&self, mut n: f64) -> f64 {
        if let Some(min) = self.min {
            n = n.max(min);
        }
        if let Some(max) = self.max {
            n = n.min(max);
        }
        n
    }

    /// Check the current value against the kind, e.g. a select default outside `items`.
    pub(crate) fn validate_default(&self) -> Result<(), ConfigError> {
        match self.kind {
            OptionKind::Button => Ok(()),
            _ => self.coerce(self.value.clone()).map(|_| ()),
        }
    }

    /// Clamp in the integer domain so large values keep full precision.
    fn clamp_i64(&self, mut n: i64) -> i64 {
        if let Some(min) = self.min {
            n = n.max(min.ceil() as i64);
        }
        if let Some(max) = self.max {
            n = n.min(max.floor() as i64);
        }
        n
    }

    fn invalid(&self, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidOptionValue {
            option: self.name.clone(),
            reason: reason.into(),
        }
    }

    fn coerce(&self, value: Value) -> Result<Value, ConfigError> {
        match self.kind {
            OptionKind::Button => Err(self.invalid("button options carry no value")),
            OptionKind::Checkbox => match value {
                Value::Bool(_) => Ok(value),
                other => Err(self.invalid(format!("expected a boolean, got {}", other))),
            },
            OptionKind::Integer => {
                let n = match value.as_i64() {
                    Some(i) => i,
                    None if value.as_u64().is_some() => i64::MAX,
                    None => value
                        .as_f64()
                        .filter(|f| f.fract() == 0.0)
                        .map(|f| f as i64)
                        .ok_or_else(|| self.invalid(format!("expected an integer, got {}", value)))?,
                };
                let clamped = self.clamp_i64(n);
                if clamped == n && value.is_i64() {
                    Ok(value)
                } else {
                    Ok(Value::from(clamped))
                }
            }
            OptionKind::Number | OptionKind::Slider => {
                let n = value
                    .as_f64()
                    .ok_or_else(|| self.invalid(format!("expected a number, got {}", value)))?;
                let clamped = self.clamp(n);
                if clamped == n {
                    return Ok(value);
                }
                Number::from_f64(clamped)
                    .map(Value::Number)
                    .ok_or_else(|| self.invalid("value is not a finite number"))
            }
            OptionKind::Select => match value {
                Value::Null => Ok(Value::Null),
                Value::String(ref s) if self.items.iter().any(|item| item == s) => Ok(value),
                Value::String(s) => Err(self.invalid(format!(
                    "'{}' is not one of [{}]",
                    s,
                    self.items.join(", ")
                ))),
                other => Err(self.invalid(format!("expected a string, got {}", other))),
            },
            OptionKind::Text | OptionKind::TextInput | OptionKind::TextareaInput => match value {
                Value::String(_) => Ok(value),
                other => Err(self.invalid(format!("expected a string, got {}", other))),
            },
            OptionKind::Display => Ok(value),
        }
    }

    pub fn to_descriptor(&self) -> OptionDescriptor {
        let value = match self.kind {
            OptionKind::Button => None,
            _ => Some(self.value.clone()),
        };
        let (min, max) = if self.kind.is_numeric() {
            (self.min, self.max)
        } else {
            (None, None)
        };
        let items = match self.kind {
            OptionKind::Select => Some(self.items.clone()),
            _ => None,
        };
        OptionDescriptor {
            name: self.name.clone(),
            kind: self.kind.to_string(),
            value,
            min,
            max,
            items,
        }
    }

    /// Build a spec from its serialized shape, validating the kind and the default value.
    pub fn from_descriptor(descriptor: &OptionDescriptor) -> Result<Self, ConfigError> {
        let kind: OptionKind = descriptor.kind.parse()?;
        let mut spec = match kind {
            OptionKind::Select => OptionSpec::select(
                descriptor.name.clone(),
                descriptor.items.clone().unwrap_or_default(),
                None,
            ),
            _ => Self::raw(descriptor.name.clone(), kind, Value::Null),
        };
        if kind.is_numeric() {
            spec.min = descriptor.min;
            spec.max = descriptor.max;
        }
        match (&descriptor.value, kind) {
            (_, OptionKind::Button) | (None, _) => {}
            (Some(value), _) => spec.set_value(value.clone())?,
        }
        if spec.value.is_null() {
            spec.value = match kind {
                OptionKind::Checkbox => Value::Bool(false),
                OptionKind::Integer => Value::from(spec.clamp_i64(0)),
                OptionKind::Number | OptionKind::Slider => Number::from_f64(spec.clamp(0.0))
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                OptionKind::Text | OptionKind::TextInput | OptionKind::TextareaInput => {
                    Value::String(String::new())
                }
                _ => Value::Null,
            };
        }
        Ok(spec)
    }
}
