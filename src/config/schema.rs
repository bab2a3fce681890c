// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Serialized graph descriptions as produced by an editor.
//!
//! ```yaml
//! nodes:
//!   - id: a
//!     type: Constant
//!     options: { value: 5 }
//!   - id: b
//!     type: Scale
//!     title: Doubler
//! connections:
//!   - from: { node: a, interface: value }
//!     to: { node: b, interface: in }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::errors::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescription {
    #[serde(default)]
    pub nodes: Vec<NodeDescription>,
    #[serde(default)]
    pub connections: Vec<ConnectionDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDescription {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Option values applied over the definition's defaults
    #[serde(default)]
    pub options: BTreeMap<String, Value>,
    /// Literal values for inputs; a connection into the same input overrides them at run time
    #[serde(default)]
    pub inputs: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub node: String,
    pub interface: String,
}

impl Endpoint {
    pub fn new(node: impl Into<String>, interface: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            interface: interface.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionDescription {
    pub from: Endpoint,
    pub to: Endpoint,
}

impl SchemaDescription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.connections.is_empty()
    }

    /// Append a node; chainable for building schemas in code.
    pub fn node(mut self, id: impl Into<String>, block_type: impl Into<String>) -> Self {
        self.nodes.push(NodeDescription {
            id: id.into(),
            block_type: block_type.into(),
            title: None,
            options: BTreeMap::new(),
            inputs: BTreeMap::new(),
        });
        self
    }

    /// Set an option value on the most recently added node.
    pub fn with_option(mut self, name: impl Into<String>, value: Value) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.options.insert(name.into(), value);
        }
        self
    }

    /// Set a literal input value on the most recently added node.
    pub fn with_input(mut self, name: impl Into<String>, value: Value) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.inputs.insert(name.into(), value);
        }
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        if let Some(node) = self.nodes.last_mut() {
            node.title = Some(title.into());
        }
        self
    }

    pub fn connect(
        mut self,
        from_node: impl Into<String>,
        from_interface: impl Into<String>,
        to_node: impl Into<String>,
        to_interface: impl Into<String>,
    ) -> Self {
        self.connections.push(ConnectionDescription {
            from: Endpoint::new(from_node, from_interface),
            to: Endpoint::new(to_node, to_interface),
        });
        self
    }

    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }
}

/// Read a schema from disk: `.json` files as JSON, anything else as YAML.
pub fn load_schema_file<P: AsRef<Path>>(path: P) -> Result<SchemaDescription, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => SchemaDescription::from_json_str(&content).map_err(|e| e.to_string()),
        _ => SchemaDescription::from_yaml_str(&content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}
