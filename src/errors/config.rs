// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while registering blocks, building a graph or loading configuration.
///
/// Every variant is reported synchronously by the operation that detected it, and the
/// operation leaves the previously active state untouched.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No block definition is registered under the requested type tag
    #[error("unknown block type '{block_type}'")]
    UnknownBlockType { block_type: String },

    /// Two inputs, outputs or options of one definition share a name
    #[error("block '{block}' declares '{name}' more than once across its inputs, outputs and options")]
    DuplicateInterfaceName { block: String, name: String },

    /// An option kind outside the supported set
    #[error("invalid option kind '{kind}'")]
    InvalidOptionKind { kind: String },

    /// A value that does not fit the option's kind, or a select value outside its items
    #[error("invalid value for option '{option}': {reason}")]
    InvalidOptionValue { option: String, reason: String },

    /// The destination input already has an incoming connection
    #[error("input '{interface}' of instance '{instance_id}' is already connected")]
    DuplicateInputConnection { instance_id: String, interface: String },

    /// The instance dependency graph is not acyclic
    #[error("cyclic graph detected: {}", cycle.join(" -> "))]
    CyclicGraph { cycle: Vec<String> },

    /// Two schema nodes share an id
    #[error("duplicate instance id '{instance_id}'")]
    DuplicateInstanceId { instance_id: String },

    /// A connection refers to an instance id that is not part of the schema
    #[error("connection refers to unknown instance '{instance_id}'")]
    UnknownInstance { instance_id: String },

    /// A connection or input value refers to an interface the instance does not have
    #[error("instance '{instance_id}' has no {direction} named '{interface}'")]
    UnknownInterface {
        instance_id: String,
        direction: &'static str,
        interface: String,
    },

    /// A schema node sets an option its block does not declare
    #[error("instance '{instance_id}' has no option named '{option}'")]
    UnknownOption { instance_id: String, option: String },

    /// A configuration value outside its accepted range
    #[error("invalid setting '{setting}': {reason}")]
    InvalidSetting { setting: String, reason: String },

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_lists_path() {
        let err = ConfigError::CyclicGraph {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "cyclic graph detected: a -> b -> a");
    }

    #[test]
    fn test_unknown_interface_names_direction() {
        let err = ConfigError::UnknownInterface {
            instance_id: "scale".into(),
            direction: "output",
            interface: "nope".into(),
        };
        assert_eq!(err.to_string(), "instance 'scale' has no output named 'nope'");
    }
}
