// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet};

use crate::block::BlockInstance;
use crate::config::graph::{Connection, Graph};
use crate::config::schema::SchemaDescription;
use crate::config::validation::validate_acyclic;
use crate::config::{BlockRegistry, DependencyGraph};
use crate::errors::ConfigError;

/// Build a runnable graph from a schema description.
///
/// The pipeline runs in order and stops at the first error:
///
/// 1. **Instantiation** - every node becomes an instance of its registered type, with
///    its title, option values and literal input values applied
/// 2. **Connection validation** - both endpoints exist and each destination input is
///    connected at most once
/// 3. **Cycle detection** - the induced instance dependency graph must be acyclic
///
/// `None` (or an empty description) yields an empty graph.
pub fn build_graph(
    schema: Option<&SchemaDescription>,
    registry: &BlockRegistry,
) -> Result<Graph, ConfigError> {
    let Some(schema) = schema else {
        return Ok(Graph::empty());
    };

    let mut instances = Vec::with_capacity(schema.nodes.len());
    let mut index: HashMap<&str, usize> = HashMap::new();

    for node in &schema.nodes {
        if index.contains_key(node.id.as_str()) {
            return Err(ConfigError::DuplicateInstanceId {
                instance_id: node.id.clone(),
            });
        }
        let mut instance = registry.instantiate(&node.block_type, &node.id)?;
        if let Some(title) = &node.title {
            instance.set_title(title.clone());
        }
        for (name, value) in &node.options {
            instance.set_option(name, value.clone())?;
        }
        for (name, value) in &node.inputs {
            instance
                .set_input(name, value.clone())
                .map_err(|_| ConfigError::UnknownInterface {
                    instance_id: node.id.clone(),
                    direction: "input",
                    interface: name.clone(),
                })?;
        }
        index.insert(node.id.as_str(), instances.len());
        instances.push(instance);
    }

    let mut dependencies = DependencyGraph::new(instances.len());
    let mut connected_inputs: HashSet<(usize, &str)> = HashSet::new();
    let mut connections = Vec::with_capacity(schema.connections.len());

    for description in &schema.connections {
        let source_index = resolve(&index, &description.from.node)?;
        let target_index = resolve(&index, &description.to.node)?;

        check_interface(&instances[source_index], &description.from.interface, "output")?;
        check_interface(&instances[target_index], &description.to.interface, "input")?;

        if !connected_inputs.insert((target_index, description.to.interface.as_str())) {
            return Err(ConfigError::DuplicateInputConnection {
                instance_id: description.to.node.clone(),
                interface: description.to.interface.clone(),
            });
        }

        dependencies.add_edge(source_index, target_index);
        connections.push(Connection {
            source: description.from.clone(),
            target: description.to.clone(),
            source_index,
            target_index,
        });
    }

    let ids: Vec<&str> = instances.iter().map(BlockInstance::id).collect();
    validate_acyclic(&dependencies, &ids)?;

    Ok(Graph::from_parts(instances, connections, dependencies))
}

fn resolve(index: &HashMap<&str, usize>, id: &str) -> Result<usize, ConfigError> {
    index
        .get(id)
        .copied()
        .ok_or_else(|| ConfigError::UnknownInstance {
            instance_id: id.to_string(),
        })
}

fn check_interface(
    instance: &BlockInstance,
    interface: &str,
    direction: &'static str,
) -> Result<(), ConfigError> {
    let definition = instance.definition();
    let exists = match direction {
        "output" => definition.has_output(interface),
        _ => definition.has_input(interface),
    };
    if exists {
        Ok(())
    } else {
        Err(ConfigError::UnknownInterface {
            instance_id: instance.id().to_string(),
            direction,
            interface: interface.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockDefinition;
    use serde_json::json;

    fn registry() -> BlockRegistry {
        let mut registry = BlockRegistry::new();
        registry
            .register(
                BlockDefinition::builder("Source")
                    .add_output("out")
                    .add_number_option("value", 0.0, None, None)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        registry
            .register(
                BlockDefinition::builder("Pass")
                    .add_input("in")
                    .add_output("out")
                    .build()
                    .unwrap(),
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_none_and_empty_schema_build_empty_graph() {
        let registry = registry();
        assert!(build_graph(None, &registry).unwrap().is_empty());
        assert!(build_graph(Some(&SchemaDescription::new()), &registry)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_builds_instances_and_dependencies() {
        let schema = SchemaDescription::new()
            .node("a", "Source")
            .with_option("value", json!(5))
            .node("b", "Pass")
            .with_title("Middle")
            .node("c", "Pass")
            .connect("a", "out", "b", "in")
            .connect("b", "out", "c", "in");

        let graph = build_graph(Some(&schema), &registry()).unwrap();
        assert_eq!(graph.len(), 3);
        assert_eq!(graph.connections().len(), 2);
        assert_eq!(graph.nodes()[1].title(), "Middle");
        assert_eq!(graph.execution_order(), vec!["a", "b", "c"]);
        assert_eq!(graph.dependencies().in_degrees(), &[0, 1, 1]);
    }

    #[test]
    fn test_unknown_block_type_propagates() {
        let schema = SchemaDescription::new().node("x", "Nope");
        let err = build_graph(Some(&schema), &registry()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownBlockType { .. }));
    }

    #[test]
    fn test_duplicate_instance_ids_are_rejected() {
        let schema = SchemaDescription::new().node("a", "Source").node("a", "Pass");
        let err = build_graph(Some(&schema), &registry()).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateInstanceId { .. }));
    }

    #[test]
    fn test_fan_in_is_exclusive() {
        let schema = SchemaDescription::new()
            .node("a", "Source")
            .node("b", "Source")
            .node("c", "Pass")
            .connect("a", "out", "c", "in")
            .connect("b", "out", "c", "in");
        let err = build_graph(Some(&schema), &registry()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DuplicateInputConnection { ref instance_id, ref interface }
                if instance_id == "c" && interface == "in"
        ));
    }

    #[test]
    fn test_fan_out_is_unlimited() {
        let schema = SchemaDescription::new()
            .node("a", "Source")
            .node("b", "Pass")
            .node("c", "Pass")
            .connect("a", "out", "b", "in")
            .connect("a", "out", "c", "in");
        assert!(build_graph(Some(&schema), &registry()).is_ok());
    }

    #[test]
    fn test_connection_endpoints_are_validated() {
        let unknown_node = SchemaDescription::new()
            .node("a", "Source")
            .connect("a", "out", "ghost", "in");
        assert!(matches!(
            build_graph(Some(&unknown_node), &registry()).unwrap_err(),
            ConfigError::UnknownInstance { .. }
        ));

        // Inputs cannot be used as connection sources
        let wrong_direction = SchemaDescription::new()
            .node("a", "Pass")
            .node("b", "Pass")
            .connect("a", "in", "b", "in");
        assert!(matches!(
            build_graph(Some(&wrong_direction), &registry()).unwrap_err(),
            ConfigError::UnknownInterface { direction: "output", .. }
        ));
    }

    #[test]
    fn test_cycles_are_rejected_with_path() {
        let schema = SchemaDescription::new()
            .node("a", "Pass")
            .node("b", "Pass")
            .connect("a", "out", "b", "in")
            .connect("b", "out", "a", "in");
        match build_graph(Some(&schema), &registry()).unwrap_err() {
            ConfigError::CyclicGraph { cycle } => assert_eq!(cycle, vec!["a", "b", "a"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_option_values_are_rejected() {
        let schema = SchemaDescription::new()
            .node("a", "Source")
            .with_option("value", json!("five"));
        assert!(matches!(
            build_graph(Some(&schema), &registry()).unwrap_err(),
            ConfigError::InvalidOptionValue { .. }
        ));

        let unknown = SchemaDescription::new()
            .node("a", "Source")
            .with_option("gain", json!(1));
        assert!(matches!(
            build_graph(Some(&unknown), &registry()).unwrap_err(),
            ConfigError::UnknownOption { .. }
        ));
    }

    #[test]
    fn test_literal_input_values_are_applied() {
        let schema = SchemaDescription::new()
            .node("p", "Pass")
            .with_input("in", json!(3));
        let graph = build_graph(Some(&schema), &registry()).unwrap();
        let instance = graph.instance("p").unwrap().try_lock().unwrap();
        assert_eq!(instance.input("in").unwrap(), &json!(3));
    }
}
