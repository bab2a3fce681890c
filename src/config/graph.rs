// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

use serde_json::Value;

use crate::block::BlockInstance;
use crate::config::schema::Endpoint;
use crate::config::DependencyGraph;

/// Instance storage shared between the graph and in-flight units of work.
pub type SharedInstance = Arc<Mutex<BlockInstance>>;

/// Identity of a node, readable without locking its instance.
#[derive(Debug)]
pub struct GraphNode {
    id: String,
    block_type: String,
    title: String,
    instance: SharedInstance,
}

impl GraphNode {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn block_type(&self) -> &str {
        &self.block_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn instance(&self) -> &SharedInstance {
        &self.instance
    }
}

/// A validated output -> input edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub source: Endpoint,
    pub target: Endpoint,
    pub(crate) source_index: usize,
    pub(crate) target_index: usize,
}

/// Input and output values of one instance at a point in time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterfaceSnapshot {
    pub inputs: BTreeMap<String, Value>,
    pub outputs: BTreeMap<String, Value>,
}

/// Block instances plus the connections between them.
///
/// Only produced by the graph builder, so every connection endpoint exists, each input
/// has at most one incoming connection and the dependency view is acyclic.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<GraphNode>,
    index: HashMap<String, usize>,
    connections: Vec<Connection>,
    outgoing: Vec<Vec<usize>>,
    dependencies: DependencyGraph,
}

impl Graph {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(
        instances: Vec<BlockInstance>,
        connections: Vec<Connection>,
        dependencies: DependencyGraph,
    ) -> Self {
        let mut outgoing = vec![Vec::new(); instances.len()];
        for (position, connection) in connections.iter().enumerate() {
            outgoing[connection.source_index].push(position);
        }
        let nodes: Vec<GraphNode> = instances
            .into_iter()
            .map(|instance| GraphNode {
                id: instance.id().to_string(),
                block_type: instance.block_type().to_string(),
                title: instance.title().to_string(),
                instance: Arc::new(Mutex::new(instance)),
            })
            .collect();
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.clone(), i))
            .collect();
        Self {
            nodes,
            index,
            connections,
            outgoing,
            dependencies,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&GraphNode> {
        self.nodes.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn instance(&self, id: &str) -> Option<&SharedInstance> {
        self.index_of(id).map(|i| &self.nodes[i].instance)
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn dependencies(&self) -> &DependencyGraph {
        &self.dependencies
    }

    /// Instance ids in the order the sequential scheduler computes them.
    pub fn execution_order(&self) -> Vec<String> {
        self.dependencies
            .topological_order()
            .unwrap_or_default()
            .into_iter()
            .map(|i| self.nodes[i].id.clone())
            .collect()
    }

    /// Copy every output of `index` into the inputs it is connected to.
    ///
    /// Downstream instances are never in flight while an upstream one settles, so the
    /// locks taken here are uncontended.
    pub(crate) async fn propagate_outputs(&self, index: usize) {
        let Some(positions) = self.outgoing.get(index) else {
            return;
        };
        if positions.is_empty() {
            return;
        }
        let source = self.nodes[index].instance.lock().await;
        for &position in positions {
            let connection = &self.connections[position];
            let value = source
                .output(&connection.source.interface)
                .cloned()
                .unwrap_or(Value::Null);
            let mut target = self.nodes[connection.target_index].instance.lock().await;
            // Endpoints were validated at build time and definitions are immutable.
            let _ = target.set_input(&connection.target.interface, value);
        }
    }

    pub(crate) async fn snapshot(&self, index: usize) -> InterfaceSnapshot {
        let instance = self.nodes[index].instance.lock().await;
        InterfaceSnapshot {
            inputs: instance
                .inputs()
                .iter()
                .map(|i| (i.name.clone(), i.value.clone()))
                .collect(),
            outputs: instance
                .outputs()
                .iter()
                .map(|o| (o.name.clone(), o.value.clone()))
                .collect(),
        }
    }
}
