// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod dependency_graph;
mod graph;
mod graph_builder;
mod loader;
mod registry;
mod runtime;
mod schema;
mod validation;

#[cfg(test)]
mod integration_tests;
pub mod consts;

pub use dependency_graph::DependencyGraph;
pub use graph::{Connection, Graph, GraphNode, InterfaceSnapshot, SharedInstance};
pub use graph_builder::build_graph;
pub use loader::{
    load_and_validate_config, load_config, validate_config, EngineConfig, ExecutionMode,
    ExecutorOptions,
};
pub use registry::BlockRegistry;
pub use runtime::RuntimeBuilder;
pub use schema::{
    load_schema_file, ConnectionDescription, Endpoint, NodeDescription, SchemaDescription,
};
pub use validation::{find_cycle, validate_acyclic};
