// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The façade that ties a block registry, the active graph and the executors together.
//!
//! # Lifecycle
//!
//! ```text
//! configure(registry) -> load_schema(schema) -> run() / run_async(token) -> ...
//! ```
//!
//! A run holds the active graph for its whole duration. Anything that would change the
//! catalogue or the graph while a run is in flight is refused with
//! [`EngineError::Busy`] instead of being queued.
//!
//! Instances keep the definition they were created from. Replacing a definition in the
//! registry affects the next `load_schema`, never the graph that is already active.

use std::sync::{Arc, RwLock};

use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::sync::MutexGuard;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::block::{BlockDefinition, BlockDescriptor};
use crate::config::{build_graph, BlockRegistry, EngineConfig, ExecutionMode, Graph, SchemaDescription};
use crate::engine::factory::ExecutorFactory;
use crate::engine::report::RunReport;
use crate::errors::{ConfigError, EngineError};
use crate::observability::events::{EventReporter, RunEvent};
use crate::observability::messages::engine::{EngineBusy, RegistryConfigured, SchemaLoaded};
use crate::observability::messages::validation::SchemaRejected;
use crate::observability::messages::StructuredLog;
use crate::traits::EventSink;

pub struct ComputeEngine {
    config: EngineConfig,
    registry: RwLock<Arc<BlockRegistry>>,
    graph: tokio::sync::Mutex<Option<Graph>>,
    reporter: EventReporter,
}

impl ComputeEngine {
    /// An engine with an empty catalogue and no schema loaded.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_registry(config, BlockRegistry::new())
    }

    pub fn with_registry(config: EngineConfig, registry: BlockRegistry) -> Self {
        Self {
            config,
            registry: RwLock::new(Arc::new(registry)),
            graph: tokio::sync::Mutex::new(None),
            reporter: EventReporter::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Install `registry` as the catalogue used by the next `load_schema`.
    pub fn configure(&self, registry: BlockRegistry) -> Result<(), EngineError> {
        let _idle = self.lock_idle("configure the registry")?;
        let block_count = registry.len();
        *self.registry_write()? = Arc::new(registry);
        RegistryConfigured { block_count }.log();
        Ok(())
    }

    /// Add or replace a single definition in the current catalogue.
    pub fn register_block(&self, definition: BlockDefinition) -> Result<(), EngineError> {
        let _idle = self.lock_idle("register a block")?;
        let mut registry = self.registry_write()?;
        Arc::make_mut(&mut *registry).register(definition)?;
        Ok(())
    }

    /// The current catalogue. Later `configure` calls do not affect the returned handle.
    pub fn registry(&self) -> Result<Arc<BlockRegistry>, EngineError> {
        self.registry
            .read()
            .map(|registry| Arc::clone(&*registry))
            .map_err(|_| EngineError::Internal("block registry lock poisoned".to_string()))
    }

    /// Serializable descriptions of every registered block type.
    pub fn export_blocks(&self) -> Result<Vec<BlockDescriptor>, EngineError> {
        Ok(self.registry()?.export())
    }

    /// Build `schema` against the current catalogue and make it the active graph.
    ///
    /// `None` or an empty schema activates an empty graph. On error the previously active
    /// graph is left untouched.
    pub fn load_schema(&self, schema: Option<&SchemaDescription>) -> Result<(), EngineError> {
        let mut active = self.lock_idle("load a schema")?;
        let registry = self.registry()?;
        match build_graph(schema, &registry) {
            Ok(graph) => {
                SchemaLoaded {
                    instance_count: graph.len(),
                    connection_count: graph.connections().len(),
                }
                .log();
                *active = Some(graph);
                Ok(())
            }
            Err(err) => {
                SchemaRejected { error: &err }.log();
                Err(err.into())
            }
        }
    }

    /// Instance ids in sequential execution order.
    pub fn execution_order(&self) -> Result<Vec<String>, EngineError> {
        let active = self.lock_idle("inspect the graph")?;
        let graph = active.as_ref().ok_or(EngineError::NotConfigured)?;
        Ok(graph.execution_order())
    }

    /// Change one option of a loaded instance between runs.
    pub fn set_option(
        &self,
        instance_id: &str,
        option: &str,
        value: Value,
    ) -> Result<(), EngineError> {
        let active = self.lock_idle("set an option")?;
        let graph = active.as_ref().ok_or(EngineError::NotConfigured)?;
        let shared = graph
            .instance(instance_id)
            .ok_or_else(|| ConfigError::UnknownInstance {
                instance_id: instance_id.to_string(),
            })?;
        let mut instance = shared.try_lock().map_err(|_| self.busy("set an option"))?;
        instance.set_option(option, value)?;
        Ok(())
    }

    pub fn add_sink(&self, sink: Arc<dyn EventSink>) {
        self.reporter.add_sink(sink);
    }

    /// Receive every event emitted from now on.
    pub fn subscribe(&self) -> UnboundedReceiver<RunEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.reporter.add_sink(Arc::new(tx));
        rx
    }

    /// Run every instance once, one at a time, in dependency order.
    pub async fn run(&self) -> Result<RunReport, EngineError> {
        self.execute_with(ExecutionMode::Sequential, CancellationToken::new())
            .await
    }

    /// Run every instance once, dispatching ready instances concurrently.
    pub async fn run_async(&self, cancel: CancellationToken) -> Result<RunReport, EngineError> {
        self.execute_with(ExecutionMode::Concurrent, cancel).await
    }

    /// Run with the configured mode.
    pub async fn execute(&self, cancel: CancellationToken) -> Result<RunReport, EngineError> {
        self.execute_with(self.config.mode, cancel).await
    }

    /// Start a run on its own task.
    pub fn spawn(
        self: &Arc<Self>,
        cancel: CancellationToken,
    ) -> JoinHandle<Result<RunReport, EngineError>> {
        let engine = Arc::clone(self);
        tokio::spawn(async move { engine.execute(cancel).await })
    }

    async fn execute_with(
        &self,
        mode: ExecutionMode,
        cancel: CancellationToken,
    ) -> Result<RunReport, EngineError> {
        let active = self.lock_idle("start a run")?;
        let graph = active.as_ref().ok_or(EngineError::NotConfigured)?;
        let executor = ExecutorFactory::create(mode, &self.config);
        executor.execute(graph, &self.reporter, cancel).await
    }

    fn lock_idle(
        &self,
        operation: &'static str,
    ) -> Result<MutexGuard<'_, Option<Graph>>, EngineError> {
        self.graph.try_lock().map_err(|_| self.busy(operation))
    }

    fn busy(&self, operation: &'static str) -> EngineError {
        EngineBusy { operation }.log();
        EngineError::Busy { operation }
    }

    fn registry_write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, Arc<BlockRegistry>>, EngineError> {
        self.registry
            .write()
            .map_err(|_| EngineError::Internal("block registry lock poisoned".to_string()))
    }
}

impl std::fmt::Debug for ComputeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComputeEngine")
            .field("config", &self.config)
            .field("reporter", &self.reporter)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn engine() -> ComputeEngine {
        let engine = ComputeEngine::new(EngineConfig::default());
        engine
            .register_block(
                BlockDefinition::builder("Source")
                    .add_number_option("value", 1.0, None, None)
                    .add_output("out")
                    .compute_blocking(|i| {
                        let value = i.option_f64("value").unwrap_or_default();
                        i.set_output("out", json!(value))
                    })
                    .build()
                    .unwrap(),
            )
            .unwrap();
        engine
    }

    #[tokio::test]
    async fn test_run_before_load_is_not_configured() {
        let engine = engine();
        assert!(matches!(engine.run().await, Err(EngineError::NotConfigured)));
        assert!(matches!(
            engine.execution_order(),
            Err(EngineError::NotConfigured)
        ));
    }

    #[tokio::test]
    async fn test_empty_schema_runs_successfully() {
        let engine = engine();
        engine.load_schema(None).unwrap();

        let report = engine.run().await.unwrap();

        assert!(report.success());
        assert!(report.instances.is_empty());
    }

    #[tokio::test]
    async fn test_set_option_applies_to_next_run() {
        let engine = engine();
        let schema = SchemaDescription::new().node("s", "Source");
        engine.load_schema(Some(&schema)).unwrap();

        engine.set_option("s", "value", json!(4.5)).unwrap();
        let report = engine.run().await.unwrap();

        assert_eq!(report.output("s", "out"), Some(&json!(4.5)));
    }

    #[test]
    fn test_set_option_on_unknown_instance() {
        let engine = engine();
        engine.load_schema(None).unwrap();

        let err = engine.set_option("ghost", "value", json!(1)).unwrap_err();

        assert!(matches!(
            err,
            EngineError::Config(ConfigError::UnknownInstance { .. })
        ));
    }

    #[test]
    fn test_export_blocks_lists_registered_types() {
        let engine = engine();
        let exported = engine.export_blocks().unwrap();
        assert_eq!(exported.len(), 1);
        assert_eq!(exported[0].name, "Source");
    }

    #[tokio::test]
    async fn test_subscribe_receives_run_events() {
        let engine = engine();
        let mut events = engine.subscribe();
        engine.load_schema(None).unwrap();

        engine.run().await.unwrap();

        assert!(matches!(
            events.recv().await,
            Some(RunEvent::RunStarted { .. })
        ));
        assert!(matches!(
            events.recv().await,
            Some(RunEvent::RunFinished { .. })
        ));
    }

    #[tokio::test]
    async fn test_dropped_subscriptions_are_released() {
        let engine = engine();
        engine.load_schema(None).unwrap();
        for _ in 0..100 {
            drop(engine.subscribe());
        }
        let mut live = engine.subscribe();
        assert_eq!(engine.reporter.sink_count(), 101);

        engine.run().await.unwrap();

        assert_eq!(engine.reporter.sink_count(), 1);
        assert!(matches!(live.recv().await, Some(RunEvent::RunStarted { .. })));
    }
}
