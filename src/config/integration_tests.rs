#[cfg(test)]
mod integration_tests {
    use std::sync::Arc;

    use crate::blocks::LocalBlockFactory;
    use crate::config::{
        build_graph, load_and_validate_config, load_schema_file, ExecutionMode,
    };
    use crate::errors::{ConfigError, FailureStrategy};
    use crate::traits::MemoryResultSink;

    /// Test that YAML engine configurations can be loaded and parsed correctly
    #[test]
    fn test_sequential_engine_yaml_loading() {
        let config = load_and_validate_config("configs/engine-sequential.yaml").unwrap();

        assert_eq!(config.mode, ExecutionMode::Sequential);
        assert_eq!(config.failure_strategy, FailureStrategy::FailFast);
        assert_eq!(config.executor_options.max_concurrency, None);
        assert_eq!(config.log_filter(), "info,blockflow=debug");
    }

    #[test]
    fn test_concurrent_engine_toml_loading() {
        let config = load_and_validate_config("configs/engine-concurrent.toml").unwrap();

        assert_eq!(config.mode, ExecutionMode::Concurrent);
        assert_eq!(config.failure_strategy, FailureStrategy::ContinueOnError);
        assert_eq!(config.executor_options.max_concurrency, Some(4));
    }

    /// Every shipped schema except the cyclic one builds against the built-in blocks
    #[test]
    fn test_shipped_schemas_build_with_builtin_blocks() {
        let registry = LocalBlockFactory::registry(Arc::new(MemoryResultSink::new())).unwrap();

        let doubled = load_schema_file("configs/double-and-record.json").unwrap();
        let graph = build_graph(Some(&doubled), &registry).unwrap();
        assert_eq!(graph.execution_order(), vec!["source", "double", "record"]);
        assert_eq!(graph.node(1).unwrap().title(), "Doubler");

        let parallel = load_schema_file("configs/parallel-delays.yaml").unwrap();
        let graph = build_graph(Some(&parallel), &registry).unwrap();
        assert_eq!(graph.len(), 6);
        assert_eq!(graph.connections().len(), 5);
    }

    #[test]
    fn test_cyclic_schema_is_rejected() {
        let registry = LocalBlockFactory::registry(Arc::new(MemoryResultSink::new())).unwrap();
        let schema = load_schema_file("configs/cyclic.yaml").unwrap();

        let err = build_graph(Some(&schema), &registry).unwrap_err();

        match err {
            ConfigError::CyclicGraph { cycle } => {
                assert!(cycle.contains(&"a".to_string()));
                assert!(cycle.contains(&"b".to_string()));
            }
            other => panic!("expected a cycle error, got {}", other),
        }
    }

    #[test]
    fn test_missing_schema_file_reports_io_error() {
        let err = load_schema_file("configs/does-not-exist.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
