/// State key reserved for engine-maintained run statistics
pub const INFO_STATE_KEY: &str = "info";
/// Fallback tracing filter when neither `RUST_LOG` nor the config sets one
pub const DEFAULT_LOG_FILTER: &str = "info";
/// Upper bound accepted for `executor_options.max_concurrency`
pub const MAX_CONCURRENCY_LIMIT: usize = 4096;
