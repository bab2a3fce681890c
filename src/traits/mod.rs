pub mod compute;
pub mod executor;
pub mod sink;

pub use compute::{BlockingFn, Compute, ComputeFn};
pub use executor::GraphExecutor;
pub use sink::{CollectingSink, EventSink, MemoryResultSink, PublishedResult, ResultSink};
