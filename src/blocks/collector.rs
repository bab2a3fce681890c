// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::json;
use std::sync::Arc;

use crate::block::BlockDefinition;
use crate::errors::ConfigError;
use crate::traits::ResultSink;

/// Sink block - publishes `in` under its `label` option.
///
/// The last value and a running count are kept in the instance state, so they survive
/// between runs of the same graph.
pub struct CollectorBlock;

impl CollectorBlock {
    pub const NAME: &'static str = "Collector";

    pub fn definition(results: Arc<dyn ResultSink>) -> Result<BlockDefinition, ConfigError> {
        BlockDefinition::builder(Self::NAME)
            .category("Sinks")
            .add_input("in")
            .add_text_option("label", "result")
            .compute_blocking(move |instance| {
                let value = instance.require_input("in")?.clone();
                let label = instance.option_str("label").unwrap_or("result").to_string();
                results.publish(instance.id(), &label, &value);

                let count = instance
                    .state("count")
                    .and_then(|c| c.as_u64())
                    .unwrap_or(0);
                instance.set_state("count", json!(count + 1))?;
                instance.set_state("last", value)
            })
            .build()
    }
}
