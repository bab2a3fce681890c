// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::time::Duration;

use crate::block::{BlockDefinition, BlockInstance};
use crate::errors::{ComputeError, ConfigError};
use crate::traits::Compute;

/// Waits `delay_ms` milliseconds, then forwards `in` to `out` unchanged.
///
/// The wait suspends rather than blocking a thread, so in concurrent mode independent
/// delays overlap.
pub struct DelayBlock;

impl DelayBlock {
    pub const NAME: &'static str = "Delay";
    pub const MAX_DELAY_MS: i64 = 60_000;

    pub fn definition() -> Result<BlockDefinition, ConfigError> {
        BlockDefinition::builder(Self::NAME)
            .category("Flow")
            .add_input("in")
            .add_integer_option("delay_ms", 100, Some(0), Some(Self::MAX_DELAY_MS))
            .add_output("out")
            .compute_suspending(DelayBlock)
            .build()
    }
}

#[async_trait]
impl Compute for DelayBlock {
    async fn compute(&self, instance: &mut BlockInstance) -> Result<(), ComputeError> {
        let delay_ms = instance.option_i64("delay_ms").unwrap_or(0).max(0) as u64;
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        let value = instance.input("in")?.clone();
        instance.set_output("out", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_delay_forwards_after_waiting() {
        let mut instance = BlockInstance::new("d", Arc::new(DelayBlock::definition().unwrap()));
        instance.set_option("delay_ms", json!(30)).unwrap();
        instance.set_input("in", json!({ "k": 1 })).unwrap();

        let started = std::time::Instant::now();
        DelayBlock.compute(&mut instance).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(30));
        assert_eq!(instance.output("out").unwrap(), &json!({ "k": 1 }));
    }

    #[test]
    fn test_delay_option_is_clamped() {
        let mut instance = BlockInstance::new("d", Arc::new(DelayBlock::definition().unwrap()));
        instance.set_option("delay_ms", json!(-5)).unwrap();
        assert_eq!(instance.option_i64("delay_ms"), Some(0));
    }
}
