// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::json;

use crate::block::BlockDefinition;
use crate::errors::ConfigError;

/// Sums `a` and `b`; an unconnected operand counts as zero
pub struct AddBlock;

impl AddBlock {
    pub const NAME: &'static str = "Add";

    pub fn definition() -> Result<BlockDefinition, ConfigError> {
        BlockDefinition::builder(Self::NAME)
            .category("Math")
            .add_input_with_default("a", json!(0))
            .add_input_with_default("b", json!(0))
            .add_output("sum")
            .compute_blocking(|instance| {
                let a = instance.require_input_f64("a")?;
                let b = instance.require_input_f64("b")?;
                instance.set_output("sum", json!(a + b))
            })
            .build()
    }
}
