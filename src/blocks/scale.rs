// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::json;

use crate::block::BlockDefinition;
use crate::errors::ConfigError;

/// Multiplies `in` by the `factor` option
pub struct ScaleBlock;

impl ScaleBlock {
    pub const NAME: &'static str = "Scale";

    pub fn definition() -> Result<BlockDefinition, ConfigError> {
        BlockDefinition::builder(Self::NAME)
            .category("Math")
            .add_input("in")
            .add_number_option("factor", 2.0, None, None)
            .add_output("out")
            .compute_blocking(|instance| {
                let value = instance.require_input_f64("in")?;
                let factor = instance.option_f64("factor").unwrap_or(1.0);
                instance.set_output("out", json!(value * factor))
            })
            .build()
    }
}
