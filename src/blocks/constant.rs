// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::json;

use crate::block::BlockDefinition;
use crate::errors::ConfigError;

/// Source block - emits its `value` option on `out`
pub struct ConstantBlock;

impl ConstantBlock {
    pub const NAME: &'static str = "Constant";

    pub fn definition() -> Result<BlockDefinition, ConfigError> {
        BlockDefinition::builder(Self::NAME)
            .category("Sources")
            .add_number_option("value", 0.0, None, None)
            .add_output("out")
            .compute_blocking(|instance| {
                let value = instance.option_value("value").cloned().unwrap_or(json!(0.0));
                instance.set_output("out", value)
            })
            .build()
    }
}
