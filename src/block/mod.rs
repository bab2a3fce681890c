// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The block data model: interfaces, options, definitions and instances.

mod definition;
mod instance;
mod interface;
mod option;

pub use definition::{BlockDefinition, BlockDefinitionBuilder, BlockDescriptor};
pub use instance::{BlockInstance, RunInfo};
pub use interface::Interface;
pub use option::{OptionDescriptor, OptionKind, OptionSpec};
