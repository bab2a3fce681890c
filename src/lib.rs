// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod block;      // interfaces, options, definitions, instances
pub mod blocks;     // built-in block types
pub mod config;     // registry, schema, graph builder, engine config
pub mod engine;     // schedulers + compute engine facade
pub mod errors;     // error handling
pub mod observability;
pub mod traits;     // compute, executor and sink abstractions
