// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in block types.
//!
//! * `Constant` - emits its `value` option
//! * `Scale` - multiplies its input by the `factor` option
//! * `Add` - sums two inputs
//! * `Delay` - waits `delay_ms` without blocking a thread, then forwards its input
//! * `Collector` - publishes its input to a [`ResultSink`](crate::traits::ResultSink)

pub mod add;
pub mod collector;
pub mod constant;
pub mod delay;
pub mod factory;
pub mod scale;

pub use add::AddBlock;
pub use collector::CollectorBlock;
pub use constant::ConstantBlock;
pub use delay::DelayBlock;
pub use factory::LocalBlockFactory;
pub use scale::ScaleBlock;
