//! # aggx-exec: Planning-to-Execution Handoff
//!
//! Once the optimizer has settled on a physical plan, each group aggregate in it is lowered
//! exactly once into a [`PipelineDescriptor`]: the required input partitioning, the
//! operator's blocking behavior, its key column layout, aggregate calls and output schema.
//! The descriptor is the complete contract with the runtime; nothing else about the
//! planner's data structures leaks into execution.
//!
//! ## Module Overview
//!
//! - **`descriptor`**: The serializable descriptor types.
//! - **`translator`**: `AggregatePlanNode` -> `PipelineDescriptor`.

pub mod descriptor;
pub mod translator;

pub use descriptor::{DamBehavior, InputProperty, PipelineDescriptor, RequiredDistribution};
pub use translator::translate_aggregate;
