//! # Pipeline Descriptors
//!
//! A `PipelineDescriptor` is everything the runtime needs to instantiate one operator of an
//! executable pipeline. It is the only artifact that crosses from planning into execution
//! for the group aggregate, and it serializes to camelCase JSON for runtimes that live in
//! another process.

use aggx_core::expr::{AggregateCall, Schema};
use serde::{Deserialize, Serialize};

/// How the runtime must partition an operator's input before feeding it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RequiredDistribution {
    /// All rows gathered into a single partition.
    Singleton,
    /// Rows hash-partitioned on the given input columns.
    Hash { keys: Vec<usize> },
}

/// When an operator may start producing output relative to consuming an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DamBehavior {
    /// Output starts only after the input has been fully consumed.
    EndInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputProperty {
    pub required_distribution: RequiredDistribution,
    pub dam_behavior: DamBehavior,
}

/// Executable description of one operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineDescriptor {
    /// Operator kind, e.g. `GroupAggregate`.
    pub operator: String,
    pub input_property: InputProperty,
    /// The operator must consume its whole input partition before emitting any row.
    pub blocking: bool,
    /// Input columns that form the output key prefix: grouping keys, then auxiliary keys.
    pub key_columns: Vec<usize>,
    pub grouping: Vec<usize>,
    pub aux_grouping: Vec<usize>,
    pub agg_calls: Vec<AggregateCall>,
    pub input_schema: Schema,
    pub output_schema: Schema,
    /// Human-readable summary for diagnostics.
    pub description: String,
}

impl PipelineDescriptor {
    pub fn is_blocking(&self) -> bool {
        self.blocking
    }
}
