//! # Exec Translator
//!
//! Lowers a finalized `AggregatePlanNode` into a [`PipelineDescriptor`].
//!
//! ## Input Partitioning
//!
//! The runtime needs every row of a group in one partition. A global aggregate
//! (no grouping keys) therefore reads a single gathered partition; a grouped aggregate
//! reads its input hash-partitioned on the grouping keys.
//!
//! ## Barrier Semantics
//!
//! User-defined aggregate functions only produce a result once they have seen every row
//! of their group, and the operator does not know a group is complete until its input
//! partition ends. The descriptor is marked blocking and its input is `END_INPUT`.
//!
//! Translation performs no I/O and cannot fail for a node that passed validation.

use crate::descriptor::{DamBehavior, InputProperty, PipelineDescriptor, RequiredDistribution};
use aggx_core::AggregatePlanNode;
use tracing::debug;

pub const GROUP_AGGREGATE: &str = "GroupAggregate";

pub fn translate_aggregate(node: &AggregatePlanNode) -> PipelineDescriptor {
    let required_distribution = if node.is_global() {
        RequiredDistribution::Singleton
    } else {
        RequiredDistribution::Hash {
            keys: node.grouping().to_vec(),
        }
    };

    let key_columns: Vec<usize> = node
        .grouping()
        .iter()
        .chain(node.aux_grouping())
        .copied()
        .collect();

    let descriptor = PipelineDescriptor {
        operator: GROUP_AGGREGATE.to_string(),
        input_property: InputProperty {
            required_distribution,
            dam_behavior: DamBehavior::EndInput,
        },
        blocking: true,
        key_columns,
        grouping: node.grouping().to_vec(),
        aux_grouping: node.aux_grouping().to_vec(),
        agg_calls: node.agg_calls().to_vec(),
        input_schema: node.input().schema().clone(),
        output_schema: node.output_schema().clone(),
        description: node.explain(),
    };
    debug!(
        "Translated {} with input {:?}",
        descriptor.description, descriptor.input_property.required_distribution
    );
    descriptor
}
