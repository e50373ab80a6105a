//! # Trait Satisfaction for Group Aggregates
//!
//! Given an aggregate node and the physical properties its consumer requires, decide
//! whether the aggregate can deliver them by choosing what it requires from its own
//! input, and if so build the rewritten node.
//!
//! ## Decision Procedure
//!
//! 1. **Feasibility**, by required distribution (`n` = number of grouping keys, and
//!    `[0..n)` the output positions of the grouping columns):
//!    - `Singleton`: only a global aggregate (`n == 0`) naturally produces one partition.
//!    - strict `Hash(keys)`: `keys` must be exactly `[0..n)`.
//!    - relaxed `Hash(keys)`: `keys` is a prefix of `[0..n)`, or, when
//!      `table.optimizer.shuffle-by-partial-key-enabled` is set, any list of grouping
//!      positions.
//!    - anything else: infeasible.
//! 2. **Input requirement**: `Singleton` stays `Singleton`; exact and prefix matches hash
//!    the input on all grouping keys (strict and relaxed respectively); a partial-key match
//!    maps each required output position `p` to input column `grouping[p]` and hashes the
//!    input on those columns only.
//! 3. **Collation**: the aggregate emits rows ascending on its grouping columns. If that
//!    order meets the required collation it is advertised; otherwise no order is.
//! 4. **Rewrite**: the child is converted under the input requirement and the node is
//!    copied with the new traits and the converted child.
//!
//! An infeasible requirement is not an error: the result is `None` and the optimizer
//! moves on to other alternatives.

use crate::aggregate::AggregatePlanNode;
use crate::config::TableConfig;
use crate::convert::TraitConverter;
use crate::properties::{Collation, Distribution, PhysicalPropertySet, SortKey};
use tracing::{debug, trace};

/// Read-only collaborators handed to the engine by the host optimizer.
pub struct OptContext<'a> {
    pub config: &'a dyn TableConfig,
    pub converter: &'a dyn TraitConverter,
}

/// How a feasible distribution requirement is met.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementMatch {
    /// Global aggregate asked for a single partition.
    Singleton,
    /// Strict hash on exactly the grouping positions.
    Exact,
    /// Relaxed hash on a prefix of the grouping positions.
    Prefix,
    /// Relaxed hash on a non-prefix subset of the grouping positions (output space).
    PartialKey(Vec<usize>),
}

/// Step 1: classify `required` against `node`, or `None` if it cannot be met.
pub fn classify_requirement(
    node: &AggregatePlanNode,
    required: &Distribution,
    partial_key_enabled: bool,
) -> Option<RequirementMatch> {
    match required {
        Distribution::Singleton => node.is_global().then_some(RequirementMatch::Singleton),
        Distribution::Hash { keys, strict } => {
            classify_hash(node, keys, *strict, partial_key_enabled)
        }
        Distribution::Any | Distribution::Broadcast | Distribution::RoundRobin => None,
    }
}

fn classify_hash(
    node: &AggregatePlanNode,
    keys: &[usize],
    strict: bool,
    partial_key_enabled: bool,
) -> Option<RequirementMatch> {
    let group_positions = node.group_positions();
    if strict {
        return (keys == group_positions.as_slice()).then_some(RequirementMatch::Exact);
    }
    if group_positions.starts_with(keys) {
        return Some(RequirementMatch::Prefix);
    }
    if partial_key_enabled && keys.iter().all(|k| group_positions.contains(k)) {
        return Some(RequirementMatch::PartialKey(keys.to_vec()));
    }
    None
}

/// Whether `required` is feasible for `node` at all.
pub fn can_satisfy(
    node: &AggregatePlanNode,
    required: &Distribution,
    partial_key_enabled: bool,
) -> bool {
    classify_requirement(node, required, partial_key_enabled).is_some()
}

/// Step 2: the distribution the node's input must provide, in input-column space.
pub fn derive_input_distribution(
    node: &AggregatePlanNode,
    matched: &RequirementMatch,
) -> Distribution {
    match matched {
        RequirementMatch::Singleton => Distribution::Singleton,
        RequirementMatch::Exact => Distribution::hash(node.grouping().to_vec(), true),
        RequirementMatch::Prefix => Distribution::hash(node.grouping().to_vec(), false),
        RequirementMatch::PartialKey(positions) => {
            let keys = positions.iter().map(|&p| node.grouping()[p]).collect();
            Distribution::hash(keys, false)
        }
    }
}

/// Step 3: the order the aggregate emits rows in, in output-position space.
pub fn derive_provided_collation(node: &AggregatePlanNode) -> Collation {
    if node.is_global() {
        return Collation::empty();
    }
    Collation::new(node.group_positions().into_iter().map(SortKey::asc).collect())
}

/// Try to rewrite `node` so that it provides `required`.
pub fn attempt_satisfy(
    node: &AggregatePlanNode,
    required: &PhysicalPropertySet,
    ctx: &OptContext,
) -> Option<AggregatePlanNode> {
    let partial_key_enabled = ctx.config.shuffle_by_partial_key_enabled();
    let Some(matched) = classify_requirement(node, &required.distribution, partial_key_enabled)
    else {
        debug!(
            "{} cannot satisfy {} (partial key shuffle {})",
            node.explain(),
            required.distribution,
            if partial_key_enabled { "enabled" } else { "disabled" }
        );
        return None;
    };

    let input_distribution = derive_input_distribution(node, &matched);
    trace!(
        "Requirement {} matched as {:?}, input must provide {}",
        required.distribution,
        matched,
        input_distribution
    );

    let provided_collation = derive_provided_collation(node);
    let collation = if provided_collation.satisfies(&required.collation) {
        provided_collation
    } else {
        trace!(
            "Provided order {} does not meet required {}",
            provided_collation,
            required.collation
        );
        Collation::empty()
    };
    let traits = PhysicalPropertySet {
        distribution: required.distribution.clone(),
        collation,
    };

    let new_input = ctx.converter.convert(node.input(), &input_distribution);
    debug!("{} rewritten to provide {}", node.explain(), traits);
    Some(node.copy(traits, new_input))
}

impl AggregatePlanNode {
    /// See [`attempt_satisfy`].
    pub fn satisfy_traits(
        &self,
        required: &PhysicalPropertySet,
        ctx: &OptContext,
    ) -> Option<AggregatePlanNode> {
        attempt_satisfy(self, required, ctx)
    }
}
