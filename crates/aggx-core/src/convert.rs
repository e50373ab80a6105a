//! # Trait Conversion of Child Subtrees
//!
//! When an operator agrees to deliver a required property it usually has to ask its child
//! for something in return (e.g. "hash-partition your output on my grouping keys"). The
//! request goes through a `TraitConverter`, which the host optimizer supplies. A Cascades
//! host would register the requirement against the child's group and return a placeholder
//! for it; the default `ExchangeConverter` plans the enforcer directly.
//!
//! ## Enforcers
//!
//! An exchange is the distribution enforcer: if the child does not already provide the
//! required distribution, it is wrapped in an `Exchange` that repartitions its rows. An
//! exchange destroys row order, so the converted child provides no collation.

use crate::plan::{ExchangeNode, PlanNode, PlanRef};
use crate::properties::Distribution;
use std::sync::Arc;
use tracing::trace;

/// Converts a child subtree so that it delivers a required distribution.
pub trait TraitConverter: Send + Sync {
    fn convert(&self, input: &PlanRef, required: &Distribution) -> PlanRef;
}

/// Inserts an `Exchange` unless the input already satisfies the requirement.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExchangeConverter;

impl TraitConverter for ExchangeConverter {
    fn convert(&self, input: &PlanRef, required: &Distribution) -> PlanRef {
        if input.traits().distribution.satisfies(required) {
            trace!("Input already provides {}, no exchange needed", required);
            return Arc::clone(input);
        }
        trace!(
            "Enforcing {} on top of {} (provides {})",
            required,
            input.explain(),
            input.traits().distribution
        );
        Arc::new(PlanNode::Exchange(ExchangeNode::new(
            Arc::clone(input),
            required.clone(),
        )))
    }
}
