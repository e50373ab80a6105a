//! # Physical Plan Graph
//!
//! Plan nodes are immutable values. A node never changes after construction: every
//! trait-satisfaction attempt that succeeds produces a *new* node, and the original stays
//! a valid alternative in the optimizer's search space.
//!
//! ## Structural Sharing
//!
//! Children are held through `PlanRef` (`Arc<PlanNode>`). The same child subtree is
//! typically referenced by many competing parent rewrites, so cloning a parent only bumps
//! reference counts. Because nodes are immutable and `Arc` is thread-safe, the graph can be
//! read concurrently by a parallel search.
//!
//! ## Node Kinds
//!
//! - **`Source`**: an opaque subtree owned by the host optimizer. Only its description,
//!   output schema and provided traits are visible here.
//! - **`Exchange`**: a distribution enforcer that repartitions its input.
//! - **`Aggregate`**: the group aggregate whose traits this crate reasons about.

use crate::aggregate::AggregatePlanNode;
use crate::expr::Schema;
use crate::properties::{Collation, Distribution, PhysicalPropertySet};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::sync::Arc;

/// Shared reference to a plan node.
pub type PlanRef = Arc<PlanNode>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlanNode {
    Source(SourceNode),
    Exchange(ExchangeNode),
    Aggregate(AggregatePlanNode),
}

impl PlanNode {
    pub fn traits(&self) -> &PhysicalPropertySet {
        match self {
            PlanNode::Source(n) => &n.traits,
            PlanNode::Exchange(n) => &n.traits,
            PlanNode::Aggregate(n) => n.traits(),
        }
    }

    pub fn schema(&self) -> &Schema {
        match self {
            PlanNode::Source(n) => &n.schema,
            PlanNode::Exchange(n) => n.input.schema(),
            PlanNode::Aggregate(n) => n.output_schema(),
        }
    }

    pub fn inputs(&self) -> Vec<&PlanRef> {
        match self {
            PlanNode::Source(_) => vec![],
            PlanNode::Exchange(n) => vec![&n.input],
            PlanNode::Aggregate(n) => vec![n.input()],
        }
    }

    /// One-line description of this node, without its children.
    pub fn explain(&self) -> String {
        match self {
            PlanNode::Source(n) => n.description.clone(),
            PlanNode::Exchange(n) => format!("Exchange(distribution=[{}])", n.distribution()),
            PlanNode::Aggregate(n) => n.explain(),
        }
    }

    /// Render the tree rooted at this node, one node per line, children indented.
    pub fn display(&self, indent: usize) -> String {
        let mut out = String::new();
        self.display_into(indent, &mut out);
        out
    }

    fn display_into(&self, indent: usize, out: &mut String) {
        let _ = writeln!(
            out,
            "{:width$}{} [{}]",
            "",
            self.explain(),
            self.traits(),
            width = indent * 2
        );
        for input in self.inputs() {
            input.display_into(indent + 1, out);
        }
    }
}

impl From<SourceNode> for PlanNode {
    fn from(node: SourceNode) -> Self {
        PlanNode::Source(node)
    }
}

impl From<ExchangeNode> for PlanNode {
    fn from(node: ExchangeNode) -> Self {
        PlanNode::Exchange(node)
    }
}

impl From<AggregatePlanNode> for PlanNode {
    fn from(node: AggregatePlanNode) -> Self {
        PlanNode::Aggregate(node)
    }
}

/// A subtree planned elsewhere, seen only through its schema and provided traits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceNode {
    pub description: String,
    pub schema: Schema,
    #[serde(default)]
    pub traits: PhysicalPropertySet,
}

impl SourceNode {
    pub fn new(description: impl Into<String>, schema: Schema) -> Self {
        Self {
            description: description.into(),
            schema,
            traits: PhysicalPropertySet::any(),
        }
    }

    pub fn with_traits(mut self, traits: PhysicalPropertySet) -> Self {
        self.traits = traits;
        self
    }
}

/// Repartitions its input. Row order is not preserved across an exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExchangeNode {
    input: PlanRef,
    traits: PhysicalPropertySet,
}

impl ExchangeNode {
    pub fn new(input: PlanRef, distribution: Distribution) -> Self {
        Self {
            input,
            traits: PhysicalPropertySet {
                distribution,
                collation: Collation::empty(),
            },
        }
    }

    pub fn input(&self) -> &PlanRef {
        &self.input
    }

    pub fn distribution(&self) -> &Distribution {
        &self.traits.distribution
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{DataType, Field};
    use crate::properties::SortKey;

    fn source() -> PlanRef {
        Arc::new(
            SourceNode::new(
                "TableSourceScan(table=[orders])",
                Schema::new(vec![Field::new("a", DataType::Int64)]),
            )
            .with_traits(PhysicalPropertySet::with_collation(Collation::new(vec![
                SortKey::asc(0),
            ])))
            .into(),
        )
    }

    #[test]
    fn test_exchange_drops_collation_and_keeps_schema() {
        let input = source();
        let exchange = PlanNode::from(ExchangeNode::new(
            input.clone(),
            Distribution::hash(vec![0], true),
        ));
        assert!(exchange.traits().collation.is_empty());
        assert_eq!(exchange.schema(), input.schema());
        assert!(Arc::ptr_eq(exchange.inputs()[0], &input));
    }

    #[test]
    fn test_display_indents_children() {
        let exchange = PlanNode::from(ExchangeNode::new(source(), Distribution::Singleton));
        let rendered = exchange.display(0);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Exchange(distribution=[single]) [dist=single]");
        assert_eq!(
            lines[1],
            "  TableSourceScan(table=[orders]) [dist=any, order=[0 ASC]]"
        );
    }
}
