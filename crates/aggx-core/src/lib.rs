//! # aggx-core: Physical Traits for Distributed Group Aggregates
//!
//! This crate decides whether a physical group aggregate can deliver the data distribution
//! and sort order its consumer requires, and builds the rewritten node when it can. It is
//! called by the trait-propagation phase of a cost-based optimizer; rule selection and cost
//! estimation stay with the host.
//!
//! ## Module Overview
//!
//! - **`properties`**: Distribution and collation traits with their `satisfies` relation.
//! - **`expr`**: Schemas, fields and aggregate calls.
//! - **`plan`**: The immutable, `Arc`-shared physical plan graph.
//! - **`aggregate`**: The group aggregate plan node and its structural copy.
//! - **`satisfy`**: The trait satisfaction engine.
//! - **`convert`**: Conversion of a child subtree under a derived requirement.
//! - **`config`**: Read-only table configuration handle.
//! - **`error`**: Validation errors for plans accepted from outside the planner.

pub mod aggregate;
pub mod config;
pub mod convert;
pub mod error;
pub mod expr;
pub mod plan;
pub mod properties;
pub mod satisfy;

pub use aggregate::AggregatePlanNode;
pub use error::PlanError;
pub use plan::{PlanNode, PlanRef};
pub use properties::{Collation, Distribution, PhysicalPropertySet, SortKey};
pub use satisfy::{attempt_satisfy, OptContext};
