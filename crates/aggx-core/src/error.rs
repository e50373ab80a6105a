//! Errors raised when an aggregate plan node is validated at the boundary.
//!
//! The satisfaction engine itself never returns these: a requirement that cannot be met
//! is an ordinary `None`. They exist for callers sitting upstream of the planner (such as
//! the HTTP service) that accept plan fragments from outside and must reject malformed
//! ones before they reach the engine.

/// Structural problems with an aggregate plan node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("Grouping key {key} is out of range for an input of {input_width} columns")]
    GroupingKeyOutOfRange { key: usize, input_width: usize },
    #[error("Auxiliary grouping key {key} is out of range for an input of {input_width} columns")]
    AuxGroupingKeyOutOfRange { key: usize, input_width: usize },
    #[error("Grouping key {0} appears more than once")]
    DuplicateGroupingKey(usize),
    #[error("Column {0} is both a grouping key and an auxiliary grouping key")]
    AuxGroupingOverlap(usize),
    #[error("Argument {arg} of aggregate call '{function}' is out of range for an input of {input_width} columns")]
    AggregateArgOutOfRange {
        function: String,
        arg: usize,
        input_width: usize,
    },
}
