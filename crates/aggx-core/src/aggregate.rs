//! # Group Aggregate Plan Node
//!
//! `AggregatePlanNode` is the physical group aggregate produced by the implementation rule
//! for a logical aggregate whose calls are user-defined functions.
//!
//! ## Output Layout
//!
//! The output schema is derived from the input schema at construction time:
//!
//! ```text
//! [ grouping keys (in grouping order) | auxiliary grouping keys | aggregate results ]
//!   0 .. n-1                            n .. n+m-1                n+m ..
//! ```
//!
//! Grouping columns therefore always sit at output positions `0..n`. Requirements that a
//! consumer places on this node are expressed in that output-position space, while
//! `grouping` and `aux_grouping` themselves hold *input* positions.
//!
//! ## Preconditions
//!
//! Grouping keys are unique, disjoint from the auxiliary keys, and every referenced input
//! position is in range. The node checks these only with `debug_assert!`; callers that
//! accept plans from outside should run [`AggregatePlanNode::validate`] (or use
//! [`AggregatePlanNode::try_new`]) first.

use crate::error::PlanError;
use crate::expr::{AggregateCall, Field, Schema};
use crate::plan::PlanRef;
use crate::properties::PhysicalPropertySet;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatePlanNode {
    input: PlanRef,
    grouping: Vec<usize>,
    aux_grouping: Vec<usize>,
    agg_calls: Vec<AggregateCall>,
    output_schema: Schema,
    traits: PhysicalPropertySet,
}

impl AggregatePlanNode {
    pub fn new(
        input: PlanRef,
        grouping: Vec<usize>,
        aux_grouping: Vec<usize>,
        agg_calls: Vec<AggregateCall>,
        traits: PhysicalPropertySet,
    ) -> Self {
        let output_schema = derive_output_schema(input.schema(), &grouping, &aux_grouping, &agg_calls);
        let node = Self {
            input,
            grouping,
            aux_grouping,
            agg_calls,
            output_schema,
            traits,
        };
        debug_assert_eq!(node.validate(), Ok(()));
        node
    }

    /// Like [`AggregatePlanNode::new`], but rejects malformed keys instead of asserting.
    pub fn try_new(
        input: PlanRef,
        grouping: Vec<usize>,
        aux_grouping: Vec<usize>,
        agg_calls: Vec<AggregateCall>,
        traits: PhysicalPropertySet,
    ) -> Result<Self, PlanError> {
        check_structure(input.schema(), &grouping, &aux_grouping, &agg_calls)?;
        Ok(Self::new(input, grouping, aux_grouping, agg_calls, traits))
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        check_structure(
            self.input.schema(),
            &self.grouping,
            &self.aux_grouping,
            &self.agg_calls,
        )
    }

    /// Copy this node with a new trait set and a new child. Grouping data, aggregate calls
    /// and the output schema are carried over unchanged; `self` is left untouched.
    pub fn copy(&self, traits: PhysicalPropertySet, input: PlanRef) -> Self {
        debug_assert_eq!(input.schema().len(), self.input.schema().len());
        Self {
            input,
            grouping: self.grouping.clone(),
            aux_grouping: self.aux_grouping.clone(),
            agg_calls: self.agg_calls.clone(),
            output_schema: self.output_schema.clone(),
            traits,
        }
    }

    pub fn input(&self) -> &PlanRef {
        &self.input
    }

    /// Grouping keys as input positions.
    pub fn grouping(&self) -> &[usize] {
        &self.grouping
    }

    /// Auxiliary grouping keys as input positions.
    pub fn aux_grouping(&self) -> &[usize] {
        &self.aux_grouping
    }

    pub fn agg_calls(&self) -> &[AggregateCall] {
        &self.agg_calls
    }

    pub fn output_schema(&self) -> &Schema {
        &self.output_schema
    }

    pub fn traits(&self) -> &PhysicalPropertySet {
        &self.traits
    }

    /// Output positions occupied by the grouping columns: `0..grouping.len()`.
    pub fn group_positions(&self) -> Vec<usize> {
        (0..self.grouping.len()).collect()
    }

    pub fn is_global(&self) -> bool {
        self.grouping.is_empty()
    }

    /// One-line description, e.g.
    /// `GroupAggregate(groupBy=[a, b], auxGrouping=[c], select=[a, b, c, f(d) AS r])`.
    pub fn explain(&self) -> String {
        let input_schema = self.input.schema();
        let names = |keys: &[usize]| -> Vec<String> {
            keys.iter().map(|&k| input_schema.field_name(k)).collect()
        };

        let mut select = names(&self.grouping);
        select.extend(names(&self.aux_grouping));
        let first_call = self.grouping.len() + self.aux_grouping.len();
        for (i, call) in self.agg_calls.iter().enumerate() {
            select.push(format!(
                "{} AS {}",
                call.render(input_schema),
                self.output_schema.field_name(first_call + i)
            ));
        }

        let mut parts = Vec::new();
        if !self.grouping.is_empty() {
            parts.push(format!("groupBy=[{}]", names(&self.grouping).join(", ")));
        }
        if !self.aux_grouping.is_empty() {
            parts.push(format!("auxGrouping=[{}]", names(&self.aux_grouping).join(", ")));
        }
        parts.push(format!("select=[{}]", select.join(", ")));
        format!("GroupAggregate({})", parts.join(", "))
    }
}

fn derive_output_schema(
    input: &Schema,
    grouping: &[usize],
    aux_grouping: &[usize],
    agg_calls: &[AggregateCall],
) -> Schema {
    let mut fields = Vec::with_capacity(grouping.len() + aux_grouping.len() + agg_calls.len());
    fields.extend(input.project(grouping).fields);
    fields.extend(input.project(aux_grouping).fields);
    for (i, call) in agg_calls.iter().enumerate() {
        fields.push(Field::new(call.output_name(i), call.result_type));
    }
    Schema::new(fields)
}

fn check_structure(
    input: &Schema,
    grouping: &[usize],
    aux_grouping: &[usize],
    agg_calls: &[AggregateCall],
) -> Result<(), PlanError> {
    let input_width = input.len();
    let mut seen = HashSet::with_capacity(grouping.len());
    for &key in grouping {
        if key >= input_width {
            return Err(PlanError::GroupingKeyOutOfRange { key, input_width });
        }
        if !seen.insert(key) {
            return Err(PlanError::DuplicateGroupingKey(key));
        }
    }
    for &key in aux_grouping {
        if key >= input_width {
            return Err(PlanError::AuxGroupingKeyOutOfRange { key, input_width });
        }
        if seen.contains(&key) {
            return Err(PlanError::AuxGroupingOverlap(key));
        }
    }
    for call in agg_calls {
        if let Some(&arg) = call.args.iter().find(|&&a| a >= input_width) {
            return Err(PlanError::AggregateArgOutOfRange {
                function: call.function.clone(),
                arg,
                input_width,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::DataType;
    use crate::plan::SourceNode;
    use crate::properties::Distribution;
    use std::sync::Arc;

    fn input() -> PlanRef {
        Arc::new(
            SourceNode::new(
                "Calc(select=[a, b, c, d])",
                Schema::new(vec![
                    Field::new("a", DataType::Int64),
                    Field::new("b", DataType::Utf8),
                    Field::new("c", DataType::Date),
                    Field::new("d", DataType::Float64),
                ]),
            )
            .into(),
        )
    }

    fn node() -> AggregatePlanNode {
        AggregatePlanNode::new(
            input(),
            vec![1, 0],
            vec![2],
            vec![AggregateCall::new("weighted_avg", vec![3, 0], DataType::Float64).with_name("r")],
            PhysicalPropertySet::any(),
        )
    }

    #[test]
    fn test_output_schema_puts_grouping_first() {
        let agg = node();
        let names: Vec<&str> = agg
            .output_schema()
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, vec!["b", "a", "c", "r"]);
        assert_eq!(agg.output_schema().fields[3].data_type, DataType::Float64);
        assert_eq!(agg.group_positions(), vec![0, 1]);
    }

    #[test]
    fn test_copy_replaces_only_traits_and_input() {
        let original = node();
        let new_input = input();
        let traits = PhysicalPropertySet::with_distribution(Distribution::hash(vec![0, 1], true));
        let copied = original.copy(traits.clone(), new_input.clone());

        assert_eq!(copied.grouping(), original.grouping());
        assert_eq!(copied.aux_grouping(), original.aux_grouping());
        assert_eq!(copied.agg_calls(), original.agg_calls());
        assert_eq!(copied.output_schema(), original.output_schema());
        assert_eq!(copied.traits(), &traits);
        assert!(Arc::ptr_eq(copied.input(), &new_input));
        assert_eq!(original.traits(), &PhysicalPropertySet::any());
    }

    #[test]
    fn test_copy_with_own_traits_and_input_is_identity() {
        let original = node();
        let copied = original.copy(original.traits().clone(), original.input().clone());
        assert_eq!(copied, original);
        assert!(Arc::ptr_eq(copied.input(), original.input()));
    }

    #[test]
    fn test_explain() {
        assert_eq!(
            node().explain(),
            "GroupAggregate(groupBy=[b, a], auxGrouping=[c], select=[b, a, c, weighted_avg(d, a) AS r])"
        );
        let global = AggregatePlanNode::new(
            input(),
            vec![],
            vec![],
            vec![AggregateCall::new("my_count", vec![], DataType::Int64)],
            PhysicalPropertySet::any(),
        );
        assert_eq!(global.explain(), "GroupAggregate(select=[my_count() AS EXPR$0])");
    }

    #[test]
    fn test_try_new_rejects_malformed_keys() {
        let calls = || vec![AggregateCall::new("f", vec![3], DataType::Int64)];
        let any = PhysicalPropertySet::any;

        assert_eq!(
            AggregatePlanNode::try_new(input(), vec![4], vec![], calls(), any()).unwrap_err(),
            PlanError::GroupingKeyOutOfRange { key: 4, input_width: 4 }
        );
        assert_eq!(
            AggregatePlanNode::try_new(input(), vec![0, 0], vec![], calls(), any()).unwrap_err(),
            PlanError::DuplicateGroupingKey(0)
        );
        assert_eq!(
            AggregatePlanNode::try_new(input(), vec![0], vec![0], calls(), any()).unwrap_err(),
            PlanError::AuxGroupingOverlap(0)
        );
        assert_eq!(
            AggregatePlanNode::try_new(input(), vec![0], vec![9], calls(), any()).unwrap_err(),
            PlanError::AuxGroupingKeyOutOfRange { key: 9, input_width: 4 }
        );
        let bad_call = vec![AggregateCall::new("f", vec![5], DataType::Int64)];
        assert!(matches!(
            AggregatePlanNode::try_new(input(), vec![0], vec![], bad_call, any()),
            Err(PlanError::AggregateArgOutOfRange { arg: 5, .. })
        ));
        assert!(AggregatePlanNode::try_new(input(), vec![0], vec![1], calls(), any()).is_ok());
    }
}
