//! # Schema and Aggregate Call Types
//!
//! This module defines the row-type vocabulary shared by the plan graph and the exec
//! translator: column data types, named fields, schemas, and aggregate calls.
//!
//! ## Column Identifiers
//!
//! Columns are identified by their 0-based position in a schema. Two index spaces are in
//! play around an aggregate:
//!
//! - **Input space**: positions in the child's output schema. Grouping keys, auxiliary
//!   grouping keys and aggregate arguments are expressed here.
//! - **Output space**: positions in the aggregate's own output schema. Requirements that a
//!   consumer places on the aggregate (distribution keys, sort keys) are expressed here.
//!
//! ## Aggregate Calls
//!
//! An `AggregateCall` references a (typically user-defined) aggregate function by name.
//! The optimizer never looks inside the function; it only needs the call's identity, its
//! argument columns and its result type to build the output schema.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical column data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Bool,
    Int32,
    Int64,
    Float64,
    Decimal,
    Utf8,
    /// Days since Unix epoch (1970-01-01).
    Date,
    Timestamp,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Bool => "BOOLEAN",
            DataType::Int32 => "INT",
            DataType::Int64 => "BIGINT",
            DataType::Float64 => "DOUBLE",
            DataType::Decimal => "DECIMAL",
            DataType::Utf8 => "VARCHAR",
            DataType::Date => "DATE",
            DataType::Timestamp => "TIMESTAMP",
        };
        f.write_str(name)
    }
}

/// A named, typed column in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
}

fn default_nullable() -> bool {
    true
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.data_type)
    }
}

/// Ordered list of fields describing a row type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Name of the column at `index`, or `$index` when the position is out of range.
    pub fn field_name(&self, index: usize) -> String {
        self.fields
            .get(index)
            .map(|f| f.name.clone())
            .unwrap_or_else(|| format!("${}", index))
    }

    /// Build a schema by picking the given positions out of this one, in order.
    pub fn project(&self, indices: &[usize]) -> Schema {
        Schema::new(
            indices
                .iter()
                .filter_map(|&i| self.fields.get(i).cloned())
                .collect(),
        )
    }
}

/// A call to an aggregate function inside an aggregate operator.
///
/// `args` are positions in the aggregate's *input* schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateCall {
    /// Function name as registered in the function catalog (e.g. `weighted_avg`).
    pub function: String,
    pub args: Vec<usize>,
    pub result_type: DataType,
    #[serde(default)]
    pub distinct: bool,
    /// Output column name. Defaults to `EXPR$<i>` when absent.
    #[serde(default)]
    pub name: Option<String>,
}

impl AggregateCall {
    pub fn new(function: impl Into<String>, args: Vec<usize>, result_type: DataType) -> Self {
        Self {
            function: function.into(),
            args,
            result_type,
            distinct: false,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Output column name for this call when it is the `ordinal`-th call of its operator.
    pub fn output_name(&self, ordinal: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("EXPR${}", ordinal))
    }

    /// Render the call against an input schema, e.g. `weighted_avg(DISTINCT price, qty)`.
    pub fn render(&self, input: &Schema) -> String {
        let args: Vec<String> = self.args.iter().map(|&a| input.field_name(a)).collect();
        let distinct = if self.distinct { "DISTINCT " } else { "" };
        format!("{}({}{})", self.function, distinct, args.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> Schema {
        Schema::new(vec![
            Field::new("price", DataType::Float64),
            Field::new("qty", DataType::Int64),
        ])
    }

    #[test]
    fn test_render_aggregate_call() {
        let call = AggregateCall::new("weighted_avg", vec![0, 1], DataType::Float64);
        assert_eq!(call.render(&input()), "weighted_avg(price, qty)");

        let call = call.with_distinct(true);
        assert_eq!(call.render(&input()), "weighted_avg(DISTINCT price, qty)");
    }

    #[test]
    fn test_out_of_range_field_name_is_positional() {
        assert_eq!(input().field_name(7), "$7");
    }

    #[test]
    fn test_output_name_defaults_to_ordinal() {
        let call = AggregateCall::new("f", vec![], DataType::Int64);
        assert_eq!(call.output_name(2), "EXPR$2");
        assert_eq!(call.with_name("total").output_name(2), "total");
    }
}
