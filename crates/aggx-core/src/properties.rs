//! # Physical Properties
//!
//! Physical properties (traits) describe *how* rows are laid out at runtime:
//!
//! - **Distribution**: how rows are partitioned across parallel workers. Either no
//!   requirement (`Any`), a single partition (`Singleton`), hash-partitioned on a key list
//!   (`Hash`), or one of the exchange-only layouts (`Broadcast`, `RoundRobin`).
//! - **Collation**: the sort order of rows within a partition.
//!
//! Every column position in this module is relative to the schema of the node that
//! carries (or is asked for) the property.
//!
//! ## Strict vs. Relaxed Hash Requirements
//!
//! A strict hash requirement is only met by a hash on exactly the same keys in the same
//! order. A relaxed requirement is also met by a *coarser* hash: partitioning on a
//! non-empty subset of the required keys still sends every row with equal required keys
//! to the same partition, it just packs more distinct keys into each partition.
//!
//! ## The "Any" Property Set
//!
//! `PhysicalPropertySet::any()` represents "no requirements". It is satisfied by every
//! provided property set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Data distribution across parallel workers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Distribution {
    /// No requirement / unknown layout.
    #[default]
    Any,
    /// All rows in a single partition.
    Singleton,
    /// Hash-partitioned on the given column positions.
    Hash { keys: Vec<usize>, strict: bool },
    /// Every row replicated to every partition.
    Broadcast,
    /// Rows dealt out without any data-locality guarantee.
    RoundRobin,
}

impl Distribution {
    pub fn hash(keys: Vec<usize>, strict: bool) -> Self {
        Distribution::Hash { keys, strict }
    }

    /// Whether rows laid out as `self` also meet the `required` layout.
    pub fn satisfies(&self, required: &Distribution) -> bool {
        match (self, required) {
            (_, Distribution::Any) => true,
            (Distribution::Singleton, Distribution::Singleton)
            | (Distribution::Broadcast, Distribution::Broadcast)
            | (Distribution::RoundRobin, Distribution::RoundRobin) => true,
            (
                Distribution::Hash { keys: provided, .. },
                Distribution::Hash {
                    keys: required,
                    strict: true,
                },
            ) => provided == required,
            (
                Distribution::Hash { keys: provided, .. },
                Distribution::Hash {
                    keys: required,
                    strict: false,
                },
            ) => !provided.is_empty() && provided.iter().all(|k| required.contains(k)),
            _ => false,
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distribution::Any => f.write_str("any"),
            Distribution::Singleton => f.write_str("single"),
            Distribution::Hash { keys, strict } => {
                write!(f, "hash{:?}", keys)?;
                if *strict {
                    f.write_str(" strict")?;
                }
                Ok(())
            }
            Distribution::Broadcast => f.write_str("broadcast"),
            Distribution::RoundRobin => f.write_str("round-robin"),
        }
    }
}

/// One column of a sort order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortKey {
    pub field: usize,
    pub ascending: bool,
}

impl SortKey {
    pub fn asc(field: usize) -> Self {
        Self {
            field,
            ascending: true,
        }
    }

    pub fn desc(field: usize) -> Self {
        Self {
            field,
            ascending: false,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = if self.ascending { "ASC" } else { "DESC" };
        write!(f, "{} {}", self.field, dir)
    }
}

/// Sort order of rows within a partition. Empty means "unordered / no requirement".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collation(pub Vec<SortKey>);

impl Collation {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn new(keys: Vec<SortKey>) -> Self {
        Self(keys)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A provided order satisfies a requirement when the requirement is a prefix of it.
    /// Rows sorted by `a, b, c` are also sorted by `a, b`.
    pub fn satisfies(&self, required: &Collation) -> bool {
        required.0.len() <= self.0.len()
            && required.0.iter().zip(self.0.iter()).all(|(r, p)| r == p)
    }
}

impl fmt::Display for Collation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self.0.iter().map(|k| k.to_string()).collect();
        write!(f, "[{}]", keys.join(", "))
    }
}

/// The trait set of a plan node: distribution plus collation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhysicalPropertySet {
    #[serde(default)]
    pub distribution: Distribution,
    #[serde(default)]
    pub collation: Collation,
}

impl PhysicalPropertySet {
    pub fn any() -> Self {
        Self {
            distribution: Distribution::Any,
            collation: Collation::empty(),
        }
    }

    pub fn with_distribution(distribution: Distribution) -> Self {
        Self {
            distribution,
            collation: Collation::empty(),
        }
    }

    pub fn with_collation(collation: Collation) -> Self {
        Self {
            distribution: Distribution::Any,
            collation,
        }
    }

    pub fn replace_collation(mut self, collation: Collation) -> Self {
        self.collation = collation;
        self
    }

    /// Check whether this (provided) property set meets `required`.
    pub fn satisfies(&self, required: &PhysicalPropertySet) -> bool {
        self.distribution.satisfies(&required.distribution)
            && self.collation.satisfies(&required.collation)
    }
}

impl fmt::Display for PhysicalPropertySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dist={}", self.distribution)?;
        if !self.collation.is_empty() {
            write!(f, ", order={}", self.collation)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_is_always_satisfied() {
        for provided in [
            Distribution::Any,
            Distribution::Singleton,
            Distribution::hash(vec![0], true),
            Distribution::Broadcast,
        ] {
            assert!(provided.satisfies(&Distribution::Any));
        }
        assert!(!Distribution::Any.satisfies(&Distribution::Singleton));
    }

    #[test]
    fn test_strict_hash_requires_same_keys_and_order() {
        let required = Distribution::hash(vec![0, 1], true);
        assert!(Distribution::hash(vec![0, 1], false).satisfies(&required));
        assert!(!Distribution::hash(vec![1, 0], true).satisfies(&required));
        assert!(!Distribution::hash(vec![0], true).satisfies(&required));
    }

    #[test]
    fn test_relaxed_hash_accepts_coarser_hash() {
        let required = Distribution::hash(vec![0, 1], false);
        assert!(Distribution::hash(vec![1], true).satisfies(&required));
        assert!(Distribution::hash(vec![1, 0], true).satisfies(&required));
        assert!(!Distribution::hash(vec![0, 2], true).satisfies(&required));
        assert!(!Distribution::hash(vec![], true).satisfies(&required));
        assert!(!Distribution::Singleton.satisfies(&required));
    }

    #[test]
    fn test_collation_prefix() {
        let provided = Collation::new(vec![SortKey::asc(0), SortKey::asc(1)]);
        assert!(provided.satisfies(&Collation::empty()));
        assert!(provided.satisfies(&Collation::new(vec![SortKey::asc(0)])));
        assert!(!provided.satisfies(&Collation::new(vec![SortKey::asc(1)])));
        assert!(!provided.satisfies(&Collation::new(vec![SortKey::desc(0)])));
        assert!(!Collation::empty().satisfies(&provided));
    }

    #[test]
    fn test_property_set_display() {
        let props = PhysicalPropertySet::with_distribution(Distribution::hash(vec![0, 1], true))
            .replace_collation(Collation::new(vec![SortKey::asc(0), SortKey::desc(1)]));
        assert_eq!(props.to_string(), "dist=hash[0, 1] strict, order=[0 ASC, 1 DESC]");
    }

    #[test]
    fn test_sort_key_json_shape() {
        let required: PhysicalPropertySet = serde_json::from_value(serde_json::json!({
            "collation": [{"field": 0, "ascending": true}]
        }))
        .unwrap();
        assert_eq!(required.collation, Collation::new(vec![SortKey::asc(0)]));
        assert_eq!(required.distribution, Distribution::Any);
    }

    #[test]
    fn test_distribution_json_shape() {
        let json = serde_json::to_value(Distribution::hash(vec![2], false)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "hash", "keys": [2], "strict": false}));
        let back: Distribution = serde_json::from_value(serde_json::json!({"type": "singleton"})).unwrap();
        assert_eq!(back, Distribution::Singleton);
    }
}
