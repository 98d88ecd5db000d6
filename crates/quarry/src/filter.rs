// SPDX-License-Identifier: MIT OR Apache-2.0
//! Path step model
//!
//! A parsed path is an ordered list of [`PathFilter`] steps. Each step maps
//! one input node to zero or more output nodes; the pipeline applies the
//! steps left to right to the sequence produced by the previous step.

use ahash::AHashSet;
use serde::{Serialize, Serializer};

use crate::expression::QueryExpression;

/// One step of a compiled path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PathFilter {
    /// Replace the input with the document root (`$` in a predicate).
    Root,
    /// Named property of an object; `None` is the `*` wildcard over all
    /// property values.
    Field(Option<String>),
    /// Several named properties in the order listed.
    FieldMulti(Vec<String>),
    /// Array element; `None` is the `[*]` wildcard.
    Index(Option<i64>),
    /// Several array elements in the order listed.
    IndexMulti(Vec<i64>),
    /// Python-style `[start:end:step]`.
    Slice {
        /// First position, negative counts from the end
        start: Option<i64>,
        /// Exclusive stop, negative counts from the end
        end: Option<i64>,
        /// Stride, never zero at evaluation time
        step: Option<i64>,
    },
    /// Recursive descent. With a name, yields every descendant property of
    /// that name; without one, yields the node and all descendants.
    Scan(Option<String>),
    /// Recursive descent matching any of several property names.
    ScanMulti(NameSet),
    /// Children of a container that satisfy the predicate.
    Query(QueryExpression),
    /// The node and all descendants that satisfy the predicate.
    QueryScan(QueryExpression),
}

impl PathFilter {
    /// Whether this step may yield more than one node per input.
    #[must_use]
    pub const fn is_multi(&self) -> bool {
        match self {
            Self::Root | Self::Field(Some(_)) | Self::Index(Some(_)) => false,
            Self::Field(None)
            | Self::FieldMulti(_)
            | Self::Index(None)
            | Self::IndexMulti(_)
            | Self::Slice { .. }
            | Self::Scan(_)
            | Self::ScanMulti(_)
            | Self::Query(_)
            | Self::QueryScan(_) => true,
        }
    }
}

/// Property names for a multi-name recursive scan.
///
/// Keeps the names in source order and a hash set for membership tests
/// against every descendant key.
#[derive(Debug, Clone)]
pub struct NameSet {
    names: Vec<String>,
    lookup: AHashSet<String>,
}

impl NameSet {
    /// Build from names in source order.
    #[must_use]
    pub fn new(names: Vec<String>) -> Self {
        let lookup = names.iter().cloned().collect();
        Self { names, lookup }
    }

    /// Names in source order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Membership test.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains(name)
    }
}

impl PartialEq for NameSet {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

impl Serialize for NameSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.names.serialize(serializer)
    }
}

impl<S: Into<String>> FromIterator<S> for NameSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_set() {
        let names: NameSet = ["a", "b", "a"].into_iter().collect();
        assert_eq!(names.names(), ["a", "b", "a"]);
        assert!(names.contains("b"));
        assert!(!names.contains("c"));
    }

    #[test]
    fn test_is_multi() {
        assert!(!PathFilter::Field(Some("a".into())).is_multi());
        assert!(PathFilter::Field(None).is_multi());
        assert!(!PathFilter::Index(Some(0)).is_multi());
        assert!(PathFilter::Scan(Some("a".into())).is_multi());
    }

    #[test]
    fn test_serialize_filters() {
        let filters = vec![
            PathFilter::Field(Some("store".into())),
            PathFilter::Index(None),
            PathFilter::ScanMulti(NameSet::new(vec!["a".into(), "b".into()])),
        ];
        let json = serde_json::to_string(&filters).unwrap();
        assert_eq!(
            json,
            r#"[{"Field":"store"},{"Index":null},{"ScanMulti":["a","b"]}]"#
        );
    }
}
