// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-filter evaluation
//!
//! [`PathFilter::execute`] maps one input node to a [`Step`] iterator over its
//! outputs. Every variant borrows from the document and the filter, nothing
//! is cloned while walking.

use std::slice;

use serde_json::{Map, Value};

use super::scan::{Children, Scan};
use crate::error::{Error, Result};
use crate::expression::QueryExpression;
use crate::filter::PathFilter;
use crate::node::NodeKind;
use crate::settings::Settings;

impl PathFilter {
    /// Outputs of this filter for a single input node.
    pub(crate) fn execute<'p, 'a: 'p>(
        &'p self,
        root: &'a Value,
        node: &'a Value,
        settings: Settings,
    ) -> Step<'p, 'a> {
        let strict = settings.error_when_no_match;

        match self {
            Self::Root => Step::one(root),

            Self::Field(name) => match (node, name) {
                (Value::Object(object), Some(name)) => match object.get(name) {
                    Some(value) => Step::one(value),
                    None if strict => Step::fail(Error::PropertyNotFound { name: name.clone() }),
                    None => Step::Empty,
                },
                (Value::Object(_), None) => Step::Children(Children::of(node)),
                _ if strict => Step::fail(Error::PropertyNotValid {
                    name: name.clone(),
                    kind: NodeKind::of(node),
                }),
                _ => Step::Empty,
            },

            Self::FieldMulti(names) => match node {
                Value::Object(object) => Step::Names(Names {
                    object,
                    names: names.iter(),
                    strict,
                }),
                _ if strict => Step::fail(Error::PropertiesNotValid {
                    names: names.clone(),
                    kind: NodeKind::of(node),
                }),
                _ => Step::Empty,
            },

            Self::Index(index) => match (node, index) {
                (Value::Array(items), Some(index)) => match element(items, *index) {
                    Some(value) => Step::one(value),
                    None if strict => Step::fail(Error::IndexOutOfBounds { index: *index }),
                    None => Step::Empty,
                },
                (Value::Array(_), None) => Step::Children(Children::of(node)),
                _ if strict => Step::fail(Error::IndexNotValid {
                    index: *index,
                    kind: NodeKind::of(node),
                }),
                _ => Step::Empty,
            },

            Self::IndexMulti(indexes) => match node {
                Value::Array(items) => Step::Indexes(Indexes {
                    items,
                    indexes: indexes.iter(),
                    strict,
                }),
                _ if strict => Step::fail(Error::IndexNotValid {
                    index: indexes.first().copied(),
                    kind: NodeKind::of(node),
                }),
                _ => Step::Empty,
            },

            Self::Slice { start, end, step } => {
                if *step == Some(0) {
                    return Step::fail(Error::StepZero);
                }
                match node {
                    Value::Array(items) => match ArraySlice::new(items, *start, *end, *step) {
                        Some(slice) => Step::Slice(slice),
                        None if strict => Step::fail(Error::NoResultsInSlice {
                            start: *start,
                            end: *end,
                        }),
                        None => Step::Empty,
                    },
                    _ if strict => Step::fail(Error::SliceNotValid {
                        kind: NodeKind::of(node),
                    }),
                    _ => Step::Empty,
                }
            }

            Self::Scan(None) => Step::Scan(Scan::all(node)),
            Self::Scan(Some(name)) => Step::Scan(Scan::named(node, name)),
            Self::ScanMulti(names) => Step::Scan(Scan::any_of(node, names)),

            Self::Query(expression) => Step::Query(Filtered {
                nodes: Children::of(node),
                expression,
                root,
                settings,
            }),
            Self::QueryScan(expression) => Step::QueryScan(Filtered {
                nodes: Scan::all(node),
                expression,
                root,
                settings,
            }),
        }
    }
}

/// Output of one filter applied to one node.
pub(crate) enum Step<'p, 'a> {
    Empty,
    Once(Option<Result<&'a Value>>),
    Children(Children<'a>),
    Names(Names<'p, 'a>),
    Indexes(Indexes<'p, 'a>),
    Slice(ArraySlice<'a>),
    Scan(Scan<'p, 'a>),
    Query(Filtered<'p, 'a, Children<'a>>),
    QueryScan(Filtered<'p, 'a, Scan<'p, 'a>>),
}

impl<'a> Step<'_, 'a> {
    const fn one(value: &'a Value) -> Self {
        Self::Once(Some(Ok(value)))
    }

    pub(crate) const fn fail(error: Error) -> Self {
        Self::Once(Some(Err(error)))
    }
}

impl<'a> Iterator for Step<'_, 'a> {
    type Item = Result<&'a Value>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Empty => None,
            Self::Once(item) => item.take(),
            Self::Children(children) => children.next().map(Ok),
            Self::Names(names) => names.next(),
            Self::Indexes(indexes) => indexes.next(),
            Self::Slice(slice) => slice.next().map(Ok),
            Self::Scan(scan) => scan.next().map(Ok),
            Self::Query(filtered) => filtered.next(),
            Self::QueryScan(filtered) => filtered.next(),
        }
    }
}

fn element(items: &[Value], index: i64) -> Option<&Value> {
    usize::try_from(index).ok().and_then(|i| items.get(i))
}

/// Properties of one object in the order the path lists them.
pub(crate) struct Names<'p, 'a> {
    object: &'a Map<String, Value>,
    names: slice::Iter<'p, String>,
    strict: bool,
}

impl<'a> Iterator for Names<'_, 'a> {
    type Item = Result<&'a Value>;

    fn next(&mut self) -> Option<Self::Item> {
        for name in self.names.by_ref() {
            match self.object.get(name) {
                Some(value) => return Some(Ok(value)),
                None if self.strict => {
                    return Some(Err(Error::PropertyNotFound { name: name.clone() }));
                }
                None => {}
            }
        }
        None
    }
}

/// Elements of one array in the order the path lists them.
pub(crate) struct Indexes<'p, 'a> {
    items: &'a [Value],
    indexes: slice::Iter<'p, i64>,
    strict: bool,
}

impl<'a> Iterator for Indexes<'_, 'a> {
    type Item = Result<&'a Value>;

    fn next(&mut self) -> Option<Self::Item> {
        for &index in self.indexes.by_ref() {
            match element(self.items, index) {
                Some(value) => return Some(Ok(value)),
                None if self.strict => return Some(Err(Error::IndexOutOfBounds { index })),
                None => {}
            }
        }
        None
    }
}

/// Python-style slice over one array.
pub(crate) struct ArraySlice<'a> {
    items: &'a [Value],
    next: i64,
    stop: i64,
    step: i64,
}

impl<'a> ArraySlice<'a> {
    /// Resolve bounds against the array length. `None` when the range is
    /// empty. `step` must not be zero.
    fn new(items: &'a [Value], start: Option<i64>, end: Option<i64>, step: Option<i64>) -> Option<Self> {
        let count = i64::try_from(items.len()).unwrap_or(i64::MAX);
        let step = step.unwrap_or(1);
        let forward = step > 0;

        let mut next = match start {
            Some(start) if start < 0 => count + start,
            Some(start) => start,
            None if forward => 0,
            None => count - 1,
        };
        let mut stop = match end {
            Some(end) if end < 0 => count + end,
            Some(end) => end,
            None if forward => count,
            None => -1,
        };

        if forward {
            next = next.clamp(0, count);
        } else {
            next = next.min(count - 1);
        }
        stop = stop.clamp(-1, count);

        let slice = Self {
            items,
            next,
            stop,
            step,
        };
        slice.in_range().then_some(slice)
    }

    const fn in_range(&self) -> bool {
        if self.step > 0 {
            self.next < self.stop
        } else {
            self.next > self.stop
        }
    }
}

impl<'a> Iterator for ArraySlice<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.in_range() {
            return None;
        }
        let value = element(self.items, self.next)?;
        self.next = self.next.saturating_add(self.step);
        Some(value)
    }
}

/// Nodes from `nodes` that satisfy a predicate.
pub(crate) struct Filtered<'p, 'a, I> {
    nodes: I,
    expression: &'p QueryExpression,
    root: &'a Value,
    settings: Settings,
}

impl<'a, I> Iterator for Filtered<'_, 'a, I>
where
    I: Iterator<Item = &'a Value>,
{
    type Item = Result<&'a Value>;

    fn next(&mut self) -> Option<Self::Item> {
        for node in self.nodes.by_ref() {
            match self.expression.is_match(self.root, node, &self.settings) {
                Ok(true) => return Some(Ok(node)),
                Ok(false) => {}
                Err(err) => return Some(Err(err)),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn slice(items: &[Value], start: Option<i64>, end: Option<i64>, step: Option<i64>) -> Vec<i64> {
        ArraySlice::new(items, start, end, step)
            .map(|s| s.filter_map(Value::as_i64).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_slice_bounds() {
        let items: Vec<Value> = (1..=9).map(|i| json!(i)).collect();
        assert_eq!(slice(&items, Some(1), Some(5), None), vec![2, 3, 4, 5]);
        assert_eq!(slice(&items, Some(-2), None, None), vec![8, 9]);
        assert_eq!(slice(&items, None, Some(-7), None), vec![1, 2]);
        assert_eq!(slice(&items, None, None, Some(2)), vec![1, 3, 5, 7, 9]);
        assert_eq!(slice(&items, None, None, Some(-1)), vec![9, 8, 7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(slice(&items, Some(5), Some(1), Some(-2)), vec![6, 4]);
        assert_eq!(slice(&items, Some(-100), Some(100), None), (1..=9).collect::<Vec<_>>());
        assert!(slice(&items, Some(1), Some(1), None).is_empty());
        assert!(slice(&items, Some(99), None, None).is_empty());
        assert!(slice(&items, Some(1), Some(-19), None).is_empty());
        assert!(slice(&items, Some(-100), None, Some(-1)).is_empty());
    }

    #[test]
    fn test_slice_large_step() {
        let items: Vec<Value> = (0..3).map(|i| json!(i)).collect();
        assert_eq!(slice(&items, None, None, Some(i64::MAX)), vec![0]);
        assert_eq!(slice(&items, None, None, Some(i64::MIN)), vec![2]);
    }

    #[test]
    fn test_slice_empty_array() {
        assert!(ArraySlice::new(&[], None, None, None).is_none());
        assert!(ArraySlice::new(&[], None, None, Some(-1)).is_none());
    }

    #[test]
    fn test_step_zero_on_any_node() {
        let filter = PathFilter::Slice {
            start: None,
            end: None,
            step: Some(0),
        };
        let doc = json!({"a": 1});
        let mut step = filter.execute(&doc, &doc, Settings::default());
        assert!(matches!(step.next(), Some(Err(Error::StepZero))));
        assert!(step.next().is_none());
    }

    #[test]
    fn test_lenient_misses_are_empty() {
        let doc = json!({"a": [1, 2]});
        let settings = Settings::default();
        let filters = [
            PathFilter::Field(Some("missing".into())),
            PathFilter::Index(Some(0)),
            PathFilter::IndexMulti(vec![0, 1]),
            PathFilter::Slice {
                start: None,
                end: None,
                step: None,
            },
        ];
        for filter in &filters {
            assert_eq!(filter.execute(&doc, &doc, settings).count(), 0, "{filter:?}");
        }
    }

    #[test]
    fn test_field_multi_strict() {
        let doc = json!({"a": 1, "c": 3});
        let filter = PathFilter::FieldMulti(vec!["a".into(), "b".into(), "c".into()]);
        let mut step = filter.execute(&doc, &doc, Settings::strict());
        assert_eq!(step.next().unwrap().unwrap(), &json!(1));
        assert!(matches!(
            step.next(),
            Some(Err(Error::PropertyNotFound { name })) if name == "b"
        ));
    }

    #[test]
    fn test_negative_index_out_of_bounds() {
        let doc = json!([1, 2]);
        let filter = PathFilter::Index(Some(-1));
        assert_eq!(filter.execute(&doc, &doc, Settings::default()).count(), 0);
        let mut step = filter.execute(&doc, &doc, Settings::strict());
        assert!(matches!(
            step.next(),
            Some(Err(Error::IndexOutOfBounds { index: -1 }))
        ));
    }
}
